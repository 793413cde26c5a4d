//! Concrete node variants.
//!
//! Each variant defines its own contribution to the structural hash and
//! weight:
//!
//! | Variant | Local weight | Local data |
//! |---------|--------------|------------|
//! | [Document] | 1 | none |
//! | [Fragment] | 0 | none, not even a tag |
//! | [Element] | 1 + #attributes | name, then attributes in canonical order |
//! | [Text], [CData] | 1 | contents |
//! | [Comment] | 1 | contents |
//! | [EntityReference] | 1 | entity name |
//!
//! Variants are created through [crate::model::factory].

use crate::model::attribute::Attribute;
use crate::model::digest::{Fingerprint, NodeDigest};
use crate::model::fragment_base::{FragmentBase, ParentNode};
use crate::model::node::{compute_fingerprint, Node, NodeType, TreeNode};
use crate::model::qname::{Named, QName};
use std::cmp::Ordering;

// =#========================================================================#=
// DOCUMENT
// =#========================================================================#=
/// Root of a parsed document.
#[derive(Debug, Clone)]
pub struct Document {
    base: FragmentBase,
    fingerprint: Option<Fingerprint>,
}

impl Document {
    pub(crate) fn new() -> Self {
        Self {
            base: FragmentBase::new(),
            fingerprint: None,
        }
    }

    /// Returns the first element child, if any.
    pub fn document_element(&self) -> Option<&Element> {
        self.base.children().iter().find_map(Node::as_element)
    }
}

impl TreeNode for Document {
    fn node_type(&self) -> NodeType {
        NodeType::Document
    }

    fn contribute_local_data(&self, _digest: &mut NodeDigest) {}

    fn children(&self) -> &[Node] {
        self.base.children()
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        self.base.init_children();
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

impl ParentNode for Document {
    fn fragment_base(&self) -> &FragmentBase {
        &self.base
    }

    fn fragment_base_mut(&mut self) -> &mut FragmentBase {
        self.fingerprint = None;
        &mut self.base
    }
}

// =#========================================================================#=
// FRAGMENT
// =#========================================================================#=
/// Transparent grouping of nodes.
///
/// Contributes neither weight nor local hash data.
#[derive(Debug, Clone)]
pub struct Fragment {
    base: FragmentBase,
    fingerprint: Option<Fingerprint>,
}

impl Fragment {
    pub(crate) fn new() -> Self {
        Self {
            base: FragmentBase::new(),
            fingerprint: None,
        }
    }
}

impl TreeNode for Fragment {
    fn node_type(&self) -> NodeType {
        NodeType::Fragment
    }

    fn local_weight(&self) -> usize {
        0
    }

    fn contribute_local_data(&self, _digest: &mut NodeDigest) {}

    fn children(&self) -> &[Node] {
        self.base.children()
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        self.base.init_children();
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

impl ParentNode for Fragment {
    fn fragment_base(&self) -> &FragmentBase {
        &self.base
    }

    fn fragment_base_mut(&mut self) -> &mut FragmentBase {
        self.fingerprint = None;
        &mut self.base
    }
}

// =#========================================================================#=
// ELEMENT
// =#========================================================================#=
/// An element with attributes and children.
///
/// # Invariants
/// - Attributes are kept sorted by namespace, then local name, then value.
///   Source order is not preserved; attributes with equal names are not
///   de-duplicated.
/// - The self-closing flag records `<x/>` in the source. It is independent of
///   having children and does not take part in the structural hash.
#[derive(Debug, Clone)]
pub struct Element {
    name: QName,
    attributes: Vec<Attribute>,
    base: FragmentBase,
    self_closing: bool,
    fingerprint: Option<Fingerprint>,
}

impl Element {
    pub(crate) fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            base: FragmentBase::new(),
            self_closing: false,
            fingerprint: None,
        }
    }

    /// Returns the attributes in canonical order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// Returns the attribute at `index` in canonical order.
    pub fn attribute_at(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    /// Looks up an attribute by name (binary search).
    ///
    /// With duplicate names, the first in canonical order is returned.
    pub fn attribute(&self, name: &QName) -> Option<&Attribute> {
        self.find_attribute(|attr| attr.name().cmp(name))
    }

    /// Looks up an attribute value by namespace and local name.
    pub fn attribute_value(&self, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.find_attribute(|attr| attr.name().cmp_parts(namespace, local_name))
            .map(Attribute::value)
    }

    fn find_attribute<F>(&self, compare: F) -> Option<&Attribute>
    where
        F: Fn(&Attribute) -> Ordering,
    {
        let index = self.attributes.partition_point(|attr| compare(attr) == Ordering::Less);
        self.attributes
            .get(index)
            .filter(|attr| compare(*attr) == Ordering::Equal)
    }

    /// Replaces all attributes, skipping `None` entries, and sorts them.
    ///
    /// Accepts the optional attributes returned by
    /// [factory::attr](crate::model::factory::attr) directly.
    pub fn set_attributes<I, A>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = A>,
        A: Into<Option<Attribute>>,
    {
        self.fingerprint = None;
        self.attributes = attributes
            .into_iter()
            .filter_map(Into::<Option<Attribute>>::into)
            .collect();
        self.attributes.sort_by(canonical_order);
    }

    /// Inserts an attribute at its canonical position.
    pub fn add_attribute(&mut self, attribute: Attribute) {
        self.fingerprint = None;
        let index = self
            .attributes
            .partition_point(|attr| canonical_order(attr, &attribute) != Ordering::Greater);
        self.attributes.insert(index, attribute);
    }

    /// Returns whether the element was written as `<x/>`.
    pub fn is_self_closing(&self) -> bool {
        self.self_closing
    }

    /// Sets the self-closing flag. Does not invalidate the structural hash.
    pub fn set_self_closing(&mut self, self_closing: bool) {
        self.self_closing = self_closing;
    }

    /// Builder-style variant of [set_self_closing](Self::set_self_closing).
    pub fn with_self_closing(mut self, self_closing: bool) -> Self {
        self.self_closing = self_closing;
        self
    }
}

/// Attributes are ordered by name, then by value for repeated names.
fn canonical_order(a: &Attribute, b: &Attribute) -> Ordering {
    a.name().cmp(b.name()).then_with(|| a.value().cmp(b.value()))
}

impl Named for Element {
    fn name(&self) -> &QName {
        &self.name
    }
}

impl TreeNode for Element {
    fn node_type(&self) -> NodeType {
        NodeType::Element
    }

    fn local_weight(&self) -> usize {
        1 + self.attributes.len()
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        digest.opt_str(self.name.namespace());
        digest.str(self.name.local_name());
        digest.len(self.attributes.len());
        for attr in &self.attributes {
            digest.opt_str(attr.namespace());
            digest.str(attr.local_name());
            digest.str(attr.value());
        }
    }

    fn children(&self) -> &[Node] {
        self.base.children()
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        self.base.init_children();
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

impl ParentNode for Element {
    fn fragment_base(&self) -> &FragmentBase {
        &self.base
    }

    fn fragment_base_mut(&mut self) -> &mut FragmentBase {
        self.fingerprint = None;
        &mut self.base
    }
}

// =#========================================================================#=
// TEXT, CDATA
// =#========================================================================#=
/// Character data.
#[derive(Debug, Clone)]
pub struct Text {
    contents: String,
    fingerprint: Option<Fingerprint>,
}

impl Text {
    pub(crate) fn new(contents: String) -> Self {
        Self { contents, fingerprint: None }
    }

    /// Returns the text.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl TreeNode for Text {
    fn node_type(&self) -> NodeType {
        NodeType::Text
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        digest.str(&self.contents);
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

/// A CDATA section. Hashes like [Text] with the same contents.
#[derive(Debug, Clone)]
pub struct CData {
    contents: String,
    fingerprint: Option<Fingerprint>,
}

impl CData {
    pub(crate) fn new(contents: String) -> Self {
        Self { contents, fingerprint: None }
    }

    /// Returns the section contents.
    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl TreeNode for CData {
    fn node_type(&self) -> NodeType {
        NodeType::CData
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        digest.str(&self.contents);
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

// =#========================================================================#=
// COMMENT
// =#========================================================================#=
/// A comment.
#[derive(Debug, Clone)]
pub struct Comment {
    contents: String,
    fingerprint: Option<Fingerprint>,
}

impl Comment {
    pub(crate) fn new(contents: String) -> Self {
        Self { contents, fingerprint: None }
    }

    /// Returns the comment text without delimiters.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Replaces the comment text.
    pub fn set_contents(&mut self, contents: impl Into<String>) {
        self.fingerprint = None;
        self.contents = contents.into();
    }
}

impl TreeNode for Comment {
    fn node_type(&self) -> NodeType {
        NodeType::Comment
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        digest.str(&self.contents);
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}

// =#========================================================================#=
// ENTITY REFERENCE
// =#========================================================================#=
/// An unexpanded entity reference such as `&nbsp;`.
#[derive(Debug, Clone)]
pub struct EntityReference {
    name: String,
    fingerprint: Option<Fingerprint>,
}

impl EntityReference {
    pub(crate) fn new(name: String) -> Self {
        Self { name, fingerprint: None }
    }

    /// Returns the entity name without `&` and `;`.
    pub fn entity_name(&self) -> &str {
        &self.name
    }

    /// Renames the referenced entity.
    pub fn set_entity_name(&mut self, name: impl Into<String>) {
        self.fingerprint = None;
        self.name = name.into();
    }
}

impl TreeNode for EntityReference {
    fn node_type(&self) -> NodeType {
        NodeType::EntityReference
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        digest.str(&self.name);
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.fingerprint
    }

    fn init(&mut self) -> Fingerprint {
        let fingerprint = compute_fingerprint(self);
        self.fingerprint = Some(fingerprint);
        fingerprint
    }
}
