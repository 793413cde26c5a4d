//! A namespace-aware tree-of-nodes document (DOM).
//!
//! [DomDocument] is the interchange format for
//! [DocumentBuilder::convert_from_dom](crate::builder::DocumentBuilder::convert_from_dom)
//! and [DocumentBuilder::convert_to_dom](crate::builder::DocumentBuilder::convert_to_dom).
//! Unlike the content-addressed model it keeps prefixes, namespace
//! declarations, attribute source order and per-node user data, and it is
//! freely mutable.
//!
//! Nodes live in an arena and are addressed by [DomNodeId]. Creating a node
//! does not attach it; use [DomDocument::append_child] or
//! [DomDocument::insert_before].

pub mod namespace_context;

pub use namespace_context::NamespaceContext;

use crate::parser::xml_stream_reader::{split_qname, XML_NAMESPACE};
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

/// Namespace of `xmlns` and `xmlns:*` declaration attributes.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Index of a node in a [DomDocument] (arena).
pub type DomNodeId = usize;

// =#========================================================================#=
// DOM ERROR
// =#========================================================================#=
/// Errors of DOM manipulation and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum DomError {
    /// The node kind has no counterpart in the target representation.
    UnsupportedNode(String),
    /// The id does not address a node of this document.
    InvalidNode(DomNodeId),
    /// The operation would produce an impossible tree.
    HierarchyRequest(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::UnsupportedNode(kind) => write!(f, "Unsupported DOM node: {kind}"),
            DomError::InvalidNode(id) => write!(f, "No DOM node with id {id}"),
            DomError::HierarchyRequest(msg) => write!(f, "Invalid DOM hierarchy - {msg}"),
        }
    }
}

impl Error for DomError {}

// =#========================================================================#=
// NODES
// =#========================================================================#=
/// An attribute of a DOM element, including namespace declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomAttribute {
    pub namespace: Option<String>,
    pub prefix: Option<String>,
    pub local_name: String,
    pub value: String,
}

impl DomAttribute {
    /// Whether this attribute is an `xmlns` or `xmlns:*` declaration.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NAMESPACE)
            || (self.prefix.is_none() && self.local_name == "xmlns")
    }

    /// The prefix this declaration binds (`None` for the default namespace).
    fn declared_prefix(&self) -> Option<&str> {
        match self.prefix {
            Some(_) => Some(&self.local_name),
            None => None,
        }
    }
}

/// What a DOM node is, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNodeKind {
    Document,
    DocumentFragment,
    Element {
        namespace: Option<String>,
        prefix: Option<String>,
        local_name: String,
        attributes: Vec<DomAttribute>,
    },
    Text(String),
    CData(String),
    Comment(String),
    EntityReference(String),
    ProcessingInstruction { target: String, data: String },
    DocumentType { name: String },
}

impl DomNodeKind {
    /// DOM-style name of the node kind, used in error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            DomNodeKind::Document => "#document",
            DomNodeKind::DocumentFragment => "#document-fragment",
            DomNodeKind::Element { .. } => "element",
            DomNodeKind::Text(_) => "#text",
            DomNodeKind::CData(_) => "#cdata-section",
            DomNodeKind::Comment(_) => "#comment",
            DomNodeKind::EntityReference(_) => "entity-reference",
            DomNodeKind::ProcessingInstruction { .. } => "processing-instruction",
            DomNodeKind::DocumentType { .. } => "document-type",
        }
    }

    fn can_have_children(&self) -> bool {
        matches!(
            self,
            DomNodeKind::Document | DomNodeKind::DocumentFragment | DomNodeKind::Element { .. }
        )
    }
}

/// Storage for a single node in the arena.
#[derive(Debug, Clone)]
pub struct DomNodeData {
    pub kind: DomNodeKind,
    pub parent: Option<DomNodeId>,
    pub children: Vec<DomNodeId>,
    /// Application data attached to the node, by key
    pub user_data: HashMap<String, String>,
}

impl DomNodeData {
    fn new(kind: DomNodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            user_data: HashMap::new(),
        }
    }
}

// =#========================================================================#=
// DOM DOCUMENT
// =#========================================================================#=
/// An arena of DOM nodes with a document node at [DomDocument::root].
///
/// # Example
/// ```
/// use doctree::dom::DomDocument;
///
/// let mut dom = DomDocument::new();
/// let shelf = dom.create_element_ns(Some("urn:lib"), "l:shelf");
/// let first = dom.create_text_node("first");
/// let zeroth = dom.create_comment("zeroth");
///
/// dom.append_child(dom.root(), shelf).unwrap();
/// dom.append_child(shelf, first).unwrap();
/// dom.insert_before(shelf, zeroth, Some(first)).unwrap();
///
/// assert_eq!(dom.children(shelf).unwrap(), &[zeroth, first]);
/// assert_eq!(dom.document_element(), Some(shelf));
/// ```
#[derive(Debug, Clone)]
pub struct DomDocument {
    nodes: Vec<DomNodeData>,
}

impl Default for DomDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DomDocument {
    /// Creates a document containing only its document node.
    pub fn new() -> Self {
        DomDocument {
            nodes: vec![DomNodeData::new(DomNodeKind::Document)],
        }
    }

    /// The document node.
    pub fn root(&self) -> DomNodeId {
        0
    }

    /// The first element child of the document node.
    pub fn document_element(&self) -> Option<DomNodeId> {
        self.nodes[self.root()]
            .children
            .iter()
            .copied()
            .find(|&child| matches!(self.nodes[child].kind, DomNodeKind::Element { .. }))
    }

    /// Number of nodes in the arena, attached or not.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    // ------------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------------

    fn create_node(&mut self, kind: DomNodeKind) -> DomNodeId {
        let id = self.nodes.len();
        self.nodes.push(DomNodeData::new(kind));
        id
    }

    /// Creates an element from a namespace and a possibly prefixed name.
    pub fn create_element_ns(&mut self, namespace: Option<&str>, qualified_name: &str) -> DomNodeId {
        let (prefix, local_name) = split_qname(qualified_name);
        self.create_node(DomNodeKind::Element {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            attributes: Vec::new(),
        })
    }

    pub fn create_document_fragment(&mut self) -> DomNodeId {
        self.create_node(DomNodeKind::DocumentFragment)
    }

    pub fn create_text_node(&mut self, data: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::Text(data.into()))
    }

    pub fn create_cdata_section(&mut self, data: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::CData(data.into()))
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::Comment(data.into()))
    }

    pub fn create_entity_reference(&mut self, name: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::EntityReference(name.into()))
    }

    pub fn create_processing_instruction(&mut self, target: impl Into<String>, data: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::ProcessingInstruction {
            target: target.into(),
            data: data.into(),
        })
    }

    pub fn create_document_type(&mut self, name: impl Into<String>) -> DomNodeId {
        self.create_node(DomNodeKind::DocumentType { name: name.into() })
    }

    // ------------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------------

    /// Returns the node with the given id.
    ///
    /// # Errors
    /// Returns [DomError::InvalidNode] if there is no such node.
    pub fn node(&self, id: DomNodeId) -> Result<&DomNodeData, DomError> {
        self.nodes.get(id).ok_or(DomError::InvalidNode(id))
    }

    fn node_mut(&mut self, id: DomNodeId) -> Result<&mut DomNodeData, DomError> {
        self.nodes.get_mut(id).ok_or(DomError::InvalidNode(id))
    }

    pub fn kind(&self, id: DomNodeId) -> Result<&DomNodeKind, DomError> {
        Ok(&self.node(id)?.kind)
    }

    pub fn children(&self, id: DomNodeId) -> Result<&[DomNodeId], DomError> {
        Ok(&self.node(id)?.children)
    }

    pub fn parent(&self, id: DomNodeId) -> Result<Option<DomNodeId>, DomError> {
        Ok(self.node(id)?.parent)
    }

    /// Attributes of an element in insertion order; empty for other kinds.
    pub fn attributes(&self, id: DomNodeId) -> Result<&[DomAttribute], DomError> {
        match &self.node(id)?.kind {
            DomNodeKind::Element { attributes, .. } => Ok(attributes),
            _ => Ok(&[]),
        }
    }

    /// Value of the attribute with the given namespace and local name.
    pub fn attribute_ns(&self, id: DomNodeId, namespace: Option<&str>, local_name: &str) -> Option<&str> {
        self.attributes(id)
            .ok()?
            .iter()
            .find(|attr| attr.namespace.as_deref() == namespace && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Sets an attribute on an element, replacing one with the same
    /// namespace and local name.
    ///
    /// # Arguments
    /// * `element` - Element to set the attribute on
    /// * `namespace` - Namespace of the attribute; [XMLNS_NAMESPACE] for declarations
    /// * `qualified_name` - Possibly prefixed name, e.g. `xlink:href` or `xmlns:x`
    /// * `value` - Attribute value
    ///
    /// # Errors
    /// Returns an error if `element` is not an element of this document.
    pub fn set_attribute_ns(
        &mut self,
        element: DomNodeId,
        namespace: Option<&str>,
        qualified_name: &str,
        value: impl Into<String>,
    ) -> Result<(), DomError> {
        let (prefix, local_name) = split_qname(qualified_name);
        let attribute = DomAttribute {
            namespace: namespace.map(str::to_string),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            value: value.into(),
        };

        match &mut self.node_mut(element)?.kind {
            DomNodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|a| {
                    a.namespace == attribute.namespace && a.local_name == attribute.local_name
                }) {
                    Some(existing) => *existing = attribute,
                    None => attributes.push(attribute),
                }
                Ok(())
            }
            other => Err(DomError::HierarchyRequest(format!(
                "cannot set an attribute on {}",
                other.kind_name()
            ))),
        }
    }

    /// Attaches `value` to the node under `key`, replacing a previous value.
    pub fn set_user_data(&mut self, id: DomNodeId, key: &str, value: impl Into<String>) -> Result<(), DomError> {
        self.node_mut(id)?.user_data.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn user_data(&self, id: DomNodeId, key: &str) -> Option<&str> {
        self.nodes.get(id)?.user_data.get(key).map(String::as_str)
    }

    /// Appends `child` as last child of `parent`, detaching it from its
    /// previous parent first.
    ///
    /// # Errors
    /// Returns an error if either id is invalid, `parent` cannot have
    /// children, or `child` is `parent` or one of its ancestors.
    pub fn append_child(&mut self, parent: DomNodeId, child: DomNodeId) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Inserts `new_child` into `parent` right before `reference`, or at the
    /// end if `reference` is `None`.
    ///
    /// # Errors
    /// Returns an error if any id is invalid, `reference` is not a child of
    /// `parent`, `parent` cannot have children, or the insertion would
    /// create a cycle.
    pub fn insert_before(
        &mut self,
        parent: DomNodeId,
        new_child: DomNodeId,
        reference: Option<DomNodeId>,
    ) -> Result<(), DomError> {
        self.check_insertion(parent, new_child)?;
        if reference == Some(new_child) {
            return Ok(());
        }
        if let Some(reference) = reference {
            if self.node(reference)?.parent != Some(parent) {
                return Err(DomError::HierarchyRequest(format!(
                    "node {reference} is not a child of node {parent}"
                )));
            }
        }

        self.detach(new_child)?;
        let children = &mut self.node_mut(parent)?.children;
        let position = match reference {
            Some(reference) => children
                .iter()
                .position(|&c| c == reference)
                .unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(position, new_child);
        self.node_mut(new_child)?.parent = Some(parent);
        Ok(())
    }

    fn check_insertion(&self, parent: DomNodeId, new_child: DomNodeId) -> Result<(), DomError> {
        let parent_kind = self.kind(parent)?;
        let child_kind = self.kind(new_child)?;
        if !parent_kind.can_have_children() {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot have children",
                parent_kind.kind_name()
            )));
        }
        if matches!(child_kind, DomNodeKind::Document) {
            return Err(DomError::HierarchyRequest("a document cannot be a child".to_string()));
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            if id == new_child {
                return Err(DomError::HierarchyRequest(format!(
                    "node {new_child} is an ancestor of node {parent}"
                )));
            }
            ancestor = self.nodes[id].parent;
        }
        Ok(())
    }

    /// Removes the node from its parent's children; the node stays in the arena.
    pub fn detach(&mut self, id: DomNodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node(id)?.parent {
            self.nodes[parent].children.retain(|&c| c != id);
            self.nodes[id].parent = None;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Namespaces
    // ------------------------------------------------------------------------

    /// Looks up the namespace bound to `prefix` (`None`: default namespace)
    /// in scope at node `id`.
    ///
    /// Considers `xmlns` declarations as well as the namespaces of the
    /// elements on the path to the root.
    pub fn lookup_namespace_uri(&self, id: DomNodeId, prefix: Option<&str>) -> Option<&str> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE);
        }

        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id)?;
            if let DomNodeKind::Element {
                namespace,
                prefix: element_prefix,
                attributes,
                ..
            } = &node.kind
            {
                if let Some(declaration) = attributes
                    .iter()
                    .find(|a| a.is_namespace_declaration() && a.declared_prefix() == prefix)
                {
                    return (!declaration.value.is_empty()).then_some(declaration.value.as_str());
                }
                if element_prefix.as_deref() == prefix && namespace.is_some() {
                    return namespace.as_deref();
                }
            }
            current = node.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_before_rejects_foreign_reference() {
        let mut dom = DomDocument::new();
        let a = dom.create_element_ns(None, "a");
        let b = dom.create_element_ns(None, "b");
        let text = dom.create_text_node("x");
        dom.append_child(dom.root(), a).unwrap();
        dom.append_child(a, b).unwrap();

        let result = dom.insert_before(dom.root(), text, Some(b));
        assert!(matches!(result, Err(DomError::HierarchyRequest(_))));
    }

    #[test]
    fn test_append_moves_node() {
        let mut dom = DomDocument::new();
        let a = dom.create_element_ns(None, "a");
        let b = dom.create_element_ns(None, "b");
        let c = dom.create_comment("c");
        dom.append_child(a, c).unwrap();
        dom.append_child(b, c).unwrap();

        assert!(dom.children(a).unwrap().is_empty());
        assert_eq!(dom.children(b).unwrap(), &[c]);
        assert_eq!(dom.parent(c).unwrap(), Some(b));
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut dom = DomDocument::new();
        let a = dom.create_element_ns(None, "a");
        let b = dom.create_element_ns(None, "b");
        dom.append_child(a, b).unwrap();
        assert!(dom.append_child(b, a).is_err());
    }

    #[test]
    fn test_lookup_namespace_uri_walks_ancestors() {
        let mut dom = DomDocument::new();
        let outer = dom.create_element_ns(None, "outer");
        let inner = dom.create_element_ns(None, "inner");
        dom.set_attribute_ns(outer, Some(XMLNS_NAMESPACE), "xmlns:p", "urn:p").unwrap();
        dom.append_child(outer, inner).unwrap();

        assert_eq!(dom.lookup_namespace_uri(inner, Some("p")), Some("urn:p"));
        assert_eq!(dom.lookup_namespace_uri(inner, Some("q")), None);
        assert_eq!(dom.lookup_namespace_uri(inner, None), None);
    }

    #[test]
    fn test_invalid_id() {
        let dom = DomDocument::new();
        assert_eq!(dom.kind(42).unwrap_err(), DomError::InvalidNode(42));
    }
}
