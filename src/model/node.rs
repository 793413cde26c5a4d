//! The node contract and the [Node] sum type.
//!
//! # Hashing protocol
//! [TreeNode::init] runs once over a finished tree, post-order. Each node
//! feeds a fresh [NodeDigest] with
//! 1. its type tag (see [NodeType::hash_tag]),
//! 2. its local data ([TreeNode::contribute_local_data]),
//! 3. the structural hashes of its direct children, in document order,
//!
//! and sets `weight = local_weight + sum of child weights`.
//!
//! Reading hash or weight of a node that was not initialized, or that was
//! mutated since, is a contract violation and panics. Any `&mut` access to
//! a node clears its [Fingerprint]; since descendants can only be reached
//! mutably through their ancestors, a stale hash can never be observed.

use crate::model::digest::{Fingerprint, NodeDigest, StructuralHash};
use crate::model::variants::{CData, Comment, Document, Element, EntityReference, Fragment, Text};
use crate::model::visitor::{Fallback, FallbackVisitor, NodeVisitor};
use std::error::Error;
use std::fmt;

// =#========================================================================#=
// NODE TYPE
// =#========================================================================#=
/// Concrete kind of a [Node].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Document,
    Fragment,
    Element,
    Text,
    CData,
    Comment,
    EntityReference,
}

impl NodeType {
    /// Returns the tag folded into the structural hash, or `None` for
    /// fragments, which are transparent.
    ///
    /// CDATA sections share the text tag: `<![CDATA[x]]>` and `x` are the
    /// same content.
    pub fn hash_tag(self) -> Option<u8> {
        match self {
            NodeType::Document => Some(1),
            NodeType::Fragment => None,
            NodeType::Element => Some(2),
            NodeType::Text | NodeType::CData => Some(3),
            NodeType::Comment => Some(4),
            NodeType::EntityReference => Some(5),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeType::Document => "document",
            NodeType::Fragment => "fragment",
            NodeType::Element => "element",
            NodeType::Text => "text",
            NodeType::CData => "CDATA section",
            NodeType::Comment => "comment",
            NodeType::EntityReference => "entity reference",
        };
        f.write_str(name)
    }
}

// =#========================================================================#=
// NOT INITIALIZED
// =#========================================================================#=
/// Returned by [TreeNode::try_structural_hash] and [TreeNode::try_weight]
/// for nodes whose fingerprint is missing or stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotInitialized(pub NodeType);

impl fmt::Display for NotInitialized {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} node is not initialized; call init() on the tree root first", self.0)
    }
}

impl Error for NotInitialized {}

// =#========================================================================#=
// TREE NODE (trait)
// =#========================================================================#=
/// Behaviour shared by every node variant.
///
/// Variants implement the hooks ([local_weight](Self::local_weight),
/// [contribute_local_data](Self::contribute_local_data)) and the state
/// accessors; hashing, weight and structural equality are provided.
pub trait TreeNode {
    /// Returns the concrete kind of this node.
    fn node_type(&self) -> NodeType;

    /// Weight this node adds on its own, without children.
    fn local_weight(&self) -> usize {
        1
    }

    /// Folds this node's own data (not its tag, not its children).
    fn contribute_local_data(&self, digest: &mut NodeDigest);

    /// Returns the ordered children; empty for leaves.
    fn children(&self) -> &[Node] {
        &[]
    }

    /// Returns the fingerprint computed by the last [init](Self::init), or
    /// `None` if never initialized or mutated since.
    fn fingerprint(&self) -> Option<Fingerprint>;

    /// Computes hash and weight of this subtree, post-order.
    fn init(&mut self) -> Fingerprint;

    /// Folds the type tag followed by the local data.
    fn update_with_local_data(&self, digest: &mut NodeDigest) {
        if let Some(tag) = self.node_type().hash_tag() {
            digest.tag(tag);
        }
        self.contribute_local_data(digest);
    }

    /// Returns `true` if hash and weight are available.
    fn is_initialized(&self) -> bool {
        self.fingerprint().is_some()
    }

    /// Returns the structural hash, or [NotInitialized].
    fn try_structural_hash(&self) -> Result<StructuralHash, NotInitialized> {
        self.fingerprint()
            .map(|fp| fp.hash)
            .ok_or(NotInitialized(self.node_type()))
    }

    /// Returns the subtree weight, or [NotInitialized].
    fn try_weight(&self) -> Result<usize, NotInitialized> {
        self.fingerprint()
            .map(|fp| fp.weight)
            .ok_or(NotInitialized(self.node_type()))
    }

    /// Returns the structural hash of this subtree.
    ///
    /// # Panics
    /// Panics if the tree was not initialized or was mutated since.
    fn structural_hash(&self) -> StructuralHash {
        self.try_structural_hash().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Returns the number of weighted items in this subtree.
    ///
    /// # Panics
    /// Panics if the tree was not initialized or was mutated since.
    fn weight(&self) -> usize {
        self.try_weight().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Content-addressed equality: equal types, content and child order.
    ///
    /// # Panics
    /// Panics if either tree was not initialized or was mutated since.
    fn structurally_equals(&self, other: &dyn TreeNode) -> bool {
        self.structural_hash() == other.structural_hash()
    }
}

/// Folds a node whose children are already initialized.
pub(crate) fn compute_fingerprint<T: TreeNode + ?Sized>(node: &T) -> Fingerprint {
    let mut digest = NodeDigest::new();
    node.update_with_local_data(&mut digest);

    let mut weight = node.local_weight();
    for child in node.children() {
        let child_fp = child
            .fingerprint()
            .unwrap_or_else(|| panic!("{}", NotInitialized(child.node_type())));
        digest.child(&child_fp.hash);
        weight += child_fp.weight;
    }

    Fingerprint {
        hash: digest.finish(),
        weight,
    }
}

// =#========================================================================#=
// NODE
// =#========================================================================#=
/// Any node of a document tree.
///
/// Equality ([PartialEq]) and [Hash](std::hash::Hash) are content-addressed
/// and therefore require initialized trees.
#[derive(Debug, Clone)]
pub enum Node {
    Document(Document),
    Fragment(Fragment),
    Element(Element),
    Text(Text),
    CData(CData),
    Comment(Comment),
    EntityReference(EntityReference),
}

impl Node {
    fn as_tree_node(&self) -> &dyn TreeNode {
        match self {
            Node::Document(n) => n,
            Node::Fragment(n) => n,
            Node::Element(n) => n,
            Node::Text(n) => n,
            Node::CData(n) => n,
            Node::Comment(n) => n,
            Node::EntityReference(n) => n,
        }
    }

    fn as_tree_node_mut(&mut self) -> &mut dyn TreeNode {
        match self {
            Node::Document(n) => n,
            Node::Fragment(n) => n,
            Node::Element(n) => n,
            Node::Text(n) => n,
            Node::CData(n) => n,
            Node::Comment(n) => n,
            Node::EntityReference(n) => n,
        }
    }

    /// Routes to the visitor method of this node's concrete variant.
    pub fn visit<R, A, V>(&self, visitor: &V, arg: A) -> R
    where
        V: NodeVisitor<R, A> + ?Sized,
    {
        match self {
            Node::Document(n) => visitor.visit_document(n, arg),
            Node::Fragment(n) => visitor.visit_fragment(n, arg),
            Node::Element(n) => visitor.visit_element(n, arg),
            Node::Text(n) => visitor.visit_text(n, arg),
            Node::CData(n) => visitor.visit_cdata(n, arg),
            Node::Comment(n) => visitor.visit_comment(n, arg),
            Node::EntityReference(n) => visitor.visit_entity_reference(n, arg),
        }
    }

    /// Dispatches to a [FallbackVisitor].
    pub fn visit_fallback<R, A, V>(&self, visitor: &V, arg: A) -> R
    where
        V: FallbackVisitor<R, A> + ?Sized,
    {
        self.visit(&Fallback(visitor), arg)
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the element mutably if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Returns the text contents of text and CDATA nodes.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text.contents()),
            Node::CData(cdata) => Some(cdata.contents()),
            _ => None,
        }
    }
}

impl TreeNode for Node {
    fn node_type(&self) -> NodeType {
        self.as_tree_node().node_type()
    }

    fn local_weight(&self) -> usize {
        self.as_tree_node().local_weight()
    }

    fn contribute_local_data(&self, digest: &mut NodeDigest) {
        self.as_tree_node().contribute_local_data(digest)
    }

    fn children(&self) -> &[Node] {
        self.as_tree_node().children()
    }

    fn fingerprint(&self) -> Option<Fingerprint> {
        self.as_tree_node().fingerprint()
    }

    fn init(&mut self) -> Fingerprint {
        self.as_tree_node_mut().init()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.structurally_equals(other)
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(&self.structural_hash(), state);
    }
}

macro_rules! node_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Node {
                fn from(node: $variant) -> Self {
                    Node::$variant(node)
                }
            }
        )*
    };
}

node_from!(Document, Fragment, Element, Text, CData, Comment, EntityReference);
