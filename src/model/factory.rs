//! Constructors for every node variant.
//!
//! The functions are pure: they allocate an unattached, uninitialized node
//! and do nothing else. Wire nodes into a tree with
//! [ParentNode](crate::model::ParentNode), then call
//! [init](crate::model::TreeNode::init) on the root.
//!
//! # Example
//! ```
//! use doctree::model::{factory, Node, ParentNode, TreeNode};
//!
//! let mut item = factory::element_ns(Some("urn:shop"), "item");
//! item.set_attributes([
//!     factory::attr(factory::qname(None, "sku"), Some("A-17")),
//!     factory::attr(factory::qname(None, "discount"), None), // dropped
//! ]);
//! item.append_child(factory::text("Kettle"));
//!
//! let mut node = Node::from(item);
//! node.init();
//! assert_eq!(node.weight(), 3);
//! ```

use crate::model::attribute::Attribute;
use crate::model::qname::QName;
use crate::model::variants::{CData, Comment, Document, Element, EntityReference, Fragment, Text};

/// Creates an empty document.
pub fn document() -> Document {
    Document::new()
}

/// Creates an empty fragment.
pub fn fragment() -> Fragment {
    Fragment::new()
}

/// Creates an element without attributes or children.
pub fn element(name: QName) -> Element {
    Element::new(name)
}

/// Creates an element from a namespace and a local name.
pub fn element_ns(namespace: Option<&str>, local_name: &str) -> Element {
    Element::new(qname(namespace, local_name))
}

/// Creates an attribute, or `None` if there is no value.
///
/// Lets callers pass optional values straight into
/// [Element::set_attributes], which skips the `None`s.
pub fn attr(name: QName, value: Option<&str>) -> Option<Attribute> {
    value.map(|value| Attribute::new(name, value.to_string()))
}

/// Creates an attribute from a namespace, local name and value.
pub fn attr_ns(namespace: Option<&str>, local_name: &str, value: impl Into<String>) -> Attribute {
    Attribute::new(qname(namespace, local_name), value.into())
}

/// Creates a text node.
pub fn text(contents: impl Into<String>) -> Text {
    Text::new(contents.into())
}

/// Creates a CDATA section.
pub fn cdata(contents: impl Into<String>) -> CData {
    CData::new(contents.into())
}

/// Creates a comment.
pub fn comment(contents: impl Into<String>) -> Comment {
    Comment::new(contents.into())
}

/// Creates a reference to the entity `name`.
pub fn entity_ref(name: impl Into<String>) -> EntityReference {
    EntityReference::new(name.into())
}

/// Creates a qualified name.
pub fn qname(namespace: Option<&str>, local_name: &str) -> QName {
    QName::new(namespace.map(str::to_string), local_name.to_string())
}
