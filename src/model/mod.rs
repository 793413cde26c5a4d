//! Content-addressed document tree model.
//!
//! # Node representation
//! A tree consists of [Node]s, a sum type over the concrete variants
//! [Document], [Fragment], [Element], [Text], [CData], [Comment] and
//! [EntityReference]. Containers own their children in document order
//! ([FragmentBase]); elements additionally own their [Attribute]s, kept in
//! canonical [QName] order.
//!
//! # Lifecycle
//! 1. Construct unattached nodes with the [factory].
//! 2. Wire them together via [ParentNode] and [Element::set_attributes].
//! 3. Call [TreeNode::init] once on the root. This computes every
//!    [StructuralHash] and weight bottom-up in a single pass.
//!
//! After step 3 two independently built trees compare in O(1) via
//! [TreeNode::structurally_equals]. Mutating a node afterwards drops its
//! fingerprint (and those of all ancestors on the mutable path), so reading
//! hash or weight again requires another `init`.
//!
//! # Traversal
//! [Node::visit] dispatches to a [NodeVisitor]; [FallbackVisitor] collapses
//! related cases for visitors that need only a few of them.

pub mod attribute;
pub mod digest;
pub mod factory;
pub mod fragment_base;
pub mod node;
pub mod qname;
pub mod variants;
pub mod visitor;

pub use attribute::Attribute;
pub use digest::{Fingerprint, NodeDigest, StructuralHash};
pub use fragment_base::{FragmentBase, ParentNode};
pub use node::{Node, NodeType, NotInitialized, TreeNode};
pub use qname::{Named, QName};
pub use variants::{CData, Comment, Document, Element, EntityReference, Fragment, Text};
pub use visitor::{Fallback, FallbackVisitor, NodeVisitor, Visitable};
