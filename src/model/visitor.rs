//! Double-dispatch traversal over node variants.
//!
//! [Node::visit](crate::model::Node::visit) routes to the [NodeVisitor]
//! method of the node's concrete variant. Visitors take `&self` and thread
//! all per-call state through the argument `A`, so a single visitor value
//! can serve many traversals.
//!
//! Visitors that only care about a few variants implement
//! [FallbackVisitor] instead, which collapses documents, fragments and
//! elements into [visit_container](FallbackVisitor::visit_container) and the
//! remaining variants into [visit_leaf](FallbackVisitor::visit_leaf). They are
//! dispatched with [Node::visit_fallback](crate::model::Node::visit_fallback),
//! which wraps them in [Fallback].
//!
//! # Example
//! ```
//! use doctree::model::{factory, FallbackVisitor, Node, ParentNode, TreeNode};
//!
//! /// Counts nodes of any type.
//! struct Counter;
//!
//! impl FallbackVisitor<(), &mut usize> for Counter {
//!     fn visit_container(&self, node: &dyn TreeNode, count: &mut usize) {
//!         *count += 1;
//!         for child in node.children() {
//!             child.visit_fallback(self, &mut *count);
//!         }
//!     }
//!
//!     fn visit_leaf(&self, _node: &dyn TreeNode, count: &mut usize) {
//!         *count += 1;
//!     }
//! }
//!
//! let mut element = factory::element_ns(None, "p");
//! element.append_child(factory::text("hi"));
//! let node = Node::from(element);
//!
//! let mut count = 0;
//! node.visit_fallback(&Counter, &mut count);
//! assert_eq!(count, 2);
//! ```

use crate::model::node::TreeNode;
use crate::model::variants::{CData, Comment, Document, Element, EntityReference, Fragment, Text};

// =#========================================================================#=
// NODE VISITOR (trait)
// =#========================================================================#=
/// One method per concrete node variant.
pub trait NodeVisitor<R, A> {
    fn visit_document(&self, node: &Document, arg: A) -> R;

    fn visit_fragment(&self, node: &Fragment, arg: A) -> R;

    fn visit_element(&self, node: &Element, arg: A) -> R;

    fn visit_text(&self, node: &Text, arg: A) -> R;

    fn visit_cdata(&self, node: &CData, arg: A) -> R;

    fn visit_comment(&self, node: &Comment, arg: A) -> R;

    fn visit_entity_reference(&self, node: &EntityReference, arg: A) -> R;
}

// =#========================================================================#=
// FALLBACK VISITOR (trait)
// =#========================================================================#=
/// Visitor with default routing of related cases.
///
/// Wrapped in [Fallback], every implementation is a [NodeVisitor]. Override
/// the per-variant methods only where the collapsed cases are too coarse.
pub trait FallbackVisitor<R, A> {
    /// Handles documents, fragments and elements.
    fn visit_container(&self, node: &dyn TreeNode, arg: A) -> R;

    /// Handles text, CDATA, comments and entity references.
    fn visit_leaf(&self, node: &dyn TreeNode, arg: A) -> R;

    fn visit_document(&self, node: &Document, arg: A) -> R {
        self.visit_container(node, arg)
    }

    fn visit_fragment(&self, node: &Fragment, arg: A) -> R {
        self.visit_container(node, arg)
    }

    fn visit_element(&self, node: &Element, arg: A) -> R {
        self.visit_container(node, arg)
    }

    fn visit_text(&self, node: &Text, arg: A) -> R {
        self.visit_leaf(node, arg)
    }

    fn visit_cdata(&self, node: &CData, arg: A) -> R {
        self.visit_leaf(node, arg)
    }

    fn visit_comment(&self, node: &Comment, arg: A) -> R {
        self.visit_leaf(node, arg)
    }

    fn visit_entity_reference(&self, node: &EntityReference, arg: A) -> R {
        self.visit_leaf(node, arg)
    }
}

/// Adapts a [FallbackVisitor] to the full [NodeVisitor] contract.
pub struct Fallback<'a, V: ?Sized>(pub &'a V);

impl<R, A, V> NodeVisitor<R, A> for Fallback<'_, V>
where
    V: FallbackVisitor<R, A> + ?Sized,
{
    fn visit_document(&self, node: &Document, arg: A) -> R {
        self.0.visit_document(node, arg)
    }

    fn visit_fragment(&self, node: &Fragment, arg: A) -> R {
        self.0.visit_fragment(node, arg)
    }

    fn visit_element(&self, node: &Element, arg: A) -> R {
        self.0.visit_element(node, arg)
    }

    fn visit_text(&self, node: &Text, arg: A) -> R {
        self.0.visit_text(node, arg)
    }

    fn visit_cdata(&self, node: &CData, arg: A) -> R {
        self.0.visit_cdata(node, arg)
    }

    fn visit_comment(&self, node: &Comment, arg: A) -> R {
        self.0.visit_comment(node, arg)
    }

    fn visit_entity_reference(&self, node: &EntityReference, arg: A) -> R {
        self.0.visit_entity_reference(node, arg)
    }
}

// =#========================================================================#=
// VISITABLE (trait)
// =#========================================================================#=
/// A node value a visitor can start from: a [Node](crate::model::Node) or
/// any concrete variant.
pub trait Visitable {
    fn accept<R, A, V>(&self, visitor: &V, arg: A) -> R
    where
        V: NodeVisitor<R, A> + ?Sized;
}

impl Visitable for crate::model::Node {
    fn accept<R, A, V>(&self, visitor: &V, arg: A) -> R
    where
        V: NodeVisitor<R, A> + ?Sized,
    {
        self.visit(visitor, arg)
    }
}

macro_rules! visitable {
    ($($variant:ident => $method:ident),*) => {
        $(
            impl Visitable for $variant {
                fn accept<R, A, V>(&self, visitor: &V, arg: A) -> R
                where
                    V: NodeVisitor<R, A> + ?Sized,
                {
                    visitor.$method(self, arg)
                }
            }
        )*
    };
}

visitable!(
    Document => visit_document,
    Fragment => visit_fragment,
    Element => visit_element,
    Text => visit_text,
    CData => visit_cdata,
    Comment => visit_comment,
    EntityReference => visit_entity_reference
);
