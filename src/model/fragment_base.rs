//! Ordered child storage shared by container nodes.

use crate::model::node::{Node, TreeNode};

// =#========================================================================#=
// FRAGMENT BASE
// =#========================================================================#=
/// Ordered, growable list of children.
///
/// Used by [Document](crate::model::Document),
/// [Fragment](crate::model::Fragment) and [Element](crate::model::Element).
/// Children are owned, so a bulk replacement never aliases the caller's
/// collection.
#[derive(Debug, Clone, Default)]
pub struct FragmentBase {
    children: Vec<Node>,
}

impl FragmentBase {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Returns the children in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Returns the children mutably.
    pub fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    /// Replaces all children, skipping `None` entries.
    pub fn set_children<I, N>(&mut self, children: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<Option<Node>>,
    {
        self.children = children.into_iter().filter_map(Into::<Option<Node>>::into).collect();
    }

    /// Appends a single child.
    pub fn append(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Appends several children, skipping `None` entries.
    pub fn append_all<I, N>(&mut self, children: I)
    where
        I: IntoIterator<Item = N>,
        N: Into<Option<Node>>,
    {
        self.children.extend(children.into_iter().filter_map(Into::<Option<Node>>::into));
    }

    /// Initializes every child subtree.
    pub(crate) fn init_children(&mut self) {
        for child in &mut self.children {
            child.init();
        }
    }
}

// =#========================================================================#=
// PARENT NODE (trait)
// =#========================================================================#=
/// Mutation API of container nodes.
///
/// Every mutation goes through [fragment_base_mut](Self::fragment_base_mut),
/// which clears the container's fingerprint.
pub trait ParentNode: TreeNode {
    /// Returns the child storage.
    fn fragment_base(&self) -> &FragmentBase;

    /// Returns the child storage for mutation, invalidating this node.
    fn fragment_base_mut(&mut self) -> &mut FragmentBase;

    /// Returns the number of direct children.
    fn num_children(&self) -> usize {
        self.fragment_base().children().len()
    }

    /// Returns the children mutably, invalidating this node.
    fn children_mut(&mut self) -> &mut [Node] {
        self.fragment_base_mut().children_mut()
    }

    /// Replaces all children, skipping `None` entries.
    fn set_children<I, N>(&mut self, children: I)
    where
        Self: Sized,
        I: IntoIterator<Item = N>,
        N: Into<Option<Node>>,
    {
        self.fragment_base_mut().set_children(children);
    }

    /// Appends a single child.
    fn append_child(&mut self, child: impl Into<Node>)
    where
        Self: Sized,
    {
        self.fragment_base_mut().append(child.into());
    }

    /// Appends several children, skipping `None` entries.
    fn append_children<I, N>(&mut self, children: I)
    where
        Self: Sized,
        I: IntoIterator<Item = N>,
        N: Into<Option<Node>>,
    {
        self.fragment_base_mut().append_all(children);
    }
}
