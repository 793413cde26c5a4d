//! Element attributes.

use crate::model::qname::{Named, QName};

/// An attribute: a [QName] with a string value.
///
/// Attributes have no identity of their own; they are folded into the
/// structural hash of their owning [Element](crate::model::Element).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: QName,
    value: String,
}

impl Attribute {
    pub(crate) fn new(name: QName, value: String) -> Self {
        Self { name, value }
    }

    /// Returns the attribute value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Named for Attribute {
    fn name(&self) -> &QName {
        &self.name
    }
}
