//! Namespace-qualified names.
//!
//! A [QName] identifies elements and attributes by an optional namespace URI
//! and a local name. Prefixes are a serialization detail and never part of
//! the identity; they are assigned by writers and DOM conversion.

use std::fmt;

// =#========================================================================#=
// QNAME
// =#========================================================================#=
/// A namespace-qualified name.
///
/// # Ordering
/// Names order by namespace first (absent namespace sorts before any
/// namespace URI), then by local name. This is the canonical order of
/// attribute lists in [Element](crate::model::Element).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QName {
    namespace: Option<String>,
    local_name: String,
}

impl QName {
    /// Creates a new name.
    ///
    /// # Arguments
    /// * `namespace` - Namespace URI, `None` for names in no namespace
    /// * `local_name` - The local part of the name
    pub(crate) fn new(namespace: Option<String>, local_name: String) -> Self {
        Self { namespace, local_name }
    }

    /// Returns the namespace URI, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local part of the name.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Compares against a borrowed `(namespace, local_name)` pair in
    /// canonical order without allocating.
    pub(crate) fn cmp_parts(&self, namespace: Option<&str>, local_name: &str) -> std::cmp::Ordering {
        self.namespace()
            .cmp(&namespace)
            .then_with(|| self.local_name.as_str().cmp(local_name))
    }
}

/// Clark notation: `{namespace}local` or just `local`.
impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{ns}}}{}", self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

// =#========================================================================#=
// NAMED (trait)
// =#========================================================================#=
/// Anything identified by a [QName].
pub trait Named {
    /// Returns the qualified name.
    fn name(&self) -> &QName;

    /// Returns the namespace URI of the name, if any.
    fn namespace(&self) -> Option<&str> {
        self.name().namespace()
    }

    /// Returns the local part of the name.
    fn local_name(&self) -> &str {
        self.name().local_name()
    }
}

impl Named for QName {
    fn name(&self) -> &QName {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qn(ns: Option<&str>, local: &str) -> QName {
        QName::new(ns.map(String::from), local.to_string())
    }

    #[test]
    fn test_no_namespace_sorts_first() {
        assert!(qn(None, "z") < qn(Some("urn:a"), "a"));
        assert!(qn(Some("urn:a"), "z") < qn(Some("urn:b"), "a"));
        assert!(qn(Some("urn:a"), "a") < qn(Some("urn:a"), "b"));
    }

    #[test]
    fn test_cmp_parts_matches_ord() {
        let name = qn(Some("urn:x"), "id");
        assert_eq!(name.cmp_parts(Some("urn:x"), "id"), std::cmp::Ordering::Equal);
        assert_eq!(name.cmp_parts(None, "id"), std::cmp::Ordering::Greater);
        assert_eq!(name.cmp_parts(Some("urn:x"), "name"), std::cmp::Ordering::Less);
    }

    #[test]
    fn test_display_clark_notation() {
        assert_eq!(qn(Some("urn:x"), "id").to_string(), "{urn:x}id");
        assert_eq!(qn(None, "id").to_string(), "id");
    }
}
