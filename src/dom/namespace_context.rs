//! Namespace to prefix assignment for DOM output.

use crate::parser::xml_stream_reader::XML_NAMESPACE;
use std::collections::HashMap;

/// Assigns prefixes to namespaces when the model, which stores only
/// namespace URIs, is converted to a DOM.
///
/// Preferred prefixes are registered with [with_prefix](NamespaceContext::with_prefix);
/// an empty prefix makes the namespace the default namespace of elements.
/// Other namespaces get `ns0`, `ns1`, ... in order of first use. The XML
/// namespace is always bound to `xml`.
///
/// # Example
/// ```
/// use doctree::dom::NamespaceContext;
///
/// let mut context = NamespaceContext::new().with_prefix("http://www.w3.org/1999/xlink", "xlink");
/// assert_eq!(context.prefix_for("http://www.w3.org/1999/xlink"), "xlink");
/// assert_eq!(context.prefix_for("urn:a"), "ns0");
/// assert_eq!(context.prefix_for("urn:b"), "ns1");
/// assert_eq!(context.prefix_for("urn:a"), "ns0");
/// ```
#[derive(Debug, Clone)]
pub struct NamespaceContext {
    /// Namespace URI -> prefix
    prefixes: HashMap<String, String>,
    /// Prefixes for namespaces whose element prefix is empty
    attribute_prefixes: HashMap<String, String>,
    next_generated: usize,
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceContext {
    pub fn new() -> Self {
        NamespaceContext {
            prefixes: HashMap::from([(XML_NAMESPACE.to_string(), "xml".to_string())]),
            attribute_prefixes: HashMap::new(),
            next_generated: 0,
        }
    }

    /// Registers the prefix to use for `namespace`.
    pub fn with_prefix(mut self, namespace: &str, prefix: &str) -> Self {
        self.prefixes.insert(namespace.to_string(), prefix.to_string());
        self
    }

    /// Returns the prefix for elements in `namespace`, assigning a fresh one
    /// if the namespace is new. May be empty (default namespace).
    pub fn prefix_for(&mut self, namespace: &str) -> String {
        if let Some(prefix) = self.prefixes.get(namespace) {
            return prefix.clone();
        }
        let prefix = self.generate();
        self.prefixes.insert(namespace.to_string(), prefix.clone());
        prefix
    }

    /// Returns a non-empty prefix for attributes in `namespace`.
    ///
    /// Attributes cannot use the default namespace, so a namespace
    /// registered with an empty prefix gets a generated one here.
    pub fn attribute_prefix_for(&mut self, namespace: &str) -> String {
        let prefix = self.prefix_for(namespace);
        if !prefix.is_empty() {
            return prefix;
        }
        if let Some(prefix) = self.attribute_prefixes.get(namespace) {
            return prefix.clone();
        }
        let prefix = self.generate();
        self.attribute_prefixes.insert(namespace.to_string(), prefix.clone());
        prefix
    }

    /// Next `nsN` not registered by the user.
    fn generate(&mut self) -> String {
        loop {
            let candidate = format!("ns{}", self.next_generated);
            self.next_generated += 1;
            if !self.prefixes.values().any(|p| *p == candidate) {
                return candidate;
            }
        }
    }
}
