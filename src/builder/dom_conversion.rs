//! Conversion between the model and [DomDocument].
//!
//! Both directions map node types one to one. The model stores names as
//! (namespace, local name) only; on the way out a [NamespaceContext]
//! supplies prefixes and the needed `xmlns` declarations are added. On the
//! way in, declarations and prefixes are dropped. The self-closing flag
//! travels as user data under [EMPTY_MARKER_KEY].

use crate::builder::DocumentBuilder;
use crate::dom::{DomDocument, DomError, DomNodeId, DomNodeKind, NamespaceContext, XMLNS_NAMESPACE};
use crate::model::{
    factory, CData, Comment, Document, Element, EntityReference, Fragment, Named, Node, NodeVisitor,
    ParentNode, Text, TreeNode,
};
use tracing::debug;

/// DOM user data key marking elements written as `<x/>`.
pub const EMPTY_MARKER_KEY: &str = "doctree:empty";

impl DocumentBuilder {
    /// Converts the DOM subtree rooted at `id` into an initialized node.
    ///
    /// # Errors
    /// Returns [DomError::UnsupportedNode] for processing instructions and
    /// document types, which the model cannot represent, and
    /// [DomError::InvalidNode] for ids outside `dom`.
    ///
    /// # Example
    /// ```
    /// use doctree::builder::DocumentBuilder;
    /// use doctree::dom::DomDocument;
    /// use doctree::model::TreeNode;
    ///
    /// let mut dom = DomDocument::new();
    /// let note = dom.create_element_ns(None, "note");
    /// let body = dom.create_text_node("remember");
    /// dom.append_child(dom.root(), note).unwrap();
    /// dom.append_child(note, body).unwrap();
    ///
    /// let node = DocumentBuilder::new().convert_from_dom(&dom, dom.root()).unwrap();
    /// assert_eq!(node.weight(), 3);
    /// ```
    pub fn convert_from_dom(&self, dom: &DomDocument, id: DomNodeId) -> Result<Node, DomError> {
        let mut node = node_from_dom(dom, id)?;
        let fingerprint = node.init();
        debug!(weight = fingerprint.weight, hash = %fingerprint.hash, "converted from DOM");
        Ok(node)
    }

    /// Converts `node` into DOM nodes and inserts them into `parent`, before
    /// `before` or at the end.
    ///
    /// A [Document] has no node of its own in the DOM: its children are
    /// inserted into `parent` directly and `parent` is returned.
    ///
    /// # Arguments
    /// * `node` - Subtree to convert; need not be initialized
    /// * `dom` - Target DOM
    /// * `parent` - DOM node receiving the converted subtree
    /// * `before` - Child of `parent` to insert before, `None` to append
    /// * `namespaces` - Prefix assignment, shared across calls for consistent prefixes
    ///
    /// # Returns
    /// The id of the DOM node created for `node`.
    ///
    /// # Errors
    /// Returns an error if `parent` or `before` are invalid or the insertion
    /// is not allowed by the DOM.
    pub fn convert_to_dom(
        &self,
        node: &Node,
        dom: &mut DomDocument,
        parent: DomNodeId,
        before: Option<DomNodeId>,
        namespaces: &mut NamespaceContext,
    ) -> Result<DomNodeId, DomError> {
        debug!(node_type = %node.node_type(), parent, "converting to DOM");
        let mut cursor = DomCursor {
            dom,
            namespaces,
            parent,
            before,
        };
        node.visit(&DomExporter, &mut cursor)
    }

    /// Converts a document into a new [DomDocument].
    ///
    /// # Errors
    /// Returns an error if the DOM rejects a node.
    pub fn to_dom_document(
        &self,
        document: &Document,
        namespaces: &mut NamespaceContext,
    ) -> Result<DomDocument, DomError> {
        let mut dom = DomDocument::new();
        let mut cursor = DomCursor {
            parent: dom.root(),
            dom: &mut dom,
            namespaces,
            before: None,
        };
        DomExporter.visit_document(document, &mut cursor)?;
        debug!(num_nodes = dom.num_nodes(), "converted document to DOM");
        Ok(dom)
    }
}

// =#========================================================================#=
// DOM -> MODEL
// =#========================================================================#=

fn node_from_dom(dom: &DomDocument, id: DomNodeId) -> Result<Node, DomError> {
    let data = dom.node(id)?;
    let node = match &data.kind {
        DomNodeKind::Document => {
            let mut document = factory::document();
            document.set_children(children_from_dom(dom, &data.children)?);
            document.into()
        }
        DomNodeKind::DocumentFragment => {
            let mut fragment = factory::fragment();
            fragment.set_children(children_from_dom(dom, &data.children)?);
            fragment.into()
        }
        DomNodeKind::Element {
            namespace,
            local_name,
            attributes,
            ..
        } => {
            let mut element = factory::element_ns(namespace.as_deref(), local_name);
            element.set_attributes(
                attributes
                    .iter()
                    .filter(|attr| !attr.is_namespace_declaration())
                    .map(|attr| factory::attr_ns(attr.namespace.as_deref(), &attr.local_name, attr.value.as_str())),
            );
            element.set_children(children_from_dom(dom, &data.children)?);
            element.set_self_closing(dom.user_data(id, EMPTY_MARKER_KEY).is_some());
            element.into()
        }
        DomNodeKind::Text(contents) => factory::text(contents.as_str()).into(),
        DomNodeKind::CData(contents) => factory::cdata(contents.as_str()).into(),
        DomNodeKind::Comment(contents) => factory::comment(contents.as_str()).into(),
        DomNodeKind::EntityReference(name) => factory::entity_ref(name.as_str()).into(),
        unsupported @ (DomNodeKind::ProcessingInstruction { .. } | DomNodeKind::DocumentType { .. }) => {
            return Err(DomError::UnsupportedNode(format!(
                "{} (node {id})",
                unsupported.kind_name()
            )));
        }
    };
    Ok(node)
}

fn children_from_dom(dom: &DomDocument, children: &[DomNodeId]) -> Result<Vec<Node>, DomError> {
    children.iter().map(|&child| node_from_dom(dom, child)).collect()
}

// =#========================================================================#=
// MODEL -> DOM
// =#========================================================================#=

/// Insertion point and shared state of a conversion to DOM.
struct DomCursor<'d> {
    dom: &'d mut DomDocument,
    namespaces: &'d mut NamespaceContext,
    parent: DomNodeId,
    before: Option<DomNodeId>,
}

impl DomCursor<'_> {
    /// Inserts `id` at the cursor and returns it.
    fn insert(&mut self, id: DomNodeId) -> Result<DomNodeId, DomError> {
        self.dom.insert_before(self.parent, id, self.before)?;
        Ok(id)
    }

    /// Converts `children` into `parent`, in order.
    fn export_children(&mut self, parent: DomNodeId, children: &[Node]) -> Result<(), DomError> {
        let mut inner = DomCursor {
            dom: &mut *self.dom,
            namespaces: &mut *self.namespaces,
            parent,
            before: None,
        };
        for child in children {
            child.visit::<ExportResult, _, _>(&DomExporter, &mut inner)?;
        }
        Ok(())
    }
}

/// Stateless visitor creating one DOM node per model node.
struct DomExporter;

type ExportResult = Result<DomNodeId, DomError>;

impl<'c, 'd> NodeVisitor<ExportResult, &'c mut DomCursor<'d>> for DomExporter {
    fn visit_document(&self, node: &Document, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        for child in node.children() {
            child.visit::<ExportResult, _, _>(self, &mut *cursor)?;
        }
        Ok(cursor.parent)
    }

    fn visit_fragment(&self, node: &Fragment, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let id = cursor.dom.create_document_fragment();
        cursor.insert(id)?;
        cursor.export_children(id, node.children())?;
        Ok(id)
    }

    fn visit_element(&self, node: &Element, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let local_name = node.local_name();
        let id = match node.namespace() {
            Some(namespace) => {
                let prefix = cursor.namespaces.prefix_for(namespace);
                let id = cursor.dom.create_element_ns(Some(namespace), &qualify(&prefix, local_name));
                cursor.insert(id)?;
                // Declare unless the prefix is already bound this way in scope
                let prefix = (!prefix.is_empty()).then_some(prefix);
                if cursor.dom.lookup_namespace_uri(cursor.parent, prefix.as_deref()) != Some(namespace) {
                    let declaration = qualify_declaration(prefix.as_deref());
                    cursor.dom.set_attribute_ns(id, Some(XMLNS_NAMESPACE), &declaration, namespace)?;
                }
                id
            }
            None => {
                let id = cursor.dom.create_element_ns(None, local_name);
                cursor.insert(id)?;
                if cursor.dom.lookup_namespace_uri(cursor.parent, None).is_some() {
                    cursor.dom.set_attribute_ns(id, Some(XMLNS_NAMESPACE), "xmlns", "")?;
                }
                id
            }
        };

        for attribute in node.attributes() {
            match attribute.namespace() {
                Some(namespace) => {
                    let prefix = cursor.namespaces.attribute_prefix_for(namespace);
                    if cursor.dom.lookup_namespace_uri(id, Some(&prefix)) != Some(namespace) {
                        let declaration = qualify_declaration(Some(&prefix));
                        cursor.dom.set_attribute_ns(id, Some(XMLNS_NAMESPACE), &declaration, namespace)?;
                    }
                    let qualified_name = qualify(&prefix, attribute.local_name());
                    cursor.dom.set_attribute_ns(id, Some(namespace), &qualified_name, attribute.value())?;
                }
                None => {
                    cursor.dom.set_attribute_ns(id, None, attribute.local_name(), attribute.value())?;
                }
            }
        }

        if node.is_self_closing() {
            cursor.dom.set_user_data(id, EMPTY_MARKER_KEY, "true")?;
        }
        cursor.export_children(id, node.children())?;
        Ok(id)
    }

    fn visit_text(&self, node: &Text, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let id = cursor.dom.create_text_node(node.contents());
        cursor.insert(id)
    }

    fn visit_cdata(&self, node: &CData, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let id = cursor.dom.create_cdata_section(node.contents());
        cursor.insert(id)
    }

    fn visit_comment(&self, node: &Comment, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let id = cursor.dom.create_comment(node.contents());
        cursor.insert(id)
    }

    fn visit_entity_reference(&self, node: &EntityReference, cursor: &'c mut DomCursor<'d>) -> ExportResult {
        let id = cursor.dom.create_entity_reference(node.entity_name());
        cursor.insert(id)
    }
}

fn qualify(prefix: &str, local_name: &str) -> String {
    if prefix.is_empty() {
        local_name.to_string()
    } else {
        format!("{prefix}:{local_name}")
    }
}

/// `xmlns` for the default namespace, `xmlns:p` otherwise.
fn qualify_declaration(prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("xmlns:{prefix}"),
        None => "xmlns".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_namespace_declared_once() {
        let mut outer = factory::element_ns(Some("urn:a"), "outer");
        outer.append_child(factory::element_ns(Some("urn:a"), "inner"));
        let node = Node::from(outer);

        let mut dom = DomDocument::new();
        let root = dom.root();
        let mut namespaces = NamespaceContext::new().with_prefix("urn:a", "a");
        let outer_id = DocumentBuilder::new()
            .convert_to_dom(&node, &mut dom, root, None, &mut namespaces)
            .unwrap();
        let inner_id = dom.children(outer_id).unwrap()[0];

        assert_eq!(dom.attribute_ns(outer_id, Some(XMLNS_NAMESPACE), "a"), Some("urn:a"));
        assert!(dom.attributes(inner_id).unwrap().is_empty());
    }

    #[test]
    fn test_unprefixed_child_resets_default_namespace() {
        let mut outer = factory::element_ns(Some("urn:a"), "outer");
        outer.append_child(factory::element_ns(None, "plain"));
        let node = Node::from(outer);

        let mut dom = DomDocument::new();
        let root = dom.root();
        let mut namespaces = NamespaceContext::new().with_prefix("urn:a", "");
        let outer_id = DocumentBuilder::new()
            .convert_to_dom(&node, &mut dom, root, None, &mut namespaces)
            .unwrap();
        let plain_id = dom.children(outer_id).unwrap()[0];

        assert_eq!(dom.attribute_ns(plain_id, Some(XMLNS_NAMESPACE), "xmlns"), Some(""));
        assert_eq!(dom.lookup_namespace_uri(plain_id, None), None);
    }

    #[test]
    fn test_processing_instruction_is_unsupported() {
        let mut dom = DomDocument::new();
        let pi = dom.create_processing_instruction("php", "echo 1;");
        dom.append_child(dom.root(), pi).unwrap();

        let error = DocumentBuilder::new().convert_from_dom(&dom, dom.root()).unwrap_err();
        assert!(matches!(error, DomError::UnsupportedNode(ref msg) if msg.starts_with("processing-instruction")));
    }
}
