//! Writing document trees as markup events.

use crate::model::{
    CData, Comment, Document, Element, EntityReference, Fragment, Named, Node, NodeVisitor, Text, TreeNode,
    Visitable,
};
use crate::writer::event_writer::XmlEventWriter;
use std::error::Error;
use std::fmt;
use std::io;
use tracing::debug;

// =#========================================================================#=
// SERIALIZATION ERROR
// =#========================================================================#=
/// The output failed while a tree was serialized.
#[derive(Debug)]
pub struct SerializationError {
    source: io::Error,
}

impl SerializationError {
    /// The failure of the underlying output.
    pub fn io_error(&self) -> &io::Error {
        &self.source
    }

    pub fn into_io_error(self) -> io::Error {
        self.source
    }
}

impl fmt::Display for SerializationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Serialization failed - {}", self.source)
    }
}

impl Error for SerializationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

impl From<io::Error> for SerializationError {
    fn from(source: io::Error) -> Self {
        SerializationError { source }
    }
}

// =#========================================================================#=
// DOCUMENT SERIALIZER
// =#========================================================================#=
/// Emits the events that reproduce a tree on an [XmlEventWriter].
///
/// Attributes are written in canonical order. An element is written
/// self-closing only if it was read as `<x/>` and still has no children.
/// Documents are framed by start and end document events; any other root
/// is written as a bare subtree.
///
/// # Example
/// ```
/// use doctree::model::{factory, Node, ParentNode};
/// use doctree::writer::{DocumentSerializer, XmlStreamWriter};
///
/// let mut list = factory::element_ns(None, "list");
/// list.set_attributes([factory::attr_ns(None, "z", "1"), factory::attr_ns(None, "a", "2")]);
/// list.append_child(factory::element_ns(None, "item").with_self_closing(true));
/// list.append_child(factory::element_ns(None, "item"));
///
/// let mut writer = XmlStreamWriter::new(Vec::new());
/// DocumentSerializer::new().serialize(&Node::from(list), &mut writer).unwrap();
///
/// let xml = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(xml, r#"<list a="2" z="1"><item/><item></item></list>"#);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentSerializer;

impl DocumentSerializer {
    pub fn new() -> Self {
        DocumentSerializer
    }

    /// Writes `root` and its subtree to `writer`, then flushes it.
    ///
    /// # Errors
    /// Returns a [SerializationError] wrapping the first failure of `writer`.
    pub fn serialize<T, W>(&self, root: &T, writer: &mut W) -> Result<(), SerializationError>
    where
        T: Visitable + ?Sized,
        W: XmlEventWriter + ?Sized,
    {
        debug!("serializing tree");
        let written: io::Result<()> = root.accept(self, &mut *writer);
        written?;
        writer.flush()?;
        debug!("serialized tree");
        Ok(())
    }

    fn serialize_children<W>(&self, children: &[Node], writer: &mut W) -> io::Result<()>
    where
        W: XmlEventWriter + ?Sized,
    {
        for child in children {
            child.visit::<io::Result<()>, _, _>(self, &mut *writer)?;
        }
        Ok(())
    }
}

impl<'w, W> NodeVisitor<io::Result<()>, &'w mut W> for DocumentSerializer
where
    W: XmlEventWriter + ?Sized,
{
    fn visit_document(&self, node: &Document, writer: &'w mut W) -> io::Result<()> {
        writer.write_start_document()?;
        self.serialize_children(node.children(), writer)?;
        writer.write_end_document()
    }

    fn visit_fragment(&self, node: &Fragment, writer: &'w mut W) -> io::Result<()> {
        self.serialize_children(node.children(), writer)
    }

    fn visit_element(&self, node: &Element, writer: &'w mut W) -> io::Result<()> {
        let self_closing = node.is_self_closing() && node.children().is_empty();
        if self_closing {
            writer.write_empty_element(node.namespace(), node.local_name())?;
        } else {
            writer.write_start_element(node.namespace(), node.local_name())?;
        }

        for attribute in node.attributes() {
            writer.write_attribute(attribute.namespace(), attribute.local_name(), attribute.value())?;
        }

        if !self_closing {
            self.serialize_children(node.children(), writer)?;
            writer.write_end_element()?;
        }
        Ok(())
    }

    fn visit_text(&self, node: &Text, writer: &'w mut W) -> io::Result<()> {
        writer.write_characters(node.contents())
    }

    fn visit_cdata(&self, node: &CData, writer: &'w mut W) -> io::Result<()> {
        writer.write_cdata(node.contents())
    }

    fn visit_comment(&self, node: &Comment, writer: &'w mut W) -> io::Result<()> {
        writer.write_comment(node.contents())
    }

    fn visit_entity_reference(&self, node: &EntityReference, writer: &'w mut W) -> io::Result<()> {
        writer.write_entity_ref(node.entity_name())
    }
}
