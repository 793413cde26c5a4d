//! Pull-event contract between a markup reader and the
//! [DocumentBuilder](crate::builder::DocumentBuilder).

use crate::parser::parsing_error::ParsingError;
use std::fmt;

/// Kinds of events a [XmlEventReader] reports.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum XmlEventKind {
    StartDocument,
    EndDocument,
    StartElement,
    EndElement,
    Characters,
    /// Character data consisting of XML whitespace only.
    Whitespace,
    CData,
    Comment,
    EntityReference,
    Dtd,
    EntityDeclaration,
    NotationDeclaration,
    ProcessingInstruction,
    /// Standalone attribute, never part of element content.
    Attribute,
    /// Standalone namespace declaration, never part of element content.
    Namespace,
}

impl XmlEventKind {
    /// Whether a tree builder drops this kind without a trace in the model.
    pub fn is_ignorable(&self) -> bool {
        matches!(
            self,
            XmlEventKind::Dtd
                | XmlEventKind::EntityDeclaration
                | XmlEventKind::NotationDeclaration
                | XmlEventKind::ProcessingInstruction
        )
    }
}

impl fmt::Display for XmlEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            XmlEventKind::StartDocument => "START_DOCUMENT",
            XmlEventKind::EndDocument => "END_DOCUMENT",
            XmlEventKind::StartElement => "START_ELEMENT",
            XmlEventKind::EndElement => "END_ELEMENT",
            XmlEventKind::Characters => "CHARACTERS",
            XmlEventKind::Whitespace => "SPACE",
            XmlEventKind::CData => "CDATA",
            XmlEventKind::Comment => "COMMENT",
            XmlEventKind::EntityReference => "ENTITY_REFERENCE",
            XmlEventKind::Dtd => "DTD",
            XmlEventKind::EntityDeclaration => "ENTITY_DECLARATION",
            XmlEventKind::NotationDeclaration => "NOTATION_DECLARATION",
            XmlEventKind::ProcessingInstruction => "PROCESSING_INSTRUCTION",
            XmlEventKind::Attribute => "ATTRIBUTE",
            XmlEventKind::Namespace => "NAMESPACE",
        };
        f.write_str(name)
    }
}

// =#========================================================================#=
// XML EVENT READER (trait)
// =#========================================================================#=
/// Pull source of markup events.
///
/// After [next_event](XmlEventReader::next_event) returned a kind, the
/// accessors describe that event:
/// - `StartElement` / `EndElement`: [local_name](XmlEventReader::local_name),
///   [namespace](XmlEventReader::namespace) and (start only) the attributes.
/// - `Characters`, `Whitespace`, `CData`, `Comment`: [text](XmlEventReader::text).
/// - `EntityReference`: [local_name](XmlEventReader::local_name) holds the entity name.
///
/// [offset](XmlEventReader::offset) is the source position right after the
/// event. A self-closing `<x/>` reports its `EndElement` at the same offset
/// as the `StartElement`.
pub trait XmlEventReader {
    /// Advances to the next event.
    ///
    /// # Errors
    /// Returns a [ParsingError] if the source is malformed or cannot be read.
    fn next_event(&mut self) -> Result<XmlEventKind, ParsingError>;

    /// Local name of the current element, or name of the current entity reference.
    fn local_name(&self) -> &str;

    /// Namespace URI of the current element.
    fn namespace(&self) -> Option<&str>;

    /// Number of attributes on the current start element (namespace declarations excluded).
    fn attribute_count(&self) -> usize;

    fn attribute_local_name(&self, index: usize) -> &str;

    fn attribute_namespace(&self, index: usize) -> Option<&str>;

    fn attribute_value(&self, index: usize) -> &str;

    /// Decoded text of the current character, CDATA or comment event.
    fn text(&self) -> &str;

    /// Source position right after the current event.
    fn offset(&self) -> usize;
}
