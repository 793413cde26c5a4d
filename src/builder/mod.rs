//! Building content-addressed trees from markup events and from DOMs.
//!
//! [DocumentBuilder] drives an [XmlEventReader] to completion, assembles an
//! uninitialized [Document] and initializes it once at the end. It also
//! converts between the model and [DomDocument](crate::dom::DomDocument)
//! (see [DocumentBuilder::convert_from_dom] and
//! [DocumentBuilder::convert_to_dom]).
//!
//! # Self-closing detection
//! The reader's offset is recorded right after each start element and
//! compared with the offset right after the matching end element. For
//! `<a/>` no bytes lie between the two events, so the offsets are equal and
//! the element is flagged self-closing. `<a></a>` also has no children but
//! advances the offset, so it is not.

mod dom_conversion;

pub use dom_conversion::EMPTY_MARKER_KEY;

use crate::model::{factory, Document, Element, Named, Node, ParentNode, TreeNode};
use crate::parser::byte_parser::is_xml_whitespace;
use crate::parser::{ParsingError, ParsingErrorType, XmlEventKind, XmlEventReader};
use tracing::{debug, trace};

// =#========================================================================#=
// DOCUMENT BUILDER
// =#========================================================================#=
/// Builds [Document]s from event readers and converts them to and from DOMs.
///
/// # Example
/// ```
/// use doctree::builder::DocumentBuilder;
/// use doctree::parser::XmlStreamReader;
/// use doctree::model::TreeNode;
///
/// let builder = DocumentBuilder::new().with_collapse_whitespace(true);
/// let spaced = builder.parse(&mut XmlStreamReader::for_str("<a> <b/> <!-- x --></a>")).unwrap();
/// let tight = builder.parse(&mut XmlStreamReader::for_str("<a><b/></a>")).unwrap();
/// assert!(spaced.structurally_equals(&tight));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    collapse_whitespace: bool,
}

impl DocumentBuilder {
    /// Creates a builder that keeps whitespace and comments.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops whitespace-only character data and comments while parsing.
    ///
    /// Use this to compare documents whose formatting and comments must not
    /// affect structural identity. The resulting trees no longer reproduce
    /// the source.
    pub fn with_collapse_whitespace(mut self, collapse_whitespace: bool) -> Self {
        self.collapse_whitespace = collapse_whitespace;
        self
    }

    /// Whether whitespace-only character data and comments are dropped.
    pub fn collapse_whitespace(&self) -> bool {
        self.collapse_whitespace
    }

    /// Reads all events from `reader` and returns the initialized document.
    ///
    /// DTDs, entity and notation declarations and processing instructions
    /// are dropped. The reader is consumed up to and including its end of
    /// document.
    ///
    /// # Arguments
    /// * `reader` - Event source positioned before the start of the document
    ///
    /// # Returns
    /// * [Document] - Initialized document tree
    /// * [ParsingError] - If the reader fails, reports a standalone attribute
    ///   or namespace event, or its element events do not nest
    pub fn parse<R: XmlEventReader + ?Sized>(&self, reader: &mut R) -> Result<Document, ParsingError> {
        debug!(collapse_whitespace = self.collapse_whitespace, "parsing document");

        let mut document = factory::document();
        // Open elements with the reader offset after their start event
        let mut open: Vec<(Element, usize)> = Vec::new();

        loop {
            let kind = reader.next_event()?;
            match kind {
                XmlEventKind::StartDocument => {}
                XmlEventKind::EndDocument => break,
                XmlEventKind::StartElement => {
                    let mut element = factory::element_ns(reader.namespace(), reader.local_name());
                    element.set_attributes((0..reader.attribute_count()).map(|i| {
                        factory::attr_ns(
                            reader.attribute_namespace(i),
                            reader.attribute_local_name(i),
                            reader.attribute_value(i),
                        )
                    }));
                    open.push((element, reader.offset()));
                }
                XmlEventKind::EndElement => {
                    let Some((mut element, start_offset)) = open.pop() else {
                        return Err(ParsingError::at_offset(
                            ParsingErrorType::UnbalancedDocument,
                            reader.offset(),
                        ));
                    };
                    if reader.offset() == start_offset {
                        trace!(element = %element.name(), "self-closing");
                        element.set_self_closing(true);
                    }
                    append(&mut document, &mut open, element);
                }
                XmlEventKind::Characters | XmlEventKind::Whitespace => {
                    if self.collapse_whitespace && is_whitespace(reader.text()) {
                        trace!("dropped whitespace");
                    } else {
                        append(&mut document, &mut open, factory::text(reader.text()));
                    }
                }
                XmlEventKind::CData => {
                    append(&mut document, &mut open, factory::cdata(reader.text()));
                }
                XmlEventKind::Comment => {
                    if self.collapse_whitespace {
                        trace!("dropped comment");
                    } else {
                        append(&mut document, &mut open, factory::comment(reader.text()));
                    }
                }
                XmlEventKind::EntityReference => {
                    append(&mut document, &mut open, factory::entity_ref(reader.local_name()));
                }
                ignored if ignored.is_ignorable() => {
                    trace!(event = %ignored, "ignored event");
                }
                unsupported => {
                    return Err(ParsingError::at_offset(
                        ParsingErrorType::UnsupportedEvent(unsupported.to_string()),
                        reader.offset(),
                    ));
                }
            }
        }

        if !open.is_empty() {
            return Err(ParsingError::at_offset(
                ParsingErrorType::UnbalancedDocument,
                reader.offset(),
            ));
        }

        let fingerprint = document.init();
        debug!(weight = fingerprint.weight, hash = %fingerprint.hash, "parsed document");
        Ok(document)
    }
}

/// Appends `node` to the innermost open element, or to the document.
fn append(document: &mut Document, open: &mut [(Element, usize)], node: impl Into<Node>) {
    match open.last_mut() {
        Some((parent, _)) => parent.append_child(node),
        None => document.append_child(node),
    }
}

fn is_whitespace(text: &str) -> bool {
    text.bytes().all(is_xml_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;
    use crate::parser::XmlStreamReader;

    /// Replays a fixed list of events.
    struct ScriptedReader {
        events: Vec<XmlEventKind>,
        offsets: Vec<usize>,
        next: usize,
    }

    impl ScriptedReader {
        fn new(events: Vec<(XmlEventKind, usize)>) -> Self {
            let (events, offsets): (Vec<XmlEventKind>, Vec<usize>) = events.into_iter().unzip();
            Self { events, offsets, next: 0 }
        }
    }

    impl XmlEventReader for ScriptedReader {
        fn next_event(&mut self) -> Result<XmlEventKind, ParsingError> {
            self.next += 1;
            Ok(self.events[self.next - 1])
        }
        fn local_name(&self) -> &str {
            "x"
        }
        fn namespace(&self) -> Option<&str> {
            None
        }
        fn attribute_count(&self) -> usize {
            0
        }
        fn attribute_local_name(&self, _index: usize) -> &str {
            unreachable!()
        }
        fn attribute_namespace(&self, _index: usize) -> Option<&str> {
            unreachable!()
        }
        fn attribute_value(&self, _index: usize) -> &str {
            unreachable!()
        }
        fn text(&self) -> &str {
            ""
        }
        fn offset(&self) -> usize {
            self.offsets[self.next - 1]
        }
    }

    #[test]
    fn test_standalone_attribute_event_is_rejected() {
        let mut reader = ScriptedReader::new(vec![
            (XmlEventKind::StartDocument, 0),
            (XmlEventKind::StartElement, 3),
            (XmlEventKind::Attribute, 3),
        ]);
        let error = DocumentBuilder::new().parse(&mut reader).unwrap_err();
        assert_eq!(error.kind(), &ParsingErrorType::UnsupportedEvent("ATTRIBUTE".to_string()));
    }

    #[test]
    fn test_unbalanced_events_are_rejected() {
        let mut reader = ScriptedReader::new(vec![
            (XmlEventKind::StartDocument, 0),
            (XmlEventKind::StartElement, 3),
            (XmlEventKind::EndDocument, 3),
        ]);
        let error = DocumentBuilder::new().parse(&mut reader).unwrap_err();
        assert_eq!(error.kind(), &ParsingErrorType::UnbalancedDocument);
    }

    #[test]
    fn test_ignorable_events_leave_no_trace() {
        let mut reader = ScriptedReader::new(vec![
            (XmlEventKind::StartDocument, 0),
            (XmlEventKind::Dtd, 10),
            (XmlEventKind::ProcessingInstruction, 20),
            (XmlEventKind::StartElement, 23),
            (XmlEventKind::EndElement, 23),
            (XmlEventKind::EndDocument, 23),
        ]);
        let document = DocumentBuilder::new().parse(&mut reader).unwrap();
        assert_eq!(document.num_children(), 1);
        assert_eq!(document.children()[0].node_type(), NodeType::Element);
    }

    #[test]
    fn test_offsets_decide_self_closing() {
        let mut reader = XmlStreamReader::for_str("<r><a/><b></b></r>");
        let document = DocumentBuilder::new().parse(&mut reader).unwrap();
        let root = document.document_element().unwrap();
        let a = root.children()[0].as_element().unwrap();
        let b = root.children()[1].as_element().unwrap();
        assert_eq!(a.local_name(), "a");
        assert!(a.is_self_closing());
        assert!(!b.is_self_closing());
        assert!(!root.is_self_closing());
    }
}
