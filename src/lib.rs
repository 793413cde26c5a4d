//! Doctree is a library of content-addressed XML document trees for
//! document comparison.
//!
//! After a single initialization pass every node of a tree carries a
//! structural hash and a weight (its subtree size), so two independently
//! built trees, or any two of their subtrees, compare in O(1).
//! Core functionality provided:
//! - Model: [Document], [Element], text, CDATA, comments, entity references
//!   and transparent fragments, see [crate::model].
//!   - Structural hash: folds node type, local data and the children's
//!     hashes in order. Attribute order in the source never matters,
//!     child order always does.
//!   - Weight: 1 per node, plus 1 per attribute, 0 for fragments.
//!   - Traversal with visitors ([NodeVisitor](model::NodeVisitor)).
//! - Parsing: [DocumentBuilder](builder::DocumentBuilder) builds trees from
//!   any [XmlEventReader](parser::XmlEventReader); a namespace-aware
//!   [XmlStreamReader](parser::XmlStreamReader) is included.
//!   Elements written as `<x/>` are remembered as self-closing.
//! - Writing: [DocumentSerializer](writer::DocumentSerializer) drives any
//!   [XmlEventWriter](writer::XmlEventWriter); an
//!   [XmlStreamWriter](writer::XmlStreamWriter) is included.
//! - DOM interop: conversion to and from an arena DOM ([crate::dom]).
//! - Configurability:
//!   - Whitespace collapsing: drop whitespace-only text and comments while
//!     parsing, for comparisons that must ignore formatting
//!   - Namespace prefixes for DOM output
//!
//! Limitations:
//! - DTDs and processing instructions are read but not kept
//! - Entities other than the predefined ones are kept as references, not expanded
//!
//! # Usage patterns
//! 1. Quick functions at the crate root parse and write with default settings.
//! 2. Configure a [DocumentBuilder](builder::DocumentBuilder) and pick a
//!    reader or writer yourself for full control.
//!
//! ## Example Default Configuration
//! ```
//! use doctree::model::TreeNode;
//!
//! let a = doctree::parse_str(r#"<point y="2" x="1"/>"#).unwrap();
//! let b = doctree::parse_str(r#"<point x="1" y="2"/>"#).unwrap();
//! assert!(a.structurally_equals(&b));
//! assert_eq!(doctree::to_xml_string(&a).unwrap(), r#"<point x="1" y="2"/>"#);
//! ```
//!
//! ## Example Builder Configuration
//! ```
//! use doctree::builder::DocumentBuilder;
//! use doctree::parser::XmlStreamReader;
//! use doctree::model::TreeNode;
//!
//! let builder = DocumentBuilder::new().with_collapse_whitespace(true);
//! let mut reader = XmlStreamReader::for_str("<list>\n  <item/>\n  <!-- todo -->\n</list>");
//! let document = builder.parse(&mut reader)?;
//!
//! // document, list, item
//! assert_eq!(document.weight(), 3);
//! # Ok::<(), doctree::parser::ParsingError>(())
//! ```

pub mod builder;
pub mod dom;
pub mod model;
pub mod parser;
pub mod writer;

pub use model::{Document, Element, Node};

use crate::builder::DocumentBuilder;
use crate::model::Visitable;
use crate::parser::{ParsingError, XmlStreamReader};
use crate::writer::{DocumentSerializer, SerializationError, XmlStreamWriter};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

// ============================================================================
// QUICK PARSING API (pub)
// ============================================================================
/// Parses an XML string into an initialized [Document].
///
/// Whitespace and comments are kept; see [parse_str_collapsed] to drop them.
///
/// # Errors
/// Returns a [ParsingError] if the string is not well-formed XML.
pub fn parse_str(xml: &str) -> Result<Document, ParsingError> {
    DocumentBuilder::new().parse(&mut XmlStreamReader::for_str(xml))
}

/// Parses an XML string, dropping whitespace-only text and comments.
///
/// # Errors
/// Returns a [ParsingError] if the string is not well-formed XML.
pub fn parse_str_collapsed(xml: &str) -> Result<Document, ParsingError> {
    DocumentBuilder::new()
        .with_collapse_whitespace(true)
        .parse(&mut XmlStreamReader::for_str(xml))
}

/// Parses an XML file into an initialized [Document].
///
/// # Arguments
/// * `path` - Path to the file (accepting `&str`, `String`, `Path`, or `PathBuf`)
///
/// # Errors
/// Returns a [ParsingError] if the file cannot be read or is not well-formed XML.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document, ParsingError> {
    let mut reader = XmlStreamReader::for_file(path)?;
    DocumentBuilder::new().parse(&mut reader)
}

// ============================================================================
// QUICK WRITING API (pub)
// ============================================================================
/// Serializes a document or subtree into an XML string without declaration.
///
/// # Errors
/// Returns a [SerializationError] if the tree cannot be written.
pub fn to_xml_string<T: Visitable + ?Sized>(root: &T) -> Result<String, SerializationError> {
    let mut writer = XmlStreamWriter::new(Vec::new());
    DocumentSerializer::new().serialize(root, &mut writer)?;
    String::from_utf8(writer.into_inner())
        .map_err(|err| SerializationError::from(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Writes a document or subtree to a file. Documents get an XML declaration.
///
/// # Errors
/// Returns a [SerializationError] if the file cannot be created or written.
pub fn write_xml_file<P, T>(path: P, root: &T) -> Result<(), SerializationError>
where
    P: AsRef<Path>,
    T: Visitable + ?Sized,
{
    let file = File::create(path)?;
    let mut writer = XmlStreamWriter::new(BufWriter::new(file)).with_xml_declaration(true);
    DocumentSerializer::new().serialize(root, &mut writer)
}
