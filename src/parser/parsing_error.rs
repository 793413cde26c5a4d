//! Error types for reading XML documents.
//!
//! This module provides [ParsingError] and [ParsingErrorType] for representing
//! and reporting errors that occur while reading markup or building a tree
//! from its events.

use crate::parser::byte_parser::ByteParser;
use crate::parser::byte_source::{ByteSource, TextLocation};
use std::error::Error;
use std::fmt;

/// Default length of context provided by errors from the reader
const DEFAULT_CONTEXT_LENGTH: usize = 50;

// =#========================================================================#=
// PARSING ERROR TYPE
// =#========================================================================#=
/// Error types that can occur while reading a document.
#[derive(PartialEq, Debug, Clone)]
pub enum ParsingErrorType {
    IoError(String),
    UnexpectedEOF,
    MalformedMarkup(String),
    MismatchedEndTag { expected: String, found: String },
    UndeclaredPrefix(String),
    UnsupportedEvent(String),
    UnbalancedDocument,
}

// =#========================================================================#=
// PARSING ERROR
// =#========================================================================#=
/// Parsing error with contextual information (position and surrounding bytes).
#[derive(Debug)]
pub struct ParsingError {
    kind: ParsingErrorType,
    position: usize,
    /// Only known for errors raised by the reader
    location: Option<TextLocation>,
    context: String,
}

impl ParsingError {
    /// Create a ParsingError from an error type and parser state
    pub fn from_parser<S: ByteSource>(kind: ParsingErrorType, parser: &ByteParser<S>) -> Self {
        Self {
            kind,
            position: parser.position(),
            location: Some(parser.location()),
            context: parser.get_context_as_string(DEFAULT_CONTEXT_LENGTH),
        }
    }

    /// Convenience constructor for UnexpectedEOF
    pub fn unexpected_eof<S: ByteSource>(parser: &ByteParser<S>) -> Self {
        Self::from_parser(ParsingErrorType::UnexpectedEOF, parser)
    }

    /// Convenience constructor for MalformedMarkup
    pub fn malformed_markup<S: ByteSource>(parser: &ByteParser<S>, msg: String) -> Self {
        Self::from_parser(ParsingErrorType::MalformedMarkup(msg), parser)
    }

    /// Convenience constructor for MismatchedEndTag
    pub fn mismatched_end_tag<S: ByteSource>(
        parser: &ByteParser<S>,
        expected: String,
        found: String,
    ) -> Self {
        Self::from_parser(ParsingErrorType::MismatchedEndTag { expected, found }, parser)
    }

    /// Convenience constructor for UndeclaredPrefix
    pub fn undeclared_prefix<S: ByteSource>(parser: &ByteParser<S>, prefix: String) -> Self {
        Self::from_parser(ParsingErrorType::UndeclaredPrefix(prefix), parser)
    }

    /// Create a ParsingError at a known offset without byte context (for builder errors)
    pub fn at_offset(kind: ParsingErrorType, position: usize) -> Self {
        Self {
            kind,
            position,
            location: None,
            context: String::new(),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> &ParsingErrorType {
        &self.kind
    }

    /// Get the position where the error occurred
    pub fn position(&self) -> usize {
        self.position
    }

    /// Get the line and column where the reader stopped, if known
    pub fn location(&self) -> Option<TextLocation> {
        self.location
    }
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // Main error message
        match &self.kind {
            ParsingErrorType::IoError(msg) => write!(f, "IO error - {msg}")?,
            ParsingErrorType::UnexpectedEOF => write!(f, "Unexpected end of file")?,
            ParsingErrorType::MalformedMarkup(msg) => write!(f, "Malformed markup - {msg}")?,
            ParsingErrorType::MismatchedEndTag { expected, found } => {
                write!(f, "End tag </{found}> does not match start tag <{expected}>")?
            }
            ParsingErrorType::UndeclaredPrefix(prefix) => {
                write!(f, "Namespace prefix '{prefix}' is not declared")?
            }
            ParsingErrorType::UnsupportedEvent(event) => {
                write!(f, "Unsupported event {event} in document content")?
            }
            ParsingErrorType::UnbalancedDocument => {
                write!(f, "Document ended with unclosed elements")?
            }
        }

        // Additional position information
        match self.location {
            Some(location) => write!(f, " at {location} (byte {})", self.position)?,
            None => write!(f, " at position {}", self.position)?,
        }

        // Additional context if available
        if !self.context.is_empty() {
            write!(f, "\n  Context (next {} bytes): {}", self.context.len(), self.context)?;
        }

        Ok(())
    }
}

impl Error for ParsingError {}

impl From<std::io::Error> for ParsingError {
    fn from(err: std::io::Error) -> Self {
        ParsingError {
            kind: ParsingErrorType::IoError(err.to_string()),
            position: 0,            // No position for IO errors
            location: None,
            context: String::new(), // No parsing context
        }
    }
}
