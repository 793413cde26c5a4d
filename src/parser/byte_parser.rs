//! Low-level byte-by-byte parser for markup.
//!
//! This module provides [ByteParser] with support for peeking, consuming,
//! pattern matching and name scanning. It is the foundation of
//! [XmlStreamReader](crate::parser::XmlStreamReader).

use crate::parser::byte_source::{ByteSource, DocumentSource, TextLocation};
use crate::parser::parsing_error::ParsingError;

/// Bytes that terminate an XML name.
const NAME_DELIMITERS: &[u8] = b" \t\r\n/>=<?;&\"'[]";

// =#========================================================================#=
// BYTE PARSER
// =#========================================================================#=
/// A byte-by-byte parser with support for peeking, consuming, and pattern matching.
///
/// Matching is exact (XML is case-sensitive). Multi-byte UTF-8 sequences are
/// never split by the scanning methods, since every delimiter is ASCII.
///
/// # Example
/// ```
/// use doctree::parser::ByteParser;
/// use doctree::parser::byte_parser::ConsumeMode;
///
/// let mut parser = ByteParser::for_str("<!-- note --><a/>");
/// assert!(parser.consume_if_sequence(b"<!--"));
/// assert!(parser.consume_until_sequence(b"-->", ConsumeMode::Inclusive));
/// assert_eq!(parser.peek(), Some(b'<'));
/// ```
pub struct ByteParser<S: ByteSource> {
    source: S,
}

impl ByteParser<DocumentSource> {
    /// Creates a new `ByteParser` from a byte slice by copying it into a Vec.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(DocumentSource::new(input.to_vec()))
    }

    /// Creates a new `ByteParser` from a string by copying it into a Vec.
    pub fn for_str(input: &str) -> Self {
        Self::new(DocumentSource::new(input.as_bytes().to_vec()))
    }
}

impl<S: ByteSource> ByteParser<S> {
    /// Creates a new `ByteParser` from a byte source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Peeks at the current byte without consuming it.
    #[inline(always)]
    pub fn peek(&self) -> Option<u8> {
        self.source.peek()
    }

    /// Gets the current byte and advances the position (consumes it).
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        self.source.next_byte()
    }

    /// Skips (consumes) all consecutive XML whitespace.
    ///
    /// # Returns
    /// `true` if at least one byte was skipped
    pub fn skip_whitespace(&mut self) -> bool {
        let start = self.position();
        while let Some(b) = self.peek() {
            if is_xml_whitespace(b) {
                self.next_byte();
            } else {
                break;
            }
        }
        self.position() > start
    }

    /// Checks if the current byte equals `ch`.
    #[inline]
    pub fn peek_is(&self, ch: u8) -> bool {
        self.peek() == Some(ch)
    }

    /// Checks if the following bytes equal `sequence`, without consuming.
    #[inline]
    pub fn peek_is_sequence(&self, sequence: &[u8]) -> bool {
        self.source.peek_slice(sequence.len()) == sequence
    }

    /// Consumes the current byte if it equals `ch`.
    ///
    /// # Returns
    /// `true` if the byte was matched and consumed, `false` otherwise
    pub fn consume_if(&mut self, ch: u8) -> bool {
        if self.peek_is(ch) {
            self.next_byte();
            true
        } else {
            false
        }
    }

    /// Consumes the next bytes if they equal `sequence`.
    ///
    /// # Returns
    /// `true` if the sequence was matched and consumed, `false` otherwise
    pub fn consume_if_sequence(&mut self, sequence: &[u8]) -> bool {
        if !self.peek_is_sequence(sequence) {
            return false;
        }
        self.set_position(self.position() + sequence.len());
        true
    }

    /// Consumes bytes until the target byte is found.
    ///
    /// # Arguments
    /// * `target` - The byte to search for
    /// * `mode` - Whether to consume the target byte (`Inclusive`) or stop before it (`Exclusive`)
    ///
    /// # Returns
    /// `true` if the target was found, `false` if EOF was reached first
    pub fn consume_until(&mut self, target: u8, mode: ConsumeMode) -> bool {
        self.consume_until_any(&[target], mode).is_some()
    }

    /// Consumes bytes until any of the target bytes is found.
    ///
    /// # Returns
    /// `Some(u8)` with the found byte, or `None` if EOF was reached first
    pub fn consume_until_any(&mut self, targets: &[u8], mode: ConsumeMode) -> Option<u8> {
        while let Some(b) = self.peek() {
            if targets.contains(&b) {
                if mode == ConsumeMode::Inclusive {
                    self.next_byte();
                }
                return Some(b);
            }
            self.next_byte();
        }
        None
    }

    /// Consumes bytes until the next bytes equal `sequence`.
    ///
    /// # Returns
    /// `true` if the sequence was found, `false` if EOF was reached first
    pub fn consume_until_sequence(&mut self, sequence: &[u8], mode: ConsumeMode) -> bool {
        loop {
            if self.is_eof() {
                return false;
            }

            if self.peek_is_sequence(sequence) {
                if mode == ConsumeMode::Inclusive {
                    self.set_position(self.position() + sequence.len());
                }
                return true;
            }

            self.next_byte();
        }
    }

    /// Returns whether the end of data (EOF) has been reached.
    pub fn is_eof(&self) -> bool {
        self.source.is_eof()
    }

    /// Returns the current byte offset in the input.
    pub fn position(&self) -> usize {
        self.source.position()
    }

    /// Sets the position in the byte stream.
    pub fn set_position(&mut self, pos: usize) {
        self.source.set_position(pos);
    }

    /// Returns a slice of the input from a start position to the current position.
    ///
    /// # Returns
    /// A byte slice from `start` to the current position, or empty slice if not available
    pub fn slice_from(&self, start: usize) -> &[u8] {
        self.source.slice_from(start)
    }

    /// Line and column of the current position.
    pub fn location(&self) -> TextLocation {
        self.source.location(self.position())
    }

    /// Decodes the input from `start` to the current position as UTF-8.
    ///
    /// # Errors
    /// Returns an error if the bytes are not valid UTF-8.
    pub fn string_from(&self, start: usize) -> Result<String, ParsingError> {
        match std::str::from_utf8(self.slice_from(start)) {
            Ok(s) => Ok(s.to_string()),
            Err(_) => Err(ParsingError::malformed_markup(self, "invalid UTF-8".to_string())),
        }
    }

    /// Returns a string from up to `k` bytes from the current position for error context.
    ///
    /// Invalid UTF-8 sequences are replaced with the Unicode replacement character.
    pub fn get_context_as_string(&self, k: usize) -> String {
        String::from_utf8_lossy(self.source.peek_slice(k)).into_owned()
    }

    /// Parses an XML name (element, attribute, entity or PI target).
    ///
    /// The name may contain a prefix separator `:`; splitting is left to the
    /// caller.
    ///
    /// # Errors
    /// Returns an error if no name starts at the current position or at EOF.
    pub fn parse_name(&mut self) -> Result<String, ParsingError> {
        let start = self.position();
        if self.consume_until_any(NAME_DELIMITERS, ConsumeMode::Exclusive).is_none() {
            return Err(ParsingError::unexpected_eof(self));
        }
        if self.position() == start {
            return Err(ParsingError::malformed_markup(self, "expected a name".to_string()));
        }
        self.string_from(start)
    }
}

/// Returns whether `b` is one of the four XML whitespace bytes.
#[inline]
pub fn is_xml_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Specifies whether to consume or leave the target when using `consume_until` methods.
///
/// # Examples
/// ```
/// use doctree::parser::byte_parser::{ByteParser, ConsumeMode};
///
/// let mut parser = ByteParser::for_str("<?pi data?><root/>");
///
/// // Inclusive: consume up to and including "?>"
/// parser.consume_until_sequence(b"?>", ConsumeMode::Inclusive);
/// assert_eq!(parser.peek(), Some(b'<'));
///
/// // Exclusive: stop right at '/'
/// parser.consume_until(b'/', ConsumeMode::Exclusive);
/// assert_eq!(parser.peek(), Some(b'/'));
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConsumeMode {
    /// Consume the target byte/sequence along with everything before it.
    Inclusive,

    /// Stop before the target byte/sequence without consuming it.
    Exclusive,
}
