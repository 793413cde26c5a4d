//! The raw input of an [XmlStreamReader](crate::parser::XmlStreamReader).
//!
//! Offsets handed out by a [ByteSource] are byte offsets, which is what the
//! builder compares for self-closing detection. For people reading error
//! messages a source also maps an offset back to a [TextLocation].

use std::fmt;
use std::fs;
use std::path::Path;

// =#========================================================================#=
// TEXT LOCATION
// =#========================================================================#=
/// A 1-based line and column in the input text.
///
/// Columns count characters, not bytes. `\n`, `\r\n` and a lone `\r` each end
/// a line, matching the line-ending normalization of the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLocation {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

// =#========================================================================#=
// BYTE SOURCE (Trait)
// =#========================================================================#=
/// Byte-level access used by a [ByteParser](crate::parser::ByteParser).
///
/// The reader backtracks (for `<?xml-stylesheet` and unterminated entity
/// references) and slices names and text straight out of the input, so a
/// source must be seekable and keep everything it has handed out.
pub trait ByteSource {
    /// Current byte, or `None` at EOF.
    fn peek(&self) -> Option<u8>;

    /// Consumes and returns the current byte, or `None` at EOF.
    fn next_byte(&mut self) -> Option<u8>;

    /// Byte offset of the next unread byte.
    fn position(&self) -> usize;

    /// Moves the read position; offsets past the end behave as EOF.
    fn set_position(&mut self, pos: usize);

    /// Bytes between `start` and the current position. Empty if `start` lies
    /// ahead of the position.
    fn slice_from(&self, start: usize) -> &[u8];

    /// Up to `k` bytes from the current position, without consuming them.
    fn peek_slice(&self, k: usize) -> &[u8];

    /// Line and column of the byte at `pos`.
    fn location(&self, pos: usize) -> TextLocation;

    fn is_eof(&self) -> bool {
        self.peek().is_none()
    }
}

// =#========================================================================#=
// DOCUMENT SOURCE
// =#========================================================================#=
/// A whole document held in memory.
///
/// Documents are always compared as complete trees, so there is nothing to
/// gain from streaming the input in chunks.
pub struct DocumentSource {
    bytes: Vec<u8>,
    pos: usize,
}

impl DocumentSource {
    /// Takes ownership of the raw document bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Reads the file at `path` into memory.
    ///
    /// # Errors
    /// Returns the I/O error if the file cannot be opened or read.
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        fs::read(path).map(Self::new)
    }
}

impl ByteSource for DocumentSource {
    #[inline(always)]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline(always)]
    fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn slice_from(&self, start: usize) -> &[u8] {
        let end = self.pos.min(self.bytes.len());
        self.bytes.get(start..end).unwrap_or(&[])
    }

    #[inline(always)]
    fn peek_slice(&self, k: usize) -> &[u8] {
        let start = self.pos.min(self.bytes.len());
        let end = self.pos.saturating_add(k).min(self.bytes.len());
        &self.bytes[start..end]
    }

    fn location(&self, pos: usize) -> TextLocation {
        let before = &self.bytes[..pos.min(self.bytes.len())];
        let mut line = 1;
        let mut line_start = 0;
        for (i, &b) in before.iter().enumerate() {
            let ends_line = b == b'\n' || (b == b'\r' && before.get(i + 1) != Some(&b'\n'));
            if ends_line {
                line += 1;
                line_start = i + 1;
            }
        }
        // Continuation bytes of multi-byte characters do not start a column
        let column = before[line_start..].iter().filter(|&&b| b & 0xC0 != 0x80).count() + 1;
        TextLocation { line, column }
    }
}
