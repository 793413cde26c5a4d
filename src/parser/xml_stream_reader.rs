//! Namespace-aware pull reader for XML.
//!
//! [XmlStreamReader] scans an in-memory document with a [ByteParser] and
//! reports one [XmlEventKind] per call to
//! [next_event](XmlEventReader::next_event). It checks well-formedness only
//! as far as building a tree needs it: tags must nest, prefixes must be
//! declared, and markup must be terminated. DTD internal subsets are
//! skipped, not interpreted.

use crate::parser::byte_parser::{is_xml_whitespace, ByteParser, ConsumeMode};
use crate::parser::byte_source::{ByteSource, DocumentSource};
use crate::parser::event_reader::{XmlEventKind, XmlEventReader};
use crate::parser::parsing_error::ParsingError;
use std::path::Path;
use tracing::trace;

/// The namespace bound to the `xml` prefix in every document.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Splits a qualified name into prefix and local name.
///
/// ```
/// use doctree::parser::xml_stream_reader::split_qname;
///
/// assert_eq!(split_qname("svg:rect"), (Some("svg"), "rect"));
/// assert_eq!(split_qname("div"), (None, "div"));
/// ```
pub fn split_qname(qname: &str) -> (Option<&str>, &str) {
    match qname.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, qname),
    }
}

// =#========================================================================#=
// NAMESPACE SCOPES
// =#========================================================================#=
/// Prefix bindings of all open elements, innermost last.
///
/// The empty prefix stands for the default namespace; binding it to `None`
/// undeclares it (`xmlns=""`).
#[derive(Debug, Default)]
struct NamespaceScopes {
    bindings: Vec<(String, Option<String>)>,
}

impl NamespaceScopes {
    fn len(&self) -> usize {
        self.bindings.len()
    }

    fn bind(&mut self, prefix: &str, namespace: &str) {
        let namespace = (!namespace.is_empty()).then(|| namespace.to_string());
        self.bindings.push((prefix.to_string(), namespace));
    }

    /// Drops all bindings made after the scope had `len` entries.
    fn truncate(&mut self, len: usize) {
        self.bindings.truncate(len);
    }

    /// # Returns
    /// `Ok(None)` for no namespace, `Err(())` if a non-empty prefix is unbound
    fn resolve(&self, prefix: Option<&str>) -> Result<Option<&str>, ()> {
        let prefix = prefix.unwrap_or("");
        if prefix == "xml" {
            return Ok(Some(XML_NAMESPACE));
        }
        match self.bindings.iter().rev().find(|(p, _)| p == prefix) {
            Some((_, namespace)) => Ok(namespace.as_deref()),
            None if prefix.is_empty() => Ok(None),
            None => Err(()),
        }
    }
}

/// An attribute of the current start element, namespace already resolved.
#[derive(Debug)]
struct ReaderAttribute {
    namespace: Option<String>,
    local_name: String,
    value: String,
}

/// An element whose end tag has not been read yet.
#[derive(Debug)]
struct OpenElement {
    qualified_name: String,
    namespace: Option<String>,
    local_name: String,
    /// Size of the scope stack before this element's declarations
    scope_len: usize,
}

#[derive(Debug, Copy, Clone, PartialEq)]
enum ReaderState {
    Prolog,
    Content,
    Finished,
}

/// Result of reading `&...;`.
enum Reference {
    Char(char),
    Entity(String),
}

// =#========================================================================#=
// XML STREAM READER
// =#========================================================================#=
/// Pull reader over an in-memory XML document.
///
/// # Example
/// ```
/// use doctree::parser::{XmlEventKind, XmlEventReader, XmlStreamReader};
///
/// let mut reader = XmlStreamReader::for_str("<a xmlns='urn:x'>hi</a>");
/// assert_eq!(reader.next_event().unwrap(), XmlEventKind::StartDocument);
/// assert_eq!(reader.next_event().unwrap(), XmlEventKind::StartElement);
/// assert_eq!(reader.namespace(), Some("urn:x"));
/// assert_eq!(reader.next_event().unwrap(), XmlEventKind::Characters);
/// assert_eq!(reader.text(), "hi");
/// ```
pub struct XmlStreamReader<S: ByteSource> {
    parser: ByteParser<S>,
    state: ReaderState,
    scopes: NamespaceScopes,
    open_elements: Vec<OpenElement>,
    /// Set after `<x/>`: the next event is the synthesised end element
    pending_end: bool,
    local_name: String,
    namespace: Option<String>,
    attributes: Vec<ReaderAttribute>,
    text: String,
    offset: usize,
}

impl XmlStreamReader<DocumentSource> {
    /// Creates a reader over a copy of `input`.
    pub fn for_str(input: &str) -> Self {
        Self::new(ByteParser::for_str(input))
    }

    /// Creates a reader over a copy of `input`.
    pub fn for_bytes(input: &[u8]) -> Self {
        Self::new(ByteParser::for_bytes(input))
    }

    /// Loads the file at `path` into memory and creates a reader over it.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read.
    pub fn for_file<P: AsRef<Path>>(path: P) -> Result<Self, ParsingError> {
        let source = DocumentSource::from_file(path)?;
        Ok(Self::new(ByteParser::new(source)))
    }
}

impl<S: ByteSource> XmlStreamReader<S> {
    /// Creates a reader positioned before the start of the document.
    pub fn new(parser: ByteParser<S>) -> Self {
        Self {
            parser,
            state: ReaderState::Prolog,
            scopes: NamespaceScopes::default(),
            open_elements: Vec::new(),
            pending_end: false,
            local_name: String::new(),
            namespace: None,
            attributes: Vec::new(),
            text: String::new(),
            offset: 0,
        }
    }

    /// Number of elements opened and not yet closed.
    pub fn depth(&self) -> usize {
        self.open_elements.len()
    }

    // =#========================================================================#=
    // PROLOG
    // =#========================================================================#=

    /// Consumes a byte order mark and the XML declaration, if present.
    fn read_prolog(&mut self) -> Result<(), ParsingError> {
        self.parser.consume_if_sequence(UTF8_BOM);

        let start = self.parser.position();
        if self.parser.consume_if_sequence(b"<?xml") {
            if self.parser.peek().is_some_and(is_xml_whitespace) {
                if !self.parser.consume_until_sequence(b"?>", ConsumeMode::Inclusive) {
                    return Err(ParsingError::unexpected_eof(&self.parser));
                }
            } else {
                // `<?xml-stylesheet ...?>` and friends are ordinary PIs
                self.parser.set_position(start);
            }
        }
        Ok(())
    }

    // =#========================================================================#=
    // MARKUP
    // =#========================================================================#=

    fn read_markup(&mut self) -> Result<XmlEventKind, ParsingError> {
        if self.parser.consume_if_sequence(b"<!--") {
            return self.read_delimited(b"-->", XmlEventKind::Comment);
        }
        if self.parser.consume_if_sequence(b"<![CDATA[") {
            if self.depth() == 0 {
                return Err(ParsingError::malformed_markup(
                    &self.parser,
                    "CDATA section outside the root element".to_string(),
                ));
            }
            return self.read_delimited(b"]]>", XmlEventKind::CData);
        }
        if self.parser.consume_if_sequence(b"<!DOCTYPE") {
            return self.read_doctype();
        }
        if self.parser.peek_is_sequence(b"<!") {
            return Err(ParsingError::malformed_markup(
                &self.parser,
                "unknown markup declaration".to_string(),
            ));
        }
        if self.parser.consume_if_sequence(b"<?") {
            return self.read_processing_instruction();
        }
        if self.parser.consume_if_sequence(b"</") {
            return self.read_end_tag();
        }
        self.parser.next_byte();
        self.read_start_tag()
    }

    /// Reads text up to `terminator` and consumes the terminator.
    fn read_delimited(&mut self, terminator: &[u8], kind: XmlEventKind) -> Result<XmlEventKind, ParsingError> {
        let start = self.parser.position();
        if !self.parser.consume_until_sequence(terminator, ConsumeMode::Exclusive) {
            return Err(ParsingError::unexpected_eof(&self.parser));
        }
        self.text = normalize_line_endings(self.parser.string_from(start)?);
        self.parser.consume_if_sequence(terminator);
        Ok(kind)
    }

    fn read_doctype(&mut self) -> Result<XmlEventKind, ParsingError> {
        match self.parser.consume_until_any(b"[>", ConsumeMode::Inclusive) {
            None => return Err(ParsingError::unexpected_eof(&self.parser)),
            Some(b'[') => {
                if !self.parser.consume_until_sequence(b"]", ConsumeMode::Inclusive)
                    || !self.parser.consume_until(b'>', ConsumeMode::Inclusive)
                {
                    return Err(ParsingError::unexpected_eof(&self.parser));
                }
            }
            Some(_) => {}
        }
        Ok(XmlEventKind::Dtd)
    }

    fn read_processing_instruction(&mut self) -> Result<XmlEventKind, ParsingError> {
        self.local_name = self.parser.parse_name()?;
        self.parser.skip_whitespace();
        self.read_delimited(b"?>", XmlEventKind::ProcessingInstruction)
    }

    fn read_start_tag(&mut self) -> Result<XmlEventKind, ParsingError> {
        let qualified_name = self.parser.parse_name()?;
        let mut raw_attributes: Vec<(String, String)> = Vec::new();

        let self_closing = loop {
            let separated = self.parser.skip_whitespace();
            match self.parser.peek() {
                None => return Err(ParsingError::unexpected_eof(&self.parser)),
                Some(b'>') => {
                    self.parser.next_byte();
                    break false;
                }
                Some(b'/') => {
                    self.parser.next_byte();
                    if !self.parser.consume_if(b'>') {
                        return Err(ParsingError::malformed_markup(
                            &self.parser,
                            "expected '>' after '/'".to_string(),
                        ));
                    }
                    break true;
                }
                Some(_) if !separated => {
                    return Err(ParsingError::malformed_markup(
                        &self.parser,
                        "attributes must be separated by whitespace".to_string(),
                    ));
                }
                Some(_) => {
                    let name = self.parser.parse_name()?;
                    self.parser.skip_whitespace();
                    if !self.parser.consume_if(b'=') {
                        return Err(ParsingError::malformed_markup(
                            &self.parser,
                            format!("expected '=' after attribute {name}"),
                        ));
                    }
                    self.parser.skip_whitespace();
                    let value = self.read_attribute_value()?;
                    raw_attributes.push((name, value));
                }
            }
        };

        // Declarations first, since they apply to the element's own name
        let scope_len = self.scopes.len();
        for (name, value) in &raw_attributes {
            if name == "xmlns" {
                self.scopes.bind("", value);
            } else if let Some(prefix) = name.strip_prefix("xmlns:") {
                self.scopes.bind(prefix, value);
            }
        }

        let (prefix, local_name) = split_qname(&qualified_name);
        let namespace = self.resolve(prefix)?;
        self.local_name = local_name.to_string();
        self.namespace = namespace.clone();

        for (name, value) in raw_attributes {
            if name == "xmlns" || name.starts_with("xmlns:") {
                continue;
            }
            let (prefix, local_name) = split_qname(&name);
            // Unprefixed attributes are in no namespace
            let namespace = match prefix {
                Some(_) => self.resolve(prefix)?,
                None => None,
            };
            self.attributes.push(ReaderAttribute {
                namespace,
                local_name: local_name.to_string(),
                value,
            });
        }

        self.open_elements.push(OpenElement {
            local_name: self.local_name.clone(),
            namespace,
            qualified_name,
            scope_len,
        });
        self.pending_end = self_closing;
        Ok(XmlEventKind::StartElement)
    }

    fn read_end_tag(&mut self) -> Result<XmlEventKind, ParsingError> {
        let qualified_name = self.parser.parse_name()?;
        self.parser.skip_whitespace();
        if !self.parser.consume_if(b'>') {
            return Err(ParsingError::malformed_markup(
                &self.parser,
                format!("expected '>' to close </{qualified_name}"),
            ));
        }

        let expected = match self.open_elements.last() {
            Some(open) => &open.qualified_name,
            None => {
                return Err(ParsingError::malformed_markup(
                    &self.parser,
                    format!("end tag </{qualified_name}> without start tag"),
                ));
            }
        };
        if *expected != qualified_name {
            return Err(ParsingError::mismatched_end_tag(
                &self.parser,
                expected.clone(),
                qualified_name,
            ));
        }
        self.close_element();
        Ok(XmlEventKind::EndElement)
    }

    /// Pops the innermost open element and makes it the current event's name.
    fn close_element(&mut self) {
        if let Some(open) = self.open_elements.pop() {
            self.scopes.truncate(open.scope_len);
            self.local_name = open.local_name;
            self.namespace = open.namespace;
        }
    }

    fn resolve(&self, prefix: Option<&str>) -> Result<Option<String>, ParsingError> {
        match self.scopes.resolve(prefix) {
            Ok(namespace) => Ok(namespace.map(str::to_string)),
            Err(()) => Err(ParsingError::undeclared_prefix(
                &self.parser,
                prefix.unwrap_or_default().to_string(),
            )),
        }
    }

    // =#========================================================================#=
    // CHARACTER DATA
    // =#========================================================================#=

    fn read_attribute_value(&mut self) -> Result<String, ParsingError> {
        let quote = match self.parser.next_byte() {
            Some(q @ (b'"' | b'\'')) => q,
            Some(_) => {
                return Err(ParsingError::malformed_markup(
                    &self.parser,
                    "attribute value must be quoted".to_string(),
                ));
            }
            None => return Err(ParsingError::unexpected_eof(&self.parser)),
        };

        let mut value = String::new();
        loop {
            let start = self.parser.position();
            let stop = self
                .parser
                .consume_until_any(&[quote, b'&', b'<'], ConsumeMode::Exclusive);
            // Literal whitespace is normalized, character references are not
            value.push_str(&normalize_attribute_value(&self.parser.string_from(start)?));
            match stop {
                None => return Err(ParsingError::unexpected_eof(&self.parser)),
                Some(b'<') => {
                    return Err(ParsingError::malformed_markup(
                        &self.parser,
                        "'<' in attribute value".to_string(),
                    ));
                }
                Some(b'&') => match self.read_reference()? {
                    Reference::Char(c) => value.push(c),
                    Reference::Entity(name) => {
                        return Err(ParsingError::malformed_markup(
                            &self.parser,
                            format!("undeclared entity &{name}; in attribute value"),
                        ));
                    }
                },
                Some(_) => {
                    self.parser.next_byte();
                    break;
                }
            }
        }
        Ok(value)
    }

    /// Reads a character run, decoding predefined entities and character
    /// references. Stops before markup and before any other entity reference.
    fn read_characters(&mut self) -> Result<XmlEventKind, ParsingError> {
        let mut text = String::new();
        loop {
            let start = self.parser.position();
            let stop = self.parser.consume_until_any(b"<&", ConsumeMode::Exclusive);
            text.push_str(&normalize_line_endings(self.parser.string_from(start)?));
            if stop != Some(b'&') {
                break;
            }

            let before = self.parser.position();
            match self.read_reference()? {
                Reference::Char(c) => text.push(c),
                Reference::Entity(name) if text.is_empty() => {
                    self.local_name = name;
                    return Ok(XmlEventKind::EntityReference);
                }
                Reference::Entity(_) => {
                    // Report the text first, the reference with the next event
                    self.parser.set_position(before);
                    break;
                }
            }
        }

        self.text = text;
        if self.text.bytes().all(is_xml_whitespace) {
            Ok(XmlEventKind::Whitespace)
        } else {
            Ok(XmlEventKind::Characters)
        }
    }

    /// Reads `&name;` or `&#...;`, starting at the `&`.
    fn read_reference(&mut self) -> Result<Reference, ParsingError> {
        self.parser.next_byte();

        if self.parser.consume_if(b'#') {
            let hex = self.parser.consume_if(b'x');
            let start = self.parser.position();
            if !self.parser.consume_until(b';', ConsumeMode::Exclusive) {
                return Err(ParsingError::unexpected_eof(&self.parser));
            }
            let digits = self.parser.string_from(start)?;
            self.parser.next_byte();
            let code = if hex {
                u32::from_str_radix(&digits, 16)
            } else {
                digits.parse::<u32>()
            };
            return match code.ok().and_then(char::from_u32) {
                Some(c) => Ok(Reference::Char(c)),
                None => Err(ParsingError::malformed_markup(
                    &self.parser,
                    format!("invalid character reference &#{}{digits};", if hex { "x" } else { "" }),
                )),
            };
        }

        let name = self.parser.parse_name()?;
        if !self.parser.consume_if(b';') {
            return Err(ParsingError::malformed_markup(
                &self.parser,
                format!("entity reference &{name} is not terminated by ';'"),
            ));
        }
        Ok(match name.as_str() {
            "lt" => Reference::Char('<'),
            "gt" => Reference::Char('>'),
            "amp" => Reference::Char('&'),
            "quot" => Reference::Char('"'),
            "apos" => Reference::Char('\''),
            _ => Reference::Entity(name),
        })
    }

    fn read_content(&mut self) -> Result<XmlEventKind, ParsingError> {
        // Whitespace between top-level constructs carries no content
        if self.depth() == 0 {
            self.parser.skip_whitespace();
        }

        match self.parser.peek() {
            None => {
                if let Some(open) = self.open_elements.last() {
                    trace!("EOF with <{}> still open", open.qualified_name);
                    return Err(ParsingError::unexpected_eof(&self.parser));
                }
                self.state = ReaderState::Finished;
                Ok(XmlEventKind::EndDocument)
            }
            Some(b'<') => self.read_markup(),
            Some(_) if self.depth() == 0 => Err(ParsingError::malformed_markup(
                &self.parser,
                "character data outside the root element".to_string(),
            )),
            Some(_) => self.read_characters(),
        }
    }
}

impl<S: ByteSource> XmlEventReader for XmlStreamReader<S> {
    fn next_event(&mut self) -> Result<XmlEventKind, ParsingError> {
        self.attributes.clear();
        self.text.clear();

        if self.pending_end {
            // `<x/>`: no bytes are consumed, so the offset stays put
            self.pending_end = false;
            self.close_element();
            return Ok(XmlEventKind::EndElement);
        }

        let kind = match self.state {
            ReaderState::Prolog => {
                self.read_prolog()?;
                self.state = ReaderState::Content;
                XmlEventKind::StartDocument
            }
            ReaderState::Content => self.read_content()?,
            ReaderState::Finished => XmlEventKind::EndDocument,
        };
        self.offset = self.parser.position();
        Ok(kind)
    }

    fn local_name(&self) -> &str {
        &self.local_name
    }

    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    fn attribute_local_name(&self, index: usize) -> &str {
        &self.attributes[index].local_name
    }

    fn attribute_namespace(&self, index: usize) -> Option<&str> {
        self.attributes[index].namespace.as_deref()
    }

    fn attribute_value(&self, index: usize) -> &str {
        &self.attributes[index].value
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn offset(&self) -> usize {
        self.offset
    }
}

/// Normalizes `\r\n` and lone `\r` to `\n`.
fn normalize_line_endings(text: String) -> String {
    if !text.contains('\r') {
        return text;
    }
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Normalizes line endings, then maps tab and newline to a space.
fn normalize_attribute_value(value: &str) -> String {
    normalize_line_endings(value.to_string()).replace(['\t', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_value_normalization() {
        assert_eq!(normalize_attribute_value("a\r\nb\tc"), "a b c");
    }

    #[test]
    fn test_scopes_resolve_default_and_reset() {
        let mut scopes = NamespaceScopes::default();
        assert_eq!(scopes.resolve(None), Ok(None));
        scopes.bind("", "urn:a");
        assert_eq!(scopes.resolve(None), Ok(Some("urn:a")));
        scopes.bind("", "");
        assert_eq!(scopes.resolve(None), Ok(None));
        scopes.truncate(1);
        assert_eq!(scopes.resolve(None), Ok(Some("urn:a")));
    }

    #[test]
    fn test_scopes_unbound_prefix() {
        let scopes = NamespaceScopes::default();
        assert_eq!(scopes.resolve(Some("p")), Err(()));
        assert_eq!(scopes.resolve(Some("xml")), Ok(Some(XML_NAMESPACE)));
    }
}
