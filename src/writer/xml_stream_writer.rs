//! Streaming XML writer over any [io::Write].

use crate::parser::xml_stream_reader::XML_NAMESPACE;
use crate::writer::event_writer::XmlEventWriter;
use std::borrow::Cow;
use std::io::{self, Write};

const XML_DECLARATION: &[u8] = b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>";

/// An element whose end tag has not been written yet.
#[derive(Debug)]
struct OpenTag {
    local_name: String,
    /// Size of the scope stack before this element's declarations
    scope_len: usize,
}

// =#========================================================================#=
// XML STREAM WRITER
// =#========================================================================#=
/// Writes markup events as XML text.
///
/// # Namespaces
/// Elements never carry a prefix: an element whose namespace differs from
/// the default namespace in scope redeclares it (`xmlns="..."`, or
/// `xmlns=""` for no namespace). Namespaced attributes use a prefix already
/// bound to their namespace or declare a fresh `nsN` on the current element.
///
/// # Example
/// ```
/// use doctree::writer::{XmlEventWriter, XmlStreamWriter};
///
/// let mut writer = XmlStreamWriter::new(Vec::new());
/// writer.write_start_element(Some("urn:a"), "a").unwrap();
/// writer.write_attribute(Some("urn:b"), "id", "1 < 2").unwrap();
/// writer.write_empty_element(None, "b").unwrap();
/// writer.write_end_element().unwrap();
///
/// let xml = String::from_utf8(writer.into_inner()).unwrap();
/// assert_eq!(xml, r#"<a xmlns="urn:a" xmlns:ns0="urn:b" ns0:id="1 &lt; 2"><b xmlns=""/></a>"#);
/// ```
pub struct XmlStreamWriter<W: Write> {
    out: W,
    xml_declaration: bool,
    open_elements: Vec<OpenTag>,
    /// Prefix bindings in scope, innermost last; `""` is the default namespace
    scopes: Vec<(String, Option<String>)>,
    /// A start tag is written but not closed; `Some(true)` for an empty element
    pending: Option<bool>,
    next_generated: usize,
}

impl<W: Write> XmlStreamWriter<W> {
    /// Creates a writer that omits the XML declaration.
    pub fn new(out: W) -> Self {
        XmlStreamWriter {
            out,
            xml_declaration: false,
            open_elements: Vec::new(),
            scopes: Vec::new(),
            pending: None,
            next_generated: 0,
        }
    }

    /// Whether [write_start_document](XmlEventWriter::write_start_document)
    /// emits `<?xml version="1.0" encoding="UTF-8"?>`.
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }

    /// Returns the underlying output.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn resolve(&self, prefix: &str) -> Option<&str> {
        self.scopes
            .iter()
            .rev()
            .find(|(p, _)| p == prefix)
            .and_then(|(_, namespace)| namespace.as_deref())
    }

    fn start(&mut self, namespace: Option<&str>, local_name: &str, empty: bool) -> io::Result<()> {
        self.close_pending()?;
        let scope_len = self.scopes.len();

        write!(self.out, "<{local_name}")?;
        if self.resolve("") != namespace {
            let uri = namespace.unwrap_or_default();
            write!(self.out, " xmlns=\"{}\"", escape_attribute(uri))?;
            self.scopes.push((String::new(), namespace.map(str::to_string)));
        }

        self.open_elements.push(OpenTag {
            local_name: local_name.to_string(),
            scope_len,
        });
        self.pending = Some(empty);
        Ok(())
    }

    /// Finishes a pending start tag; an empty element is closed with it.
    fn close_pending(&mut self) -> io::Result<()> {
        match self.pending.take() {
            None => Ok(()),
            Some(false) => self.out.write_all(b">"),
            Some(true) => {
                self.out.write_all(b"/>")?;
                self.pop_element();
                Ok(())
            }
        }
    }

    fn pop_element(&mut self) -> Option<OpenTag> {
        let tag = self.open_elements.pop()?;
        self.scopes.truncate(tag.scope_len);
        Some(tag)
    }

    /// Prefix bound to `namespace` in scope, declaring a new one if needed.
    fn attribute_prefix(&mut self, namespace: &str) -> io::Result<String> {
        if namespace == XML_NAMESPACE {
            return Ok("xml".to_string());
        }

        let bound = self
            .scopes
            .iter()
            .rev()
            .filter(|(p, n)| !p.is_empty() && n.as_deref() == Some(namespace))
            .map(|(p, _)| p)
            .find(|p| self.resolve(p) == Some(namespace));
        if let Some(prefix) = bound {
            return Ok(prefix.clone());
        }

        let prefix = loop {
            let candidate = format!("ns{}", self.next_generated);
            self.next_generated += 1;
            if self.resolve(&candidate).is_none() {
                break candidate;
            }
        };
        write!(self.out, " xmlns:{prefix}=\"{}\"", escape_attribute(namespace))?;
        self.scopes.push((prefix.clone(), Some(namespace.to_string())));
        Ok(prefix)
    }
}

impl<W: Write> XmlEventWriter for XmlStreamWriter<W> {
    fn write_start_document(&mut self) -> io::Result<()> {
        if self.xml_declaration {
            self.out.write_all(XML_DECLARATION)?;
        }
        Ok(())
    }

    fn write_end_document(&mut self) -> io::Result<()> {
        self.close_pending()?;
        while let Some(tag) = self.pop_element() {
            write!(self.out, "</{}>", tag.local_name)?;
        }
        self.out.flush()
    }

    fn write_start_element(&mut self, namespace: Option<&str>, local_name: &str) -> io::Result<()> {
        self.start(namespace, local_name, false)
    }

    fn write_empty_element(&mut self, namespace: Option<&str>, local_name: &str) -> io::Result<()> {
        self.start(namespace, local_name, true)
    }

    fn write_end_element(&mut self) -> io::Result<()> {
        self.close_pending()?;
        match self.pop_element() {
            Some(tag) => write!(self.out, "</{}>", tag.local_name),
            None => Err(io::Error::new(io::ErrorKind::InvalidInput, "no open element to end")),
        }
    }

    fn write_attribute(&mut self, namespace: Option<&str>, local_name: &str, value: &str) -> io::Result<()> {
        if self.pending.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("attribute {local_name} written outside a start tag"),
            ));
        }
        match namespace {
            Some(namespace) => {
                let prefix = self.attribute_prefix(namespace)?;
                write!(self.out, " {prefix}:{local_name}=\"{}\"", escape_attribute(value))
            }
            None => write!(self.out, " {local_name}=\"{}\"", escape_attribute(value)),
        }
    }

    fn write_characters(&mut self, text: &str) -> io::Result<()> {
        self.close_pending()?;
        self.out.write_all(escape_text(text).as_bytes())
    }

    fn write_cdata(&mut self, data: &str) -> io::Result<()> {
        self.close_pending()?;
        // A literal "]]>" ends one section and starts the next
        write!(self.out, "<![CDATA[{}]]>", data.replace("]]>", "]]]]><![CDATA[>"))
    }

    fn write_comment(&mut self, data: &str) -> io::Result<()> {
        // Unlike CDATA there is no way to split these
        if data.contains("--") || data.ends_with('-') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("comment {data:?} cannot be written: contains \"--\" or ends with '-'"),
            ));
        }
        self.close_pending()?;
        write!(self.out, "<!--{data}-->")
    }

    fn write_entity_ref(&mut self, name: &str) -> io::Result<()> {
        self.close_pending()?;
        write!(self.out, "&{name};")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

// =#========================================================================#=
// ESCAPING
// =#========================================================================#=

/// Escapes character data; borrows if nothing needs escaping.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '\r' => Some("&#13;"),
        _ => None,
    })
}

/// Escapes a double-quoted attribute value, including the whitespace that
/// attribute value normalization would otherwise turn into spaces.
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
    escape(value, |c| match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '"' => Some("&quot;"),
        '\t' => Some("&#9;"),
        '\n' => Some("&#10;"),
        '\r' => Some("&#13;"),
        _ => None,
    })
}

fn escape<F>(input: &str, replacement: F) -> Cow<'_, str>
where
    F: Fn(char) -> Option<&'static str>,
{
    if !input.chars().any(|c| replacement(c).is_some()) {
        return Cow::Borrowed(input);
    }
    let mut escaped = String::with_capacity(input.len() + 16);
    for c in input.chars() {
        match replacement(c) {
            Some(entity) => escaped.push_str(entity),
            None => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}
