//! Push-event contract between the
//! [DocumentSerializer](crate::writer::DocumentSerializer) and a markup writer.

use std::io;

/// Sink of markup events.
///
/// Start tags are closed lazily, so attributes may be written right after
/// [write_start_element](XmlEventWriter::write_start_element) or
/// [write_empty_element](XmlEventWriter::write_empty_element). Every
/// method reports failures of the underlying output.
pub trait XmlEventWriter {
    fn write_start_document(&mut self) -> io::Result<()>;

    /// Closes all open elements and flushes.
    fn write_end_document(&mut self) -> io::Result<()>;

    fn write_start_element(&mut self, namespace: Option<&str>, local_name: &str) -> io::Result<()>;

    /// Starts an element that is written as `<x/>`; it takes attributes but
    /// no content and has no matching end event.
    fn write_empty_element(&mut self, namespace: Option<&str>, local_name: &str) -> io::Result<()>;

    fn write_end_element(&mut self) -> io::Result<()>;

    fn write_attribute(&mut self, namespace: Option<&str>, local_name: &str, value: &str) -> io::Result<()>;

    fn write_characters(&mut self, text: &str) -> io::Result<()>;

    fn write_cdata(&mut self, data: &str) -> io::Result<()>;

    fn write_comment(&mut self, data: &str) -> io::Result<()>;

    fn write_entity_ref(&mut self, name: &str) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}
