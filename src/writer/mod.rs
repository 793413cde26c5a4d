//! Writing document trees as XML.
//!
//! [DocumentSerializer] walks a tree and pushes events into an
//! [XmlEventWriter]; [XmlStreamWriter] turns those events into XML text on
//! any [std::io::Write].

pub mod event_writer;
pub mod serializer;
pub mod xml_stream_writer;

pub use event_writer::XmlEventWriter;
pub use serializer::{DocumentSerializer, SerializationError};
pub use xml_stream_writer::XmlStreamWriter;
