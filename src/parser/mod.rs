//! Reading XML documents as a stream of events.
//!
//! This module provides the pull-event contract [XmlEventReader] consumed by
//! the [DocumentBuilder](crate::builder::DocumentBuilder), a concrete
//! [XmlStreamReader] built on low-level byte scanning ([ByteParser]), and
//! the [ParsingError] type shared by reading and tree building.

pub mod byte_parser;
pub mod byte_source;
pub mod event_reader;
pub mod parsing_error;
pub mod xml_stream_reader;

pub use byte_parser::ByteParser;
pub use byte_source::TextLocation;
pub use event_reader::{XmlEventKind, XmlEventReader};
pub use parsing_error::{ParsingError, ParsingErrorType};
pub use xml_stream_reader::XmlStreamReader;
