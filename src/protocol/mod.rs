//! Pipe-delimited message protocol.
//!
//! This module defines the wire protocol spoken by `pipemsg`: a handful of flat
//! record types, each converted to and from a single line of delimited text.
//!
//! # Overview
//!
//! Every record kind implements [`Record`], which ties a type name to an ordered list
//! of fields. Encoding walks the fields in declaration order through a [`FieldWriter`];
//! decoding scans the input with a [`FieldReader`] without ever mutating it.
//!
//! # Key Components
//!
//! - [`Record`]: Trait implemented by every message kind.
//! - [`Message`]: Tagged union over the built-in records, dispatching on the type tag.
//! - [`Codec`]: Encoder/decoder bound to a [`CodecConfig`].
//! - [`MessageTransport`]: Line-oriented reader/writer over any stream.
//!
//! # Wire Format
//!
//! ```text
//! <TypeName>|<field 1>|<field 2>|...|<field n>|
//! ```
//!
//! - Each span, the tag included, is terminated by `|`. There is no escaping.
//! - Text fields are written verbatim; an absent text field is an empty span.
//! - Integers are written as base-10 signed decimals.
//! - No length prefix, checksum or version byte.
//!
//! Decoding is strict about the leading tag and lenient about the tail: missing trailing
//! fields decode as absent text or zero.
//!
//! # Example
//! ```rust
//! use pipemsg::protocol::{Record, StatusUpdate};
//!
//! let status = StatusUpdate::new(5, Some("ready"));
//! let bytes = status.encode().unwrap();
//! assert_eq!(bytes, b"StatusUpdate|5|ready|");
//!
//! let truncated = StatusUpdate::decode(b"StatusUpdate|5|").unwrap();
//! assert_eq!(truncated, StatusUpdate::new(5, None));
//! ```
//!
//! # See Also
//!
//! - [`schema`](crate::schema): Describes message layouts in a text file and decodes them
//!   dynamically with the same field rules.
mod config;
mod field;
mod message;
mod records;
mod transport;

use log::trace;

pub use config::{Codec, CodecConfig, IntegerPolicy};
pub use field::{FieldKind, FieldReader, FieldWriter};
pub(crate) use field::peek_tag;
pub use message::Message;
pub use records::{DataPacket, LoginRequest, StatusUpdate};
pub use transport::{MessageTransport, TransportError};

use error::CodecError;

/// Separator terminating every span on the wire.
pub const DELIMITER: u8 = b'|';

/// Default upper bound on the length of an encoded record.
pub const DEFAULT_CAPACITY: usize = 4096;

pub mod error {
    use thiserror::Error;

    /// Failures raised while encoding or decoding a record.
    #[derive(Debug, Error, Clone, PartialEq, Eq)]
    pub enum CodecError {
        #[error("no input provided")]
        InvalidInput,

        #[error("type mismatch: expected '{expected}', found '{found}'")]
        TypeMismatch { expected: String, found: String },

        #[error("encoded record is {len} bytes, capacity is {capacity}")]
        CapacityExceeded { len: usize, capacity: usize },

        #[error("field '{field}' contains the '|' delimiter")]
        DelimiterInField { field: String },

        #[error("field '{field}' is not valid UTF-8")]
        InvalidText { field: String },

        #[error("field '{field}' is not a valid integer: '{value}'")]
        InvalidInteger { field: String, value: String },

        #[error("field '{field}' does not match the message layout")]
        LayoutMismatch { field: String },

        #[error("unknown message type '{0}'")]
        UnknownType(String),
    }
}

/// A flat record with a fixed type tag and an ordered list of fields.
///
/// Implementations only describe how fields map onto the writer and reader; framing,
/// the tag check and the capacity limit are handled by [`Codec`].
pub trait Record: Sized {
    /// Type tag leading every encoded record.
    const NAME: &'static str;

    /// Field names and kinds, in wire order.
    const FIELDS: &'static [(&'static str, FieldKind)];

    fn write_fields(&self, writer: &mut FieldWriter) -> Result<(), CodecError>;

    fn read_fields(reader: &mut FieldReader<'_>) -> Result<Self, CodecError>;

    /// Encodes with [`CodecConfig::standard`].
    fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Codec::default().encode(self)
    }

    /// Decodes with [`CodecConfig::standard`].
    fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Codec::default().decode(bytes)
    }
}

/// Encodes a record that may be absent.
///
/// # Errors
///
/// Returns [`CodecError::InvalidInput`] when `record` is `None`, otherwise any
/// error raised by [`Record::encode`].
pub fn encode<R: Record>(record: Option<&R>) -> Result<Vec<u8>, CodecError> {
    record.ok_or(CodecError::InvalidInput)?.encode()
}

/// Decodes a buffer that may be absent.
///
/// # Errors
///
/// Returns [`CodecError::InvalidInput`] when `bytes` is `None` or empty.
pub fn decode<R: Record>(bytes: Option<&[u8]>) -> Result<R, CodecError> {
    R::decode(bytes.ok_or(CodecError::InvalidInput)?)
}

/// Releases a decoded record along with its owned text.
///
/// Passing `None` does nothing. The record is taken by value, so releasing the
/// same record twice does not compile:
///
/// ```compile_fail
/// use pipemsg::protocol::{StatusUpdate, release};
///
/// let status = StatusUpdate::new(1, Some("done"));
/// release(Some(status));
/// release(Some(status));
/// ```
pub fn release<R: Record>(record: Option<R>) {
    if let Some(record) = record {
        trace!("releasing {}", R::NAME);
        drop(record);
    }
}
