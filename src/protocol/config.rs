use log::trace;

use super::{
    DEFAULT_CAPACITY, DataPacket, FieldReader, FieldWriter, LoginRequest, Message, Record,
    StatusUpdate, error::CodecError, field::peek_tag,
};

/// How integer fields that are not well-formed decimals are treated on decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntegerPolicy {
    /// `atoi` semantics: leading digits are used, garbage becomes `0`.
    #[default]
    Permissive,
    /// The whole span must parse as an `i32`.
    Strict,
}

/// Codec settings, built up from [`CodecConfig::standard`].
///
/// ```rust
/// use pipemsg::protocol::{CodecConfig, IntegerPolicy};
///
/// let config = CodecConfig::standard()
///     .with_capacity(512)
///     .with_strict_integers();
/// assert_eq!(config.capacity(), 512);
/// assert_eq!(config.integers(), IntegerPolicy::Strict);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    capacity: usize,
    integers: IntegerPolicy,
}

impl CodecConfig {
    /// 4096 byte capacity with permissive integer parsing.
    pub const fn standard() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            integers: IntegerPolicy::Permissive,
        }
    }

    pub const fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub const fn with_strict_integers(mut self) -> Self {
        self.integers = IntegerPolicy::Strict;
        self
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn integers(&self) -> IntegerPolicy {
        self.integers
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Encoder/decoder for any [`Record`], bound to a [`CodecConfig`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Serializes `record` as `<NAME>|<field>|...|`.
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::CapacityExceeded`] when the output is longer than the
    /// configured capacity, and with [`CodecError::DelimiterInField`] when a text
    /// field contains `|`.
    pub fn encode<R: Record>(&self, record: &R) -> Result<Vec<u8>, CodecError> {
        let mut writer = FieldWriter::new(R::NAME, self.config.capacity);
        record.write_fields(&mut writer)?;
        let bytes = writer.finish()?;

        trace!("encoded {} ({} bytes)", R::NAME, bytes.len());
        Ok(bytes)
    }

    /// Parses a record of type `R`.
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::InvalidInput`] on empty input and with
    /// [`CodecError::TypeMismatch`] when the leading tag is not `R::NAME`.
    pub fn decode<R: Record>(&self, bytes: &[u8]) -> Result<R, CodecError> {
        let mut reader = FieldReader::open(bytes, R::NAME, self.config.integers)?;
        let record = R::read_fields(&mut reader)?;

        trace!("decoded {} ({} bytes)", R::NAME, bytes.len());
        Ok(record)
    }

    pub fn encode_message(&self, message: &Message) -> Result<Vec<u8>, CodecError> {
        match message {
            Message::Login(login) => self.encode(login),
            Message::Status(status) => self.encode(status),
            Message::Data(data) => self.encode(data),
        }
    }

    /// Parses whichever built-in record the leading tag names.
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::UnknownType`] when the tag names no built-in record.
    pub fn decode_message(&self, bytes: &[u8]) -> Result<Message, CodecError> {
        let tag = peek_tag(bytes)?;

        if tag == LoginRequest::NAME {
            self.decode(bytes).map(Message::Login)
        } else if tag == StatusUpdate::NAME {
            self.decode(bytes).map(Message::Status)
        } else if tag == DataPacket::NAME {
            self.decode(bytes).map(Message::Data)
        } else {
            Err(CodecError::UnknownType(tag.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_config() {
        let config = CodecConfig::default();
        assert_eq!(config.capacity(), DEFAULT_CAPACITY);
        assert_eq!(config.integers(), IntegerPolicy::Permissive);
    }

    #[test]
    fn smaller_capacity_rejects_record() {
        let codec = Codec::new(CodecConfig::standard().with_capacity(16));
        let packet = DataPacket::new(1, Some("0123456789"), 10);

        assert_eq!(
            codec.encode(&packet),
            Err(CodecError::CapacityExceeded {
                len: 27,
                capacity: 16
            })
        );
    }

    #[test]
    fn capacity_is_inclusive() {
        let login = LoginRequest::new(Some("ab"), None);
        let len = login.encode().unwrap().len();
        let codec = Codec::new(CodecConfig::standard().with_capacity(len));

        assert!(codec.encode(&login).is_ok());
    }

    #[test]
    fn strict_integers_reject_garbage() {
        let codec = Codec::new(CodecConfig::standard().with_strict_integers());

        assert_eq!(
            codec.decode::<DataPacket>(b"DataPacket|abc|x|5|"),
            Err(CodecError::InvalidInteger {
                field: "id".into(),
                value: "abc".into()
            })
        );
        assert_eq!(
            codec.decode::<DataPacket>(b"DataPacket|-4|x|5|").unwrap(),
            DataPacket::new(-4, Some("x"), 5)
        );
    }

    #[test]
    fn decode_message_dispatches_on_tag() {
        let codec = Codec::default();

        assert_eq!(
            codec.decode_message(b"StatusUpdate|200|ok|").unwrap(),
            Message::Status(StatusUpdate::new(200, Some("ok")))
        );
        assert_eq!(
            codec.decode_message(b"LoginRequest|root||").unwrap(),
            Message::Login(LoginRequest::new(Some("root"), Some("")))
        );
        assert_eq!(
            codec.decode_message(b"Heartbeat|1|"),
            Err(CodecError::UnknownType("Heartbeat".into()))
        );
        assert_eq!(codec.decode_message(b""), Err(CodecError::InvalidInput));
    }
}
