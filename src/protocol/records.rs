use super::{FieldKind, FieldReader, FieldWriter, Record, error::CodecError};

/// Credentials presented by a client. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    pub fn new(username: Option<&str>, password: Option<&str>) -> Self {
        Self {
            username: username.map(String::from),
            password: password.map(String::from),
        }
    }
}

impl Record for LoginRequest {
    const NAME: &'static str = "LoginRequest";
    const FIELDS: &'static [(&'static str, FieldKind)] =
        &[("username", FieldKind::Text), ("password", FieldKind::Text)];

    fn write_fields(&self, writer: &mut FieldWriter) -> Result<(), CodecError> {
        writer
            .text("username", self.username.as_deref())?
            .text("password", self.password.as_deref())?;
        Ok(())
    }

    fn read_fields(reader: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            username: reader.text("username")?,
            password: reader.text("password")?,
        })
    }
}

/// Status code with an optional human readable message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    pub code: i32,
    pub message: Option<String>,
}

impl StatusUpdate {
    pub fn new(code: i32, message: Option<&str>) -> Self {
        Self {
            code,
            message: message.map(String::from),
        }
    }
}

impl Record for StatusUpdate {
    const NAME: &'static str = "StatusUpdate";
    const FIELDS: &'static [(&'static str, FieldKind)] =
        &[("code", FieldKind::Integer), ("message", FieldKind::Text)];

    fn write_fields(&self, writer: &mut FieldWriter) -> Result<(), CodecError> {
        writer
            .integer(self.code)
            .text("message", self.message.as_deref())?;
        Ok(())
    }

    fn read_fields(reader: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            code: reader.integer("code")?,
            message: reader.text("message")?,
        })
    }
}

/// Identified chunk of payload text along with its declared size.
///
/// `size` is carried as given; it is not checked against the payload length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataPacket {
    pub id: i32,
    pub payload: Option<String>,
    pub size: i32,
}

impl DataPacket {
    pub fn new(id: i32, payload: Option<&str>, size: i32) -> Self {
        Self {
            id,
            payload: payload.map(String::from),
            size,
        }
    }
}

impl Record for DataPacket {
    const NAME: &'static str = "DataPacket";
    const FIELDS: &'static [(&'static str, FieldKind)] = &[
        ("id", FieldKind::Integer),
        ("payload", FieldKind::Text),
        ("size", FieldKind::Integer),
    ];

    fn write_fields(&self, writer: &mut FieldWriter) -> Result<(), CodecError> {
        writer
            .integer(self.id)
            .text("payload", self.payload.as_deref())?
            .integer(self.size);
        Ok(())
    }

    fn read_fields(reader: &mut FieldReader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            id: reader.integer("id")?,
            payload: reader.text("payload")?,
            size: reader.integer("size")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::protocol::DEFAULT_CAPACITY;

    use super::*;

    #[test]
    fn login_wire_format() {
        let login = LoginRequest::new(Some("alice"), Some("s3cret"));
        assert_eq!(login.encode().unwrap(), b"LoginRequest|alice|s3cret|");
    }

    #[test]
    fn status_wire_format() {
        let status = StatusUpdate::new(-1, Some("failed"));
        assert_eq!(status.encode().unwrap(), b"StatusUpdate|-1|failed|");
    }

    #[test]
    fn data_wire_format() {
        let packet = DataPacket::new(12, Some("hello"), 5);
        assert_eq!(packet.encode().unwrap(), b"DataPacket|12|hello|5|");
    }

    #[test]
    fn records_round_trip() {
        let login = LoginRequest::new(Some("bob"), Some("hunter2"));
        assert_eq!(LoginRequest::decode(&login.encode().unwrap()).unwrap(), login);

        let status = StatusUpdate::new(i32::MIN, Some("min"));
        assert_eq!(
            StatusUpdate::decode(&status.encode().unwrap()).unwrap(),
            status
        );

        let packet = DataPacket::new(i32::MAX, Some("payload with spaces"), 19);
        assert_eq!(
            DataPacket::decode(&packet.encode().unwrap()).unwrap(),
            packet
        );
    }

    #[test]
    fn absent_text_round_trips_to_empty() {
        let login = LoginRequest::new(None, None);
        let bytes = login.encode().unwrap();
        assert_eq!(bytes, b"LoginRequest|||");

        let decoded = LoginRequest::decode(&bytes).unwrap();
        assert_eq!(decoded, LoginRequest::new(Some(""), Some("")));
    }

    #[test]
    fn empty_span_keeps_field_positions() {
        let login = LoginRequest::new(None, Some("pw"));
        let bytes = login.encode().unwrap();
        assert_eq!(bytes, b"LoginRequest||pw|");

        let decoded = LoginRequest::decode(&bytes).unwrap();
        assert_eq!(decoded, LoginRequest::new(Some(""), Some("pw")));

        let packet = DataPacket::new(4, None, 9);
        assert_eq!(
            DataPacket::decode(&packet.encode().unwrap()).unwrap(),
            DataPacket::new(4, Some(""), 9)
        );
    }

    #[test]
    fn wrong_tag_is_rejected() {
        let input = b"WrongName|1|2|";

        assert!(matches!(
            LoginRequest::decode(input),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            StatusUpdate::decode(input),
            Err(CodecError::TypeMismatch { .. })
        ));
        assert!(matches!(
            DataPacket::decode(input),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn near_miss_tag_is_rejected() {
        assert_eq!(
            StatusUpdate::decode(b"StatusUpdat|5|ok|"),
            Err(CodecError::TypeMismatch {
                expected: "StatusUpdate".into(),
                found: "StatusUpdat".into()
            })
        );
        assert!(StatusUpdate::decode(b"StatusUpdates|5|ok|").is_err());
        assert!(DataPacket::decode(b"StatusUpdate|5|ok|").is_err());
    }

    #[test]
    fn truncated_trailing_fields() {
        assert_eq!(
            StatusUpdate::decode(b"StatusUpdate|5|").unwrap(),
            StatusUpdate::new(5, None)
        );
        assert_eq!(
            DataPacket::decode(b"DataPacket|9|").unwrap(),
            DataPacket::new(9, None, 0)
        );
        assert_eq!(
            LoginRequest::decode(b"LoginRequest").unwrap(),
            LoginRequest::new(None, None)
        );
    }

    #[test]
    fn garbage_integers_become_zero() {
        assert_eq!(
            DataPacket::decode(b"DataPacket|abc|x|5|").unwrap(),
            DataPacket::new(0, Some("x"), 5)
        );
        assert_eq!(
            StatusUpdate::decode(b"StatusUpdate|42abc|m|").unwrap(),
            StatusUpdate::new(42, Some("m"))
        );
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(LoginRequest::decode(b""), Err(CodecError::InvalidInput));
    }

    #[test]
    fn extra_fields_are_ignored() {
        assert_eq!(
            StatusUpdate::decode(b"StatusUpdate|1|a|b|c|").unwrap(),
            StatusUpdate::new(1, Some("a"))
        );
    }

    #[test]
    fn delimiter_in_text_is_rejected() {
        let login = LoginRequest::new(Some("a|b"), None);
        assert_eq!(
            login.encode(),
            Err(CodecError::DelimiterInField {
                field: "username".into()
            })
        );
    }

    #[test]
    fn oversized_record_is_rejected() {
        let payload = "x".repeat(DEFAULT_CAPACITY);
        let packet = DataPacket::new(1, Some(payload.as_str()), DEFAULT_CAPACITY as i32);

        match packet.encode() {
            Err(CodecError::CapacityExceeded { len, capacity }) => {
                assert_eq!(capacity, DEFAULT_CAPACITY);
                assert!(len > DEFAULT_CAPACITY);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unicode_text_round_trips() {
        let status = StatusUpdate::new(0, Some("héllo wörld ✓"));
        assert_eq!(
            StatusUpdate::decode(&status.encode().unwrap()).unwrap(),
            status
        );
    }
}
