use super::{Codec, DataPacket, LoginRequest, Record, StatusUpdate, error::CodecError};

/// Any one of the built-in records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Login(LoginRequest),
    Status(StatusUpdate),
    Data(DataPacket),
}

impl Message {
    /// Type tag of the wrapped record.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Login(_) => LoginRequest::NAME,
            Message::Status(_) => StatusUpdate::NAME,
            Message::Data(_) => DataPacket::NAME,
        }
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        Codec::default().encode_message(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        Codec::default().decode_message(bytes)
    }
}

impl From<LoginRequest> for Message {
    fn from(value: LoginRequest) -> Self {
        Message::Login(value)
    }
}

impl From<StatusUpdate> for Message {
    fn from(value: StatusUpdate) -> Self {
        Message::Status(value)
    }
}

impl From<DataPacket> for Message {
    fn from(value: DataPacket) -> Self {
        Message::Data(value)
    }
}
