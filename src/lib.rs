pub mod cli;
pub mod protocol;
pub mod schema;

pub use cli::{Command, prompt};
pub use protocol::{Codec, CodecConfig, DataPacket, LoginRequest, Message, Record, StatusUpdate};
pub use schema::Schema;
