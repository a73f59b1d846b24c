use std::io::{self, BufRead, BufReader, Read, Write};

use log::{debug, trace};
use thiserror::Error;

use super::{Codec, Message, error::CodecError};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
    #[error("encoded message contains a newline")]
    Newline,
    #[error("stream closed")]
    Closed,
    #[error("Transport IO Error: {0}")]
    Io(#[from] io::Error),
}

/// Moves messages over a stream, one encoded message per line.
pub struct MessageTransport<T: Read + Write> {
    stream: BufReader<T>,
    codec: Codec,
}

impl<T: Read + Write> MessageTransport<T> {
    pub fn new(stream: T) -> Self {
        Self::with_codec(stream, Codec::default())
    }

    pub fn with_codec(stream: T, codec: Codec) -> Self {
        Self {
            stream: BufReader::new(stream),
            codec,
        }
    }

    pub fn write_message(&mut self, message: &Message) -> Result<(), TransportError> {
        let mut bytes = self.codec.encode_message(message)?;
        if bytes.contains(&b'\n') {
            return Err(TransportError::Newline);
        }
        bytes.push(b'\n');

        let writer = self.stream.get_mut();
        writer.write_all(&bytes)?;
        writer.flush()?;

        trace!("sent {}", message.kind());
        Ok(())
    }

    pub fn read_message(&mut self) -> Result<Message, TransportError> {
        let mut line = Vec::new();
        if self.stream.read_until(b'\n', &mut line)? == 0 {
            debug!("stream closed by peer");
            return Err(TransportError::Closed);
        }

        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }

        let message = self.codec.decode_message(&line)?;
        trace!("received {}", message.kind());
        Ok(message)
    }

    pub fn into_inner(self) -> T {
        self.stream.into_inner()
    }
}
