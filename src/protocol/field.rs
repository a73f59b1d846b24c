use std::{fmt, str};

use log::debug;

use super::{DELIMITER, IntegerPolicy, error::CodecError};

/// Kind of value a field carries on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Optional UTF-8 text, written verbatim.
    Text,
    /// 32-bit signed integer, written in base 10.
    Integer,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "string"),
            FieldKind::Integer => write!(f, "int"),
        }
    }
}

/// Growable output buffer for a single record.
///
/// The tag is written on construction; every field appended afterwards is
/// terminated with the delimiter. The capacity is only enforced by [`finish`],
/// so nothing is ever truncated.
///
/// [`finish`]: FieldWriter::finish
#[derive(Debug)]
pub struct FieldWriter {
    buf: Vec<u8>,
    capacity: usize,
}

impl FieldWriter {
    pub fn new(tag: &str, capacity: usize) -> Self {
        let mut writer = Self {
            buf: Vec::with_capacity(capacity.min(256)),
            capacity,
        };
        writer.push_span(tag.as_bytes());
        writer
    }

    fn push_span(&mut self, span: &[u8]) {
        self.buf.extend_from_slice(span);
        self.buf.push(DELIMITER);
    }

    /// Appends a text field. `None` is written as an empty span.
    pub fn text(&mut self, field: &str, value: Option<&str>) -> Result<&mut Self, CodecError> {
        let value = value.unwrap_or_default();
        if value.as_bytes().contains(&DELIMITER) {
            debug!("refusing to encode '{field}': value contains delimiter");
            return Err(CodecError::DelimiterInField {
                field: field.to_string(),
            });
        }

        self.push_span(value.as_bytes());
        Ok(self)
    }

    pub fn integer(&mut self, value: i32) -> &mut Self {
        self.push_span(value.to_string().as_bytes());
        self
    }

    pub fn finish(self) -> Result<Vec<u8>, CodecError> {
        if self.buf.len() > self.capacity {
            debug!(
                "encoded record exceeds capacity ({} > {})",
                self.buf.len(),
                self.capacity
            );
            return Err(CodecError::CapacityExceeded {
                len: self.buf.len(),
                capacity: self.capacity,
            });
        }
        Ok(self.buf)
    }
}

/// Splits input into delimiter-terminated spans without touching the input.
///
/// A non-empty tail with no closing delimiter is yielded as a final span.
#[derive(Debug, Clone)]
struct Spans<'a> {
    rest: &'a [u8],
}

impl<'a> Iterator for Spans<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match self.rest.iter().position(|b| *b == DELIMITER) {
            Some(end) => {
                let span = &self.rest[..end];
                self.rest = &self.rest[end + 1..];
                Some(span)
            }
            None => {
                let span = self.rest;
                self.rest = &[];
                Some(span)
            }
        }
    }
}

/// Returns the leading type tag of an encoded record.
pub(crate) fn peek_tag(bytes: &[u8]) -> Result<&str, CodecError> {
    let tag = Spans { rest: bytes }
        .next()
        .ok_or(CodecError::InvalidInput)?;

    str::from_utf8(tag).map_err(|_| CodecError::UnknownType(String::from_utf8_lossy(tag).into()))
}

/// Positional reader over the fields of one encoded record.
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    spans: Spans<'a>,
    integers: IntegerPolicy,
}

impl<'a> FieldReader<'a> {
    /// Checks the leading tag against `expected` and positions the reader on the
    /// first field.
    pub fn open(
        bytes: &'a [u8],
        expected: &str,
        integers: IntegerPolicy,
    ) -> Result<Self, CodecError> {
        let mut spans = Spans { rest: bytes };
        let tag = spans.next().ok_or(CodecError::InvalidInput)?;

        if tag != expected.as_bytes() {
            let found = String::from_utf8_lossy(tag).into_owned();
            debug!("rejected record tagged '{found}', expected '{expected}'");
            return Err(CodecError::TypeMismatch {
                expected: expected.to_string(),
                found,
            });
        }

        Ok(Self { spans, integers })
    }

    /// Reads the next field as text. A missing field is `None`; an empty span is
    /// an empty string.
    pub fn text(&mut self, field: &str) -> Result<Option<String>, CodecError> {
        match self.spans.next() {
            None => Ok(None),
            Some(span) => str::from_utf8(span)
                .map(|s| Some(s.to_string()))
                .map_err(|_| CodecError::InvalidText {
                    field: field.to_string(),
                }),
        }
    }

    /// Reads the next field as an integer. A missing field is `0`.
    pub fn integer(&mut self, field: &str) -> Result<i32, CodecError> {
        match self.spans.next() {
            None => Ok(0),
            Some(span) => match self.integers {
                IntegerPolicy::Permissive => Ok(parse_leading_int(span)),
                IntegerPolicy::Strict => str::from_utf8(span)
                    .ok()
                    .and_then(|s| s.parse::<i32>().ok())
                    .ok_or_else(|| CodecError::InvalidInteger {
                        field: field.to_string(),
                        value: String::from_utf8_lossy(span).into_owned(),
                    }),
            },
        }
    }
}

/// Parses an integer the way C's `atoi` does.
///
/// Leading whitespace is skipped, an optional sign is honoured and the longest run
/// of digits is used. Anything without digits is `0`. Out-of-range values saturate.
pub(crate) fn parse_leading_int(bytes: &[u8]) -> i32 {
    let start = bytes
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r'))
        .unwrap_or(bytes.len());
    let mut rest = &bytes[start..];

    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let limit = i64::from(i32::MAX) + 1;
    let mut value: i64 = 0;
    for digit in rest.iter().take_while(|b| b.is_ascii_digit()) {
        value = value * 10 + i64::from(digit - b'0');
        if value > limit {
            break;
        }
    }

    let value = if negative { -value } else { value };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
