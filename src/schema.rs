//! Message layout descriptions.
//!
//! A schema file lists messages and their fields in wire order:
//!
//! ```text
//! # comment
//! MESSAGE StatusUpdate
//! FIELD code int
//! FIELD message string
//! ```
//!
//! The crate ships such a file describing the built-in records ([`Schema::builtin`]).
//! Any schema can decode matching input into a [`DynamicMessage`] using the same field
//! rules as the typed records in [`protocol`](crate::protocol).
use std::{fmt, fs, io, path::PathBuf};

use log::{debug, info};
use thiserror::Error;

use crate::protocol::{
    CodecConfig, DELIMITER, FieldKind, FieldReader, FieldWriter, Record, error::CodecError,
};

const BUILTIN: &str = include_str!("../protocol.spec");

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("line {line}: FIELD declared outside of a MESSAGE")]
    OrphanField { line: usize },

    #[error("line {line}: unknown field type '{kind}'")]
    UnknownFieldType { line: usize, kind: String },

    #[error("line {line}: invalid name '{name}'")]
    InvalidName { line: usize, name: String },

    #[error("line {line}: malformed declaration '{content}'")]
    Malformed { line: usize, content: String },

    #[error("message '{0}' declared more than once")]
    DuplicateMessage(String),

    #[error("failed to read schema: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

/// Value of a single field in a [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(Option<String>),
    Integer(i32),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(Some(text)) => write!(f, "{text:?}"),
            Value::Text(None) => write!(f, "<absent>"),
            Value::Integer(value) => write!(f, "{value}"),
        }
    }
}

/// A message decoded against a [`MessageDef`] rather than a Rust type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicMessage {
    pub name: String,
    pub values: Vec<(String, Value)>,
}

impl DynamicMessage {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    /// Encodes against `def`, which must describe this message exactly.
    ///
    /// # Errors
    ///
    /// Fails with [`CodecError::DelimiterInField`] when the name contains `|`, with
    /// [`CodecError::TypeMismatch`] when the name is not `def.name`, and with
    /// [`CodecError::LayoutMismatch`] when the values differ from `def.fields` in
    /// count, order or kind.
    pub fn encode(&self, def: &MessageDef, config: CodecConfig) -> Result<Vec<u8>, CodecError> {
        if self.name.as_bytes().contains(&DELIMITER) {
            return Err(CodecError::DelimiterInField {
                field: "name".to_string(),
            });
        }
        if self.name != def.name {
            return Err(CodecError::TypeMismatch {
                expected: def.name.clone(),
                found: self.name.clone(),
            });
        }
        if let Some(field) = layout_mismatch(def, &self.values) {
            debug!("refusing to encode {}: '{field}' does not match", self.name);
            return Err(CodecError::LayoutMismatch { field });
        }

        let mut writer = FieldWriter::new(&self.name, config.capacity());
        for (name, value) in &self.values {
            match value {
                Value::Text(text) => {
                    writer.text(name, text.as_deref())?;
                }
                Value::Integer(value) => {
                    writer.integer(*value);
                }
            }
        }
        writer.finish()
    }
}

/// First field name at which `values` departs from the layout of `def`.
fn layout_mismatch(def: &MessageDef, values: &[(String, Value)]) -> Option<String> {
    for (i, field) in def.fields.iter().enumerate() {
        let matches = match values.get(i) {
            Some((name, Value::Text(_))) => *name == field.name && field.kind == FieldKind::Text,
            Some((name, Value::Integer(_))) => {
                *name == field.name && field.kind == FieldKind::Integer
            }
            None => false,
        };
        if !matches {
            return Some(field.name.clone());
        }
    }

    values
        .get(def.fields.len())
        .map(|(name, _)| name.clone())
}

impl fmt::Display for DynamicMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.name)?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{sep}{name}: {value}")?;
        }
        write!(f, " }}")
    }
}

impl MessageDef {
    /// Whether this definition lays out the same fields as the record `R`.
    pub fn describes<R: Record>(&self) -> bool {
        self.name == R::NAME
            && self.fields.len() == R::FIELDS.len()
            && self
                .fields
                .iter()
                .zip(R::FIELDS)
                .all(|(def, (name, kind))| def.name == *name && def.kind == *kind)
    }

    pub fn decode(&self, bytes: &[u8], config: CodecConfig) -> Result<DynamicMessage, CodecError> {
        let mut reader = FieldReader::open(bytes, &self.name, config.integers())?;
        let mut values = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            let value = match field.kind {
                FieldKind::Text => Value::Text(reader.text(&field.name)?),
                FieldKind::Integer => Value::Integer(reader.integer(&field.name)?),
            };
            values.push((field.name.clone(), value));
        }

        Ok(DynamicMessage {
            name: self.name.clone(),
            values,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    messages: Vec<MessageDef>,
}

impl Schema {
    /// Schema describing [`LoginRequest`], [`StatusUpdate`] and [`DataPacket`].
    ///
    /// [`LoginRequest`]: crate::protocol::LoginRequest
    /// [`StatusUpdate`]: crate::protocol::StatusUpdate
    /// [`DataPacket`]: crate::protocol::DataPacket
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::parse(BUILTIN)
    }

    pub fn open(path: PathBuf) -> Result<Self, SchemaError> {
        let source = fs::read_to_string(&path)?;
        let schema = Self::parse(&source)?;
        info!(
            "loaded {} message(s) from {}",
            schema.messages.len(),
            path.display()
        );
        Ok(schema)
    }

    pub fn parse(source: &str) -> Result<Self, SchemaError> {
        let mut messages: Vec<MessageDef> = Vec::new();

        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parts = trimmed.split_whitespace().collect::<Vec<&str>>();
            match parts.as_slice() {
                ["MESSAGE", name] => {
                    let name = valid_name(line, name)?;
                    if messages.iter().any(|m| m.name == name) {
                        return Err(SchemaError::DuplicateMessage(name));
                    }
                    messages.push(MessageDef {
                        name,
                        fields: Vec::new(),
                    });
                }
                ["FIELD", name, kind] => {
                    let message = messages
                        .last_mut()
                        .ok_or(SchemaError::OrphanField { line })?;
                    let kind = match *kind {
                        "string" => FieldKind::Text,
                        "int" => FieldKind::Integer,
                        other => {
                            return Err(SchemaError::UnknownFieldType {
                                line,
                                kind: other.to_string(),
                            });
                        }
                    };
                    message.fields.push(FieldDef {
                        name: valid_name(line, name)?,
                        kind,
                    });
                }
                _ => {
                    return Err(SchemaError::Malformed {
                        line,
                        content: trimmed.to_string(),
                    });
                }
            }
        }

        debug!("parsed schema with {} message(s)", messages.len());
        Ok(Self { messages })
    }

    pub fn messages(&self) -> &[MessageDef] {
        &self.messages
    }

    pub fn get(&self, name: &str) -> Option<&MessageDef> {
        self.messages.iter().find(|m| m.name == name)
    }

    /// Decodes whichever described message the leading tag names.
    pub fn decode(&self, bytes: &[u8], config: CodecConfig) -> Result<DynamicMessage, CodecError> {
        let tag = crate::protocol::peek_tag(bytes)?;
        let def = self
            .get(tag)
            .ok_or_else(|| CodecError::UnknownType(tag.to_string()))?;
        def.decode(bytes, config)
    }
}

fn valid_name(line: usize, name: &str) -> Result<String, SchemaError> {
    if name.as_bytes().contains(&DELIMITER) {
        return Err(SchemaError::InvalidName {
            line,
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}
