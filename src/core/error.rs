// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for proto2json.
//!
//! Every failure in the resolve → decode → project pipeline is a
//! [`CodecError`]. Variants are grouped into coarse [`ErrorKind`]s:
//! - schema problems (malformed or duplicate descriptors)
//! - lookups of message types that are not in the index
//! - wire bytes that do not match the resolved schema
//! - values that cannot be rendered as canonical JSON

use std::fmt;

/// Coarse classification of a [`CodecError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Duplicate or malformed descriptor.
    Schema,
    /// Requested fully qualified name is absent from the index.
    NotFound,
    /// Wire bytes inconsistent with the resolved schema.
    Decode,
    /// A decoded value has no canonical JSON rendering.
    Encode,
    /// Reading input failed.
    Io,
}

impl ErrorKind {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Schema => "schema",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Decode => "decode",
            ErrorKind::Encode => "encode",
            ErrorKind::Io => "io",
        }
    }
}

/// Errors that can occur while indexing, decoding or projecting messages.
#[derive(Debug, Clone)]
pub enum CodecError {
    /// Parse error in a descriptor set
    ParseError {
        /// What was being parsed
        context: String,
        /// Error message
        message: String,
    },

    /// Descriptor that is structurally invalid
    InvalidSchema {
        /// Schema file or type name
        schema_name: String,
        /// Validation error message
        reason: String,
    },

    /// Two records declare the same fully qualified type name
    DuplicateType {
        /// Fully qualified name declared twice
        type_name: String,
        /// File holding the first declaration
        first_file: String,
        /// File holding the conflicting declaration
        second_file: String,
    },

    /// Type not found in the descriptor index
    TypeNotFound {
        /// Type name that was not found
        type_name: String,
    },

    /// Input ended before a fixed-width value or varint was complete
    BufferTooShort {
        /// Requested bytes
        requested: usize,
        /// Available bytes
        available: usize,
        /// Cursor position when error occurred
        cursor_pos: u64,
    },

    /// Length-delimited payload exceeds the remaining input
    LengthExceeded {
        /// Declared length
        length: usize,
        /// Position in buffer
        position: usize,
        /// Buffer length
        buffer_len: usize,
    },

    /// Field decode error with context
    FieldDecodeError {
        /// Field name
        field_name: String,
        /// Field type
        field_type: String,
        /// Cursor position when error occurred
        cursor_pos: u64,
        /// Underlying error
        cause: String,
    },

    /// Message nesting went deeper than the configured limit
    RecursionLimit {
        /// Configured limit
        limit: u32,
    },

    /// Value cannot be rendered in the target encoding
    EncodeError {
        /// Codec context (e.g., "JSON")
        codec: String,
        /// Error message
        message: String,
    },

    /// Reading input failed
    Io(String),
}

impl CodecError {
    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create an invalid schema error.
    pub fn invalid_schema(schema_name: impl Into<String>, reason: impl Into<String>) -> Self {
        CodecError::InvalidSchema {
            schema_name: schema_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a duplicate type error.
    pub fn duplicate_type(
        type_name: impl Into<String>,
        first_file: impl Into<String>,
        second_file: impl Into<String>,
    ) -> Self {
        CodecError::DuplicateType {
            type_name: type_name.into(),
            first_file: first_file.into(),
            second_file: second_file.into(),
        }
    }

    /// Create a "type not found" error.
    pub fn type_not_found(type_name: impl Into<String>) -> Self {
        CodecError::TypeNotFound {
            type_name: type_name.into(),
        }
    }

    /// Create a buffer too short error.
    pub fn buffer_too_short(requested: usize, available: usize, cursor_pos: u64) -> Self {
        CodecError::BufferTooShort {
            requested,
            available,
            cursor_pos,
        }
    }

    /// Create a length exceeded error.
    pub fn length_exceeded(length: usize, position: usize, buffer_len: usize) -> Self {
        CodecError::LengthExceeded {
            length,
            position,
            buffer_len,
        }
    }

    /// Create a field decode error.
    pub fn field_decode(
        field_name: impl Into<String>,
        field_type: impl Into<String>,
        cursor_pos: u64,
        cause: impl Into<String>,
    ) -> Self {
        CodecError::FieldDecodeError {
            field_name: field_name.into(),
            field_type: field_type.into(),
            cursor_pos,
            cause: cause.into(),
        }
    }

    /// Create a recursion limit error.
    pub fn recursion_limit(limit: u32) -> Self {
        CodecError::RecursionLimit { limit }
    }

    /// Create an encode error.
    pub fn encode(codec: impl Into<String>, message: impl Into<String>) -> Self {
        CodecError::EncodeError {
            codec: codec.into(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::ParseError { .. }
            | CodecError::InvalidSchema { .. }
            | CodecError::DuplicateType { .. } => ErrorKind::Schema,
            CodecError::TypeNotFound { .. } => ErrorKind::NotFound,
            CodecError::BufferTooShort { .. }
            | CodecError::LengthExceeded { .. }
            | CodecError::FieldDecodeError { .. }
            | CodecError::RecursionLimit { .. } => ErrorKind::Decode,
            CodecError::EncodeError { .. } => ErrorKind::Encode,
            CodecError::Io(_) => ErrorKind::Io,
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            CodecError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => vec![("schema", schema_name.clone()), ("reason", reason.clone())],
            CodecError::DuplicateType {
                type_name,
                first_file,
                second_file,
            } => vec![
                ("type", type_name.clone()),
                ("first_file", first_file.clone()),
                ("second_file", second_file.clone()),
            ],
            CodecError::TypeNotFound { type_name } => vec![("type", type_name.clone())],
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => vec![
                ("requested", requested.to_string()),
                ("available", available.to_string()),
                ("cursor", cursor_pos.to_string()),
            ],
            CodecError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => vec![
                ("length", length.to_string()),
                ("position", position.to_string()),
                ("buffer_len", buffer_len.to_string()),
            ],
            CodecError::FieldDecodeError {
                field_name,
                field_type,
                cursor_pos,
                cause,
            } => vec![
                ("field", field_name.clone()),
                ("type", field_type.clone()),
                ("cursor", cursor_pos.to_string()),
                ("cause", cause.clone()),
            ],
            CodecError::RecursionLimit { limit } => vec![("limit", limit.to_string())],
            CodecError::EncodeError { codec, message } => {
                vec![("codec", codec.clone()), ("message", message.clone())]
            }
            CodecError::Io(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            CodecError::InvalidSchema {
                schema_name,
                reason,
            } => {
                write!(f, "Invalid schema '{schema_name}': {reason}")
            }
            CodecError::DuplicateType {
                type_name,
                first_file,
                second_file,
            } => write!(
                f,
                "Duplicate type '{type_name}': declared in '{first_file}' and '{second_file}'"
            ),
            CodecError::TypeNotFound { type_name } => {
                write!(f, "Type not found: '{type_name}'")
            }
            CodecError::BufferTooShort {
                requested,
                available,
                cursor_pos,
            } => write!(
                f,
                "Buffer too short: requested {requested} bytes at position {cursor_pos}, but only {available} bytes available"
            ),
            CodecError::LengthExceeded {
                length,
                position,
                buffer_len,
            } => write!(
                f,
                "Length {length} exceeds buffer at position {position} (buffer length: {buffer_len})"
            ),
            CodecError::FieldDecodeError {
                field_name,
                field_type,
                cursor_pos,
                cause,
            } => write!(
                f,
                "Failed to decode field '{field_name}' (type: '{field_type}', cursor_pos: {cursor_pos}): {cause}"
            ),
            CodecError::RecursionLimit { limit } => {
                write!(f, "Recursion limit of {limit} nested messages exceeded")
            }
            CodecError::EncodeError { codec, message } => {
                write!(f, "{codec} encode error: {message}")
            }
            CodecError::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

impl From<std::io::Error> for CodecError {
    fn from(err: std::io::Error) -> Self {
        CodecError::Io(err.to_string())
    }
}

impl From<prost::DecodeError> for CodecError {
    fn from(err: prost::DecodeError) -> Self {
        CodecError::parse("FileDescriptorSet", err.to_string())
    }
}

/// Result type for proto2json operations.
pub type Result<T> = std::result::Result<T, CodecError>;
