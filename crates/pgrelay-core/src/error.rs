//! Error types for the pgrelay protocol layer.
//!
//! Failures fall into three groups:
//!
//! - **malformed input**: declared lengths that disagree with the buffer, missing
//!   terminators, undecodable text. Usually means the peer should be disconnected.
//! - **invalid usage**: a message-specific parser was handed a message of another
//!   kind. This is a bug in the caller, not in the peer.
//! - **not found**: a well-formed scan that matched nothing. This is not an error at
//!   all and is reported as `Ok(None)` by the operations that can produce it.

use thiserror::Error;

/// Errors that can occur while decoding or encoding PostgreSQL protocol data.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Not enough bytes to parse a full message.
    #[error("incomplete message")]
    Incomplete,

    /// Length prefix below the minimum for this message shape.
    #[error("invalid message length: {length}")]
    InvalidLength { length: i32 },

    /// Declared length runs past the end of the buffer.
    #[error("declared length {declared} exceeds available {available} bytes")]
    LengthOutOfBounds { declared: usize, available: usize },

    /// Message exceeds configured maximum size.
    #[error("message too large: {length} > {max}")]
    MessageTooLarge { length: usize, max: usize },

    /// Unexpected end of buffer while parsing a field.
    #[error("unexpected end of buffer")]
    UnexpectedEof,

    /// A null-terminated string or parameter list has no terminator.
    #[error("missing null terminator")]
    MissingTerminator,

    /// Invalid field encoding or value.
    #[error("invalid field: {0}")]
    InvalidField(&'static str),

    /// UTF-8 decoding error while parsing strings.
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Base64 text could not be decoded.
    #[error("invalid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    /// A parser was given a message of the wrong kind.
    #[error(
        "unexpected message kind: expected {:?}, got {:?}",
        tag_char(.expected),
        tag_char(.actual)
    )]
    UnexpectedMessageKind { expected: u8, actual: u8 },
}

impl ProtocolError {
    /// Whether this error was caused by bytes received from the peer.
    pub fn is_malformed(&self) -> bool {
        !self.is_usage()
    }

    /// Whether this error was caused by the caller using the wrong parser.
    pub fn is_usage(&self) -> bool {
        matches!(self, ProtocolError::UnexpectedMessageKind { .. })
    }
}

fn tag_char(tag: &u8) -> char {
    char::from(*tag)
}

/// Result type alias using [`ProtocolError`].
pub type Result<T> = std::result::Result<T, ProtocolError>;
