//! Message definitions for the PostgreSQL protocol.

use std::borrow::Cow;
use std::fmt;

use pgrelay_core::{ProtocolError, Result};

use super::codec::read_int32;

/// Protocol version 3.0.
pub const PROTOCOL_VERSION: i32 = 196_608; // 3 << 16

/// Cancel request code.
pub const CANCEL_REQUEST_CODE: i32 = 80_877_102; // 1234 << 16 | 5678

/// SSL request code.
pub const SSL_REQUEST_CODE: i32 = 80_877_103; // 1234 << 16 | 5679

/// GSSAPI encryption request code.
pub const GSSENC_REQUEST_CODE: i32 = 80_877_104; // 1234 << 16 | 5680

/// Major version reserved for request codes that are not protocol versions.
pub const RESERVED_REQUEST_MAJOR: u16 = 1234;

/// Bytes before the payload of a tagged message: type byte and length.
pub const TAGGED_HEADER_LEN: usize = 5;

/// Bytes before the parameters of a startup packet: length and request code.
pub const STARTUP_HEADER_LEN: usize = 8;

// ==================== Raw Messages ====================

/// One protocol message as raw bytes.
///
/// Tagged messages carry `type(1) + length(4) + payload`, where the length counts
/// itself but not the type byte. Startup-style packets have no type byte; they are
/// represented as untagged messages whose [`kind`](Message::kind) is `0`.
///
/// A message either borrows a window of a larger buffer or owns its bytes.
/// Everything handed back by the framer is owned and detached from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message<'a> {
    tagged: bool,
    data: Cow<'a, [u8]>,
}

impl<'a> Message<'a> {
    /// Borrow the first tagged message at the start of `buf`.
    ///
    /// Only the bytes covered by the declared length are included; anything after
    /// them is left for the next message.
    pub fn parse(buf: &'a [u8]) -> Result<Self> {
        if buf.len() < TAGGED_HEADER_LEN {
            return Err(ProtocolError::Incomplete);
        }
        let length = read_int32(buf, 1);
        if length < 4 {
            return Err(ProtocolError::InvalidLength { length });
        }
        let total = length as usize + 1;
        if total > buf.len() {
            return Err(ProtocolError::LengthOutOfBounds {
                declared: total,
                available: buf.len(),
            });
        }
        Ok(Self {
            tagged: true,
            data: Cow::Borrowed(&buf[..total]),
        })
    }

    /// Wrap a startup-style packet (no type byte).
    ///
    /// Nothing is validated here; the startup parsers check the declared length.
    pub fn untagged(buf: &'a [u8]) -> Self {
        Self {
            tagged: false,
            data: Cow::Borrowed(buf),
        }
    }

    /// Type byte, or `0` for startup-style packets.
    pub fn kind(&self) -> u8 {
        if self.tagged { self.data[0] } else { 0 }
    }

    /// Whether the message starts with a type byte.
    pub fn is_tagged(&self) -> bool {
        self.tagged
    }

    /// Total size in bytes, including the type byte if any.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the message holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The complete raw message.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Bytes after the type byte and length field.
    pub fn payload(&self) -> &[u8] {
        let header = if self.tagged { TAGGED_HEADER_LEN } else { 4 };
        self.data.get(header..).unwrap_or_default()
    }

    /// Whether this message owns its bytes.
    pub fn is_owned(&self) -> bool {
        matches!(self.data, Cow::Owned(_))
    }

    /// Detach from the source buffer, copying if borrowed.
    pub fn into_owned(self) -> Message<'static> {
        Message {
            tagged: self.tagged,
            data: Cow::Owned(self.data.into_owned()),
        }
    }

    /// Expect a specific type byte.
    pub fn expect_kind(&self, expected: u8) -> Result<()> {
        if !self.tagged || self.kind() != expected {
            return Err(ProtocolError::UnexpectedMessageKind {
                expected,
                actual: self.kind(),
            });
        }
        Ok(())
    }
}

impl Message<'static> {
    /// Take ownership of a complete tagged frame built in memory.
    pub(crate) fn from_frame(data: Vec<u8>) -> Self {
        debug_assert!(data.len() >= TAGGED_HEADER_LEN);
        Self {
            tagged: true,
            data: Cow::Owned(data),
        }
    }

    /// Take ownership of a complete startup-style packet built in memory.
    pub(crate) fn from_untagged(data: Vec<u8>) -> Self {
        Self {
            tagged: false,
            data: Cow::Owned(data),
        }
    }
}

// ==================== Startup Packets ====================

/// What a startup-style packet asks for, decoded from its request code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestCode {
    /// A regular startup message for the given protocol version.
    Startup {
        /// Major protocol version (3 for current clients)
        major: u16,
        /// Minor protocol version
        minor: u16,
    },
    /// Client wants to negotiate TLS
    SslRequest,
    /// Client wants to negotiate GSSAPI encryption
    GssEncRequest,
    /// Cancel a running query on another connection
    CancelRequest,
    /// Reserved major version with an unknown minor code
    Unrecognized(i32),
}

impl RequestCode {
    /// Classify a raw request code.
    pub fn from_code(code: i32) -> Self {
        match code {
            SSL_REQUEST_CODE => RequestCode::SslRequest,
            GSSENC_REQUEST_CODE => RequestCode::GssEncRequest,
            CANCEL_REQUEST_CODE => RequestCode::CancelRequest,
            _ => {
                let major = (code as u32 >> 16) as u16;
                let minor = (code as u32 & 0xffff) as u16;
                if major == RESERVED_REQUEST_MAJOR {
                    RequestCode::Unrecognized(code)
                } else {
                    RequestCode::Startup { major, minor }
                }
            }
        }
    }

    /// Get the raw request code.
    pub fn code(self) -> i32 {
        match self {
            RequestCode::Startup { major, minor } => {
                ((u32::from(major) << 16) | u32::from(minor)) as i32
            }
            RequestCode::SslRequest => SSL_REQUEST_CODE,
            RequestCode::GssEncRequest => GSSENC_REQUEST_CODE,
            RequestCode::CancelRequest => CANCEL_REQUEST_CODE,
            RequestCode::Unrecognized(code) => code,
        }
    }

    /// Whether the packet carries a parameter list.
    pub fn is_startup(self) -> bool {
        matches!(self, RequestCode::Startup { .. })
    }
}

/// All `key`/`value` pairs of a startup message, in wire order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartupParameters {
    params: Vec<(String, String)>,
}

impl StartupParameters {
    pub(crate) fn from_pairs(params: Vec<(String, String)>) -> Self {
        Self { params }
    }

    /// Value of `key`, exact match. The last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterate pairs in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.params
    }
}

/// Who a client is and where it wants to go, taken from its startup message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionIdentity {
    /// `user` parameter
    pub username: Option<String>,
    /// `database` parameter, or the username when the client sent none
    pub database: Option<String>,
    /// `application_name` parameter
    pub application_name: Option<String>,
}

// ==================== Error and Notice Responses ====================

/// Error and notice response fields.
///
/// PostgreSQL error responses contain multiple fields identified by single-byte codes.
/// Severity and code are always sent by the server; the message is optional here so
/// that its absence stays observable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ErrorFields {
    /// Severity (ERROR, FATAL, PANIC, WARNING, NOTICE, DEBUG, INFO, LOG)
    pub severity: String,
    /// Localized severity (for display)
    pub severity_localized: Option<String>,
    /// SQLSTATE code (e.g., "23505" for unique_violation)
    pub code: String,
    /// Primary error message
    pub message: Option<String>,
    /// Optional secondary message with more detail
    pub detail: Option<String>,
    /// Optional suggestion for fixing the problem
    pub hint: Option<String>,
    /// Position in query string (1-based)
    pub position: Option<i32>,
    /// Position in internal query
    pub internal_position: Option<i32>,
    /// Internal query that generated the error
    pub internal_query: Option<String>,
    /// Call stack context
    pub where_: Option<String>,
    /// Schema name
    pub schema: Option<String>,
    /// Table name
    pub table: Option<String>,
    /// Column name
    pub column: Option<String>,
    /// Data type name
    pub data_type: Option<String>,
    /// Constraint name
    pub constraint: Option<String>,
    /// Source file name
    pub file: Option<String>,
    /// Source line number
    pub line: Option<i32>,
    /// Source routine name
    pub routine: Option<String>,
}

impl ErrorFields {
    /// Check if this is a fatal error.
    pub fn is_fatal(&self) -> bool {
        self.severity == "FATAL" || self.severity == "PANIC"
    }

    /// Check if this is a regular error.
    pub fn is_error(&self) -> bool {
        self.severity == "ERROR"
    }

    /// Get the SQLSTATE error class (first two characters).
    pub fn error_class(&self) -> &str {
        self.code.get(..2).unwrap_or(&self.code)
    }
}

impl fmt::Display for ErrorFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.severity,
            self.message.as_deref().unwrap_or("<no message>"),
            self.code
        )?;
        if let Some(detail) = &self.detail {
            write!(f, "\nDETAIL: {detail}")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, "\nHINT: {hint}")?;
        }
        Ok(())
    }
}

/// Field type codes inside ErrorResponse and NoticeResponse.
pub mod error_field {
    pub const SEVERITY: u8 = b'S';
    pub const SEVERITY_NONLOCALIZED: u8 = b'V';
    pub const CODE: u8 = b'C';
    pub const MESSAGE: u8 = b'M';
    pub const DETAIL: u8 = b'D';
    pub const HINT: u8 = b'H';
    pub const POSITION: u8 = b'P';
    pub const INTERNAL_POSITION: u8 = b'p';
    pub const INTERNAL_QUERY: u8 = b'q';
    pub const WHERE: u8 = b'W';
    pub const SCHEMA: u8 = b's';
    pub const TABLE: u8 = b't';
    pub const COLUMN: u8 = b'c';
    pub const DATA_TYPE: u8 = b'd';
    pub const CONSTRAINT: u8 = b'n';
    pub const FILE: u8 = b'F';
    pub const LINE: u8 = b'L';
    pub const ROUTINE: u8 = b'R';
    /// Ends the field list; no string follows.
    pub const TERMINATOR: u8 = 0;
}

// ==================== Message Type Bytes ====================

/// Type bytes of the frontend messages the pooler looks at.
pub mod frontend_type {
    pub const PASSWORD: u8 = b'p';
    pub const QUERY: u8 = b'Q';
    pub const PARSE: u8 = b'P';
    pub const SYNC: u8 = b'S';
    pub const TERMINATE: u8 = b'X';
}

/// Type bytes of the backend messages the pooler looks at.
pub mod backend_type {
    pub const PARAMETER_STATUS: u8 = b'S';
    pub const READY_FOR_QUERY: u8 = b'Z';
    pub const DATA_ROW: u8 = b'D';
    pub const ERROR_RESPONSE: u8 = b'E';
    pub const NOTICE_RESPONSE: u8 = b'N';
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_borrows_exactly_one_frame() {
        let buf = [b'Z', 0, 0, 0, 5, b'I', b'C', 0, 0];
        let msg = Message::parse(&buf).unwrap();
        assert_eq!(msg.kind(), b'Z');
        assert_eq!(msg.len(), 6);
        assert_eq!(msg.payload(), b"I");
        assert!(!msg.is_owned());

        let owned = msg.into_owned();
        assert!(owned.is_owned());
        assert_eq!(owned.as_bytes(), &buf[..6]);
    }

    #[test]
    fn test_parse_rejects_bad_lengths() {
        assert!(matches!(
            Message::parse(&[b'Z', 0, 0]),
            Err(ProtocolError::Incomplete)
        ));
        assert!(matches!(
            Message::parse(&[b'Z', 0, 0, 0, 3]),
            Err(ProtocolError::InvalidLength { length: 3 })
        ));
        assert!(matches!(
            Message::parse(&[b'Z', 0, 0, 0, 9, b'I']),
            Err(ProtocolError::LengthOutOfBounds {
                declared: 10,
                available: 6
            })
        ));
    }

    #[test]
    fn test_untagged_kind_is_zero() {
        let buf = [0, 0, 0, 8, 0x04, 0xd2, 0x16, 0x2f];
        let msg = Message::untagged(&buf);
        assert_eq!(msg.kind(), 0);
        assert!(!msg.is_tagged());
        assert_eq!(msg.payload(), &buf[4..]);
        assert!(msg.expect_kind(0).is_err());
    }

    #[test]
    fn test_request_code_classification() {
        assert_eq!(
            RequestCode::from_code(PROTOCOL_VERSION),
            RequestCode::Startup { major: 3, minor: 0 }
        );
        assert_eq!(
            RequestCode::from_code(SSL_REQUEST_CODE),
            RequestCode::SslRequest
        );
        assert_eq!(
            RequestCode::from_code(GSSENC_REQUEST_CODE),
            RequestCode::GssEncRequest
        );
        assert_eq!(
            RequestCode::from_code(CANCEL_REQUEST_CODE),
            RequestCode::CancelRequest
        );
        let odd = (1234 << 16) | 9999;
        assert_eq!(RequestCode::from_code(odd), RequestCode::Unrecognized(odd));
        for code in [PROTOCOL_VERSION, SSL_REQUEST_CODE, odd] {
            assert_eq!(RequestCode::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_startup_parameters_last_value_wins() {
        let params = StartupParameters::from_pairs(vec![
            ("user".to_string(), "a".to_string()),
            ("user".to_string(), "b".to_string()),
        ]);
        assert_eq!(params.get("user"), Some("b"));
        assert_eq!(params.get("USER"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_error_fields_display_and_class() {
        let err = ErrorFields {
            severity: "ERROR".to_string(),
            code: "23505".to_string(),
            message: Some("duplicate key value violates unique constraint".to_string()),
            detail: Some("Key (id)=(1) already exists.".to_string()),
            ..Default::default()
        };
        let display = err.to_string();
        assert!(display.contains("ERROR"));
        assert!(display.contains("23505"));
        assert!(display.contains("Key (id)=(1)"));
        assert_eq!(err.error_class(), "23");
        assert!(err.is_error());
        assert!(!err.is_fatal());
    }
}
