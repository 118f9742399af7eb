//! PostgreSQL wire-protocol codec for pgrelay.
//!
//! This crate decodes and re-frames the PostgreSQL frontend/backend protocol so a
//! connection pooler can inspect, route and relay traffic without understanding
//! SQL. It provides:
//!
//! - Network byte order primitives
//! - Message framing over concatenated buffers
//! - Startup packet parsing (request codes, connection identity)
//! - ErrorResponse decomposition
//! - Base64 transcoding for authentication exchanges
//!
//! Everything here is synchronous and allocation-light. Every parsed value is owned
//! by the caller and detached from the input buffer.

pub mod auth;
pub mod protocol;

pub use auth::{base64_decode, base64_encode};
pub use protocol::{
    ConnectionIdentity, ErrorFields, Frames, Message, MessageBuilder, RequestCode,
    StartupParameters, extract_connection_identity, extract_error_text, extract_message,
    get_request_code,
};
