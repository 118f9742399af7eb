//! PostgreSQL wire protocol implementation.
//!
//! PostgreSQL uses a simple message format with a type byte and length prefix.
//! This module turns raw socket buffers into messages a pooler can route, and
//! builds the few messages the pooler sends itself.
//!
//! # Message Format
//!
//! ## Standard Message (after startup)
//! ```text
//! +------+--------+------------------+
//! | Type | Length | Payload          |
//! | 1B   | 4B     | (Length-4) bytes |
//! +------+--------+------------------+
//! ```
//!
//! Length includes itself (4 bytes) but not the type byte.
//!
//! ## Startup Message (first message from client)
//! ```text
//! +--------+--------------+------------------+
//! | Length | Request code | Parameters       |
//! | 4B     | 4B           | (Length-8) bytes |
//! +--------+--------------+------------------+
//! ```
//!
//! No type byte for startup message. SSL, GSSAPI and cancel requests share the
//! shape and are told apart by the request code.

pub mod codec;
mod messages;
mod reader;
mod startup;
mod writer;

pub use messages::*;
pub use reader::{
    Frames, extract_error_text, extract_message, extract_message_with, parse_error_fields,
};
pub use startup::{
    classify_request, extract_connection_identity, extract_connection_identity_with,
    get_request_code, parse_startup_parameters, parse_startup_parameters_with,
};
pub use writer::{MessageBuilder, error_response, startup_message};
