//! pgrelay: the PostgreSQL wire-protocol layer of a connection pooler.
//!
//! This facade re-exports the pieces a pooler needs on its hot path:
//!
//! - [`protocol`]: message framing, startup packet parsing, ErrorResponse
//!   decomposition, message building and the network byte order codec.
//! - [`auth`]: base64 transcoding used by authentication exchanges.
//! - [`ProtocolError`], [`ProtocolConfig`] and the [`ConnectionState`] vocabulary
//!   from `pgrelay-core`.
//!
//! # Example
//!
//! ```
//! use pgrelay::prelude::*;
//!
//! let startup = pgrelay::protocol::startup_message(&[("user", "alice")]);
//! let identity = extract_connection_identity(&startup)?;
//! assert_eq!(identity.database.as_deref(), Some("alice"));
//! # Ok::<(), ProtocolError>(())
//! ```

pub use pgrelay_core::{
    ConnectionState, DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_STARTUP_PACKET_SIZE, ProtocolConfig,
    ProtocolError, Result, UNKNOWN_STATE_LABEL, state_label,
};
pub use pgrelay_postgres::{auth, protocol};

/// Common imports.
pub mod prelude {
    pub use pgrelay_core::{ConnectionState, ProtocolConfig, ProtocolError, state_label};
    pub use pgrelay_postgres::auth::{base64_decode, base64_encode};
    pub use pgrelay_postgres::protocol::{
        ConnectionIdentity, ErrorFields, Frames, Message, MessageBuilder, RequestCode,
        StartupParameters, classify_request, extract_connection_identity, extract_error_text,
        extract_message, get_request_code, parse_error_fields, parse_startup_parameters,
    };
}
