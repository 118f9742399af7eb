//! Core types for pgrelay.
//!
//! `pgrelay-core` is the **foundation layer** shared by the protocol codec and the
//! pooler built on top of it.
//!
//! # Role In The Architecture
//!
//! - **Error taxonomy**: [`ProtocolError`] separates malformed peer input from caller
//!   misuse; "not found" outcomes are `Ok(None)` and never errors.
//! - **Limits**: [`ProtocolConfig`] bounds every length a peer can declare.
//! - **State vocabulary**: [`ConnectionState`] names the lifecycle phases of a pooled
//!   backend connection. The pool manager owns the transitions.
//!
//! Most applications should use the `pgrelay` facade; reach for `pgrelay-core`
//! directly when writing a pool manager or an alternative codec.

pub mod config;
pub mod error;
pub mod state;

pub use config::{DEFAULT_MAX_MESSAGE_SIZE, DEFAULT_MAX_STARTUP_PACKET_SIZE, ProtocolConfig};
pub use error::{ProtocolError, Result};
pub use state::{ConnectionState, UNKNOWN_STATE_LABEL, state_label};
