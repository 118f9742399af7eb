//! Pooled connection lifecycle vocabulary.
//!
//! The pool manager owns the state machine; this module only names the states
//! and renders them for status output. Tags are the signed bytes stored in the
//! shared connection slots.

use std::fmt;

/// Label used for any tag outside the known states.
pub const UNKNOWN_STATE_LABEL: &str = "Unknown";

/// Lifecycle state of a pooled backend connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// Slot has never been set up.
    NotInit,
    /// Connection is being established.
    Init,
    /// Idle in the pool, ready to hand out.
    Free,
    /// Assigned to a client.
    InUse,
    /// Being drained; closes once the client lets go.
    Gracefully,
    /// Being flushed out of the pool.
    Flush,
    /// Under idle-timeout inspection.
    IdleCheck,
    /// Under validation before reuse.
    Validation,
    /// Being removed from the pool.
    Remove,
}

impl ConnectionState {
    /// All states, in tag order.
    pub const ALL: [ConnectionState; 9] = [
        ConnectionState::NotInit,
        ConnectionState::Init,
        ConnectionState::Free,
        ConnectionState::InUse,
        ConnectionState::Gracefully,
        ConnectionState::Flush,
        ConnectionState::IdleCheck,
        ConnectionState::Validation,
        ConnectionState::Remove,
    ];

    /// Get the slot tag for this state.
    pub const fn as_tag(self) -> i8 {
        match self {
            ConnectionState::NotInit => -2,
            ConnectionState::Init => -1,
            ConnectionState::Free => 0,
            ConnectionState::InUse => 1,
            ConnectionState::Gracefully => 2,
            ConnectionState::Flush => 3,
            ConnectionState::IdleCheck => 4,
            ConnectionState::Validation => 5,
            ConnectionState::Remove => 6,
        }
    }

    /// Parse from a slot tag.
    pub fn from_tag(tag: i8) -> Option<Self> {
        match tag {
            -2 => Some(ConnectionState::NotInit),
            -1 => Some(ConnectionState::Init),
            0 => Some(ConnectionState::Free),
            1 => Some(ConnectionState::InUse),
            2 => Some(ConnectionState::Gracefully),
            3 => Some(ConnectionState::Flush),
            4 => Some(ConnectionState::IdleCheck),
            5 => Some(ConnectionState::Validation),
            6 => Some(ConnectionState::Remove),
            _ => None,
        }
    }

    /// Human-readable label for status output.
    pub const fn label(self) -> &'static str {
        match self {
            ConnectionState::NotInit => "Not initialized",
            ConnectionState::Init => "Initializing",
            ConnectionState::Free => "Free",
            ConnectionState::InUse => "Active",
            ConnectionState::Gracefully => "Graceful",
            ConnectionState::Flush => "Flush",
            ConnectionState::IdleCheck => "Idle check",
            ConnectionState::Validation => "Validating",
            ConnectionState::Remove => "Removing",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Label for a raw slot tag; `"Unknown"` for anything unrecognized.
pub fn state_label(tag: i8) -> &'static str {
    ConnectionState::from_tag(tag).map_or(UNKNOWN_STATE_LABEL, ConnectionState::label)
}
