//! Protocol limits.
//!
//! Declared lengths come straight from untrusted peers, so every parser checks
//! them against both the buffer it was handed and the limits configured here.

use serde::Deserialize;

/// Default upper bound for a single tagged message (8 MiB).
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 8 * 1024 * 1024;

/// Default upper bound for a startup packet, matching the PostgreSQL server.
pub const DEFAULT_MAX_STARTUP_PACKET_SIZE: usize = 10_000;

/// Size limits applied while framing and parsing protocol messages.
///
/// Can be embedded in a pooler configuration file; missing keys fall back to
/// the defaults.
///
/// ```
/// use pgrelay_core::ProtocolConfig;
///
/// let config = ProtocolConfig::new().max_message_size(64 * 1024);
/// assert_eq!(config.max_message_size, 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest tagged message accepted, counting the type byte.
    pub max_message_size: usize,
    /// Largest startup packet accepted, counting the length field.
    pub max_startup_packet_size: usize,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_startup_packet_size: DEFAULT_MAX_STARTUP_PACKET_SIZE,
        }
    }
}

impl ProtocolConfig {
    /// Create a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum tagged message size.
    pub fn max_message_size(mut self, size: usize) -> Self {
        self.max_message_size = size;
        self
    }

    /// Set the maximum startup packet size.
    pub fn max_startup_packet_size(mut self, size: usize) -> Self {
        self.max_startup_packet_size = size;
        self
    }
}
