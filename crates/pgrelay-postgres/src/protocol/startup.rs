//! Startup packet decoding.
//!
//! The startup packet is the first thing a client sends and it arrives before any
//! authentication, so every length in it is treated as hostile.
//!
//! ```text
//! +--------+--------------+-----------------------------------+----+
//! | Length | Request code | key\0value\0 key\0value\0 ...     | \0 |
//! | 4B     | 4B           |                                   |    |
//! +--------+--------------+-----------------------------------+----+
//! ```

use pgrelay_core::{ProtocolConfig, ProtocolError, Result};

use super::codec::{Cursor, read_int32};
use super::messages::{
    ConnectionIdentity, Message, RequestCode, STARTUP_HEADER_LEN, StartupParameters,
};

/// Read the request code at offset 4 of a startup-style packet.
///
/// Fails when the packet is shorter than the 8-byte header.
pub fn get_request_code(msg: &Message<'_>) -> Result<i32> {
    let data = msg.as_bytes();
    if data.len() < STARTUP_HEADER_LEN {
        return Err(ProtocolError::Incomplete);
    }
    Ok(read_int32(data, 4))
}

/// Read and classify the request code of a startup-style packet.
pub fn classify_request(msg: &Message<'_>) -> Result<RequestCode> {
    get_request_code(msg).map(RequestCode::from_code)
}

/// Parse the parameter list of a startup message with the default limits.
pub fn parse_startup_parameters(msg: &Message<'_>) -> Result<StartupParameters> {
    parse_startup_parameters_with(msg, &ProtocolConfig::default())
}

/// Parse the parameter list of a startup message.
///
/// Parameters run from offset 8 up to, not including, the final terminator at
/// `length - 1`. Every key must have a value and every key must be non-empty.
pub fn parse_startup_parameters_with(
    msg: &Message<'_>,
    config: &ProtocolConfig,
) -> Result<StartupParameters> {
    let region = parameter_region(msg, config)?;

    let mut cur = Cursor::new(region);
    let mut params = Vec::new();
    while !cur.is_empty() {
        let key = cur.read_cstring()?;
        if key.is_empty() {
            return Err(ProtocolError::InvalidField("empty startup parameter name"));
        }
        if cur.is_empty() {
            return Err(ProtocolError::InvalidField("startup parameter without value"));
        }
        let value = cur.read_cstring()?;
        params.push((key, value));
    }
    Ok(StartupParameters::from_pairs(params))
}

/// Bytes between the header and the final terminator, after checking the
/// declared length against the buffer and the configured limit.
///
/// A tagged message is a usage error: startup packets carry no type byte.
fn parameter_region<'m>(msg: &'m Message<'_>, config: &ProtocolConfig) -> Result<&'m [u8]> {
    if msg.is_tagged() {
        return Err(ProtocolError::UnexpectedMessageKind {
            expected: 0,
            actual: msg.kind(),
        });
    }
    let data = msg.as_bytes();
    if data.len() < STARTUP_HEADER_LEN {
        return Err(ProtocolError::Incomplete);
    }
    let length = read_int32(data, 0);
    if length < STARTUP_HEADER_LEN as i32 {
        return Err(ProtocolError::InvalidLength { length });
    }
    let length = length as usize;
    if length > config.max_startup_packet_size {
        return Err(ProtocolError::MessageTooLarge {
            length,
            max: config.max_startup_packet_size,
        });
    }
    if length > data.len() {
        return Err(ProtocolError::LengthOutOfBounds {
            declared: length,
            available: data.len(),
        });
    }
    if length == STARTUP_HEADER_LEN {
        return Ok(&[]);
    }
    if data[length - 1] != 0 {
        return Err(ProtocolError::MissingTerminator);
    }
    Ok(&data[STARTUP_HEADER_LEN..length - 1])
}

/// Pull user, database and application name out of a startup message.
///
/// When the client names no database, the database defaults to the username,
/// as the PostgreSQL server does.
pub fn extract_connection_identity(msg: &Message<'_>) -> Result<ConnectionIdentity> {
    extract_connection_identity_with(msg, &ProtocolConfig::default())
}

/// [`extract_connection_identity`] with explicit limits.
pub fn extract_connection_identity_with(
    msg: &Message<'_>,
    config: &ProtocolConfig,
) -> Result<ConnectionIdentity> {
    let params = parse_startup_parameters_with(msg, config)?;

    let mut identity = ConnectionIdentity::default();
    for (key, value) in params.into_vec() {
        match key.as_str() {
            "user" => identity.username = Some(value),
            "database" => identity.database = Some(value),
            "application_name" => identity.application_name = Some(value),
            _ => {}
        }
    }
    if identity.database.is_none() {
        identity.database.clone_from(&identity.username);
    }

    tracing::trace!(
        username = identity.username.as_deref(),
        database = identity.database.as_deref(),
        application_name = identity.application_name.as_deref(),
        "Extracted startup identity"
    );
    Ok(identity)
}
