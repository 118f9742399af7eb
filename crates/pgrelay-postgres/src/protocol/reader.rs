//! Locating and decomposing tagged messages.
//!
//! A read from a client or server socket may hold several messages back to back.
//! The pooler mostly relays them untouched and only needs to find the odd message
//! it cares about, so this module scans frames without decoding payloads.

use pgrelay_core::{ProtocolConfig, ProtocolError, Result};

use super::codec::Cursor;
use super::messages::{ErrorFields, Message, backend_type, error_field};

/// Iterator over the tagged messages of a buffer, in order.
///
/// Yields borrowed views. After the first malformed frame it yields that error
/// once and then stops, since the position of the following frame is unknown.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    buf: &'a [u8],
    offset: usize,
    max_message_size: usize,
    failed: bool,
}

impl<'a> Frames<'a> {
    /// Scan `buf` with the default size limit.
    pub fn new(buf: &'a [u8]) -> Self {
        Self::with_config(buf, &ProtocolConfig::default())
    }

    /// Scan `buf` with the limits from `config`.
    pub fn with_config(buf: &'a [u8], config: &ProtocolConfig) -> Self {
        Self {
            buf,
            offset: 0,
            max_message_size: config.max_message_size,
            failed: false,
        }
    }

    /// Offset of the next frame in the buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    fn next_frame(&mut self) -> Result<Message<'a>> {
        let rest = &self.buf[self.offset..];
        let frame = Message::parse(rest)?;
        if frame.len() > self.max_message_size {
            return Err(ProtocolError::MessageTooLarge {
                length: frame.len(),
                max: self.max_message_size,
            });
        }
        self.offset += frame.len();
        Ok(frame)
    }
}

impl<'a> Iterator for Frames<'a> {
    type Item = Result<Message<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buf.len() {
            return None;
        }
        match self.next_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(err) => {
                tracing::debug!(offset = self.offset, error = %err, "Malformed frame");
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Copy out the first message of type `kind` in `buf`.
///
/// Returns `Ok(None)` when the buffer is well formed but holds no such message.
pub fn extract_message(kind: u8, buf: &[u8]) -> Result<Option<Message<'static>>> {
    extract_message_with(kind, buf, &ProtocolConfig::default())
}

/// [`extract_message`] with explicit limits.
pub fn extract_message_with(
    kind: u8,
    buf: &[u8],
    config: &ProtocolConfig,
) -> Result<Option<Message<'static>>> {
    for frame in Frames::with_config(buf, config) {
        let frame = frame?;
        if frame.kind() == kind {
            tracing::trace!(kind = %char::from(kind), length = frame.len(), "Extracted message");
            return Ok(Some(frame.into_owned()));
        }
    }
    Ok(None)
}

/// Walk the `(type, value)` fields of an ErrorResponse or NoticeResponse.
///
/// Stops at the zero terminator or the end of the message, whichever comes first.
/// `visit` returns `false` to stop early.
fn visit_error_fields<'a>(
    msg: &'a Message<'_>,
    mut visit: impl FnMut(u8, &'a [u8]) -> Result<bool>,
) -> Result<()> {
    let mut cur = Cursor::new(msg.payload());
    while !cur.is_empty() {
        let code = cur.read_u8()?;
        if code == error_field::TERMINATOR {
            break;
        }
        let value = cur.read_cstr()?;
        if !visit(code, value)? {
            break;
        }
    }
    Ok(())
}

/// Primary human-readable text (`'M'` field) of an ErrorResponse.
///
/// Fails with [`ProtocolError::UnexpectedMessageKind`] for any other message type.
/// Returns `Ok(None)` when the response has no message field.
pub fn extract_error_text(msg: &Message<'_>) -> Result<Option<String>> {
    msg.expect_kind(backend_type::ERROR_RESPONSE)?;

    let mut text = None;
    visit_error_fields(msg, |code, value| {
        if code == error_field::MESSAGE {
            text = Some(String::from_utf8(value.to_vec())?);
            return Ok(false);
        }
        Ok(true)
    })?;
    Ok(text)
}

/// Decompose every known field of an ErrorResponse or NoticeResponse.
pub fn parse_error_fields(msg: &Message<'_>) -> Result<ErrorFields> {
    if msg.kind() != backend_type::NOTICE_RESPONSE {
        msg.expect_kind(backend_type::ERROR_RESPONSE)?;
    }

    let mut fields = ErrorFields::default();
    visit_error_fields(msg, |code, value| {
        let value = String::from_utf8(value.to_vec())?;
        match code {
            error_field::SEVERITY => fields.severity_localized = Some(value),
            error_field::SEVERITY_NONLOCALIZED => fields.severity = value,
            error_field::CODE => fields.code = value,
            error_field::MESSAGE => fields.message = Some(value),
            error_field::DETAIL => fields.detail = Some(value),
            error_field::HINT => fields.hint = Some(value),
            error_field::POSITION => fields.position = value.parse().ok(),
            error_field::INTERNAL_POSITION => fields.internal_position = value.parse().ok(),
            error_field::INTERNAL_QUERY => fields.internal_query = Some(value),
            error_field::WHERE => fields.where_ = Some(value),
            error_field::SCHEMA => fields.schema = Some(value),
            error_field::TABLE => fields.table = Some(value),
            error_field::COLUMN => fields.column = Some(value),
            error_field::DATA_TYPE => fields.data_type = Some(value),
            error_field::CONSTRAINT => fields.constraint = Some(value),
            error_field::FILE => fields.file = Some(value),
            error_field::LINE => fields.line = value.parse().ok(),
            error_field::ROUTINE => fields.routine = Some(value),
            _ => {
                // Ignore unknown fields.
            }
        }
        Ok(true)
    })?;

    // Pre-9.6 servers send only the localized severity.
    if fields.severity.is_empty() {
        if let Some(localized) = &fields.severity_localized {
            fields.severity.clone_from(localized);
        }
    }
    Ok(fields)
}
