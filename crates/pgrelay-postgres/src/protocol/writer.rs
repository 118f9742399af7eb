//! Building messages the pooler sends on its own behalf.
//!
//! Most traffic is relayed verbatim. The pooler still has to speak for itself at
//! times, e.g. refusing a client with an ErrorResponse or opening a backend
//! connection with its own startup packet.

use super::codec::{write_byte, write_int16, write_int32, write_long, write_string};
use super::messages::{Message, PROTOCOL_VERSION, backend_type, error_field};

/// Incremental builder for a single tagged message.
///
/// The length field is written when the message is finished.
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    buf: Vec<u8>,
}

impl MessageBuilder {
    /// Start a message with the given type byte.
    pub fn new(kind: u8) -> Self {
        let mut buf = vec![0; 5];
        write_byte(&mut buf, 0, kind as i8);
        Self { buf }
    }

    fn grow(&mut self, n: usize) -> usize {
        let offset = self.buf.len();
        self.buf.resize(offset + n, 0);
        offset
    }

    pub fn put_byte(&mut self, value: i8) -> &mut Self {
        let offset = self.grow(1);
        write_byte(&mut self.buf, offset, value);
        self
    }

    pub fn put_int16(&mut self, value: i16) -> &mut Self {
        let offset = self.grow(2);
        write_int16(&mut self.buf, offset, value);
        self
    }

    pub fn put_int32(&mut self, value: i32) -> &mut Self {
        let offset = self.grow(4);
        write_int32(&mut self.buf, offset, value);
        self
    }

    pub fn put_long(&mut self, value: i64) -> &mut Self {
        let offset = self.grow(8);
        write_long(&mut self.buf, offset, value);
        self
    }

    /// Append `s` followed by a NUL terminator.
    ///
    /// `s` must not contain NUL; a reader would split it into two tokens.
    pub fn put_cstring(&mut self, s: &str) -> &mut Self {
        debug_assert!(!s.contains('\0'), "interior NUL in C string");
        let offset = self.grow(s.len() + 1);
        write_string(&mut self.buf, offset, s);
        self
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Patch the length field and hand over the owned message.
    pub fn finish(mut self) -> Message<'static> {
        let length = (self.buf.len() - 1) as i32;
        write_int32(&mut self.buf, 1, length);
        Message::from_frame(self.buf)
    }
}

/// Build an ErrorResponse with severity, SQLSTATE code and message text.
pub fn error_response(severity: &str, code: &str, message: &str) -> Message<'static> {
    let mut builder = MessageBuilder::new(backend_type::ERROR_RESPONSE);
    builder
        .put_byte(error_field::SEVERITY as i8)
        .put_cstring(severity)
        .put_byte(error_field::SEVERITY_NONLOCALIZED as i8)
        .put_cstring(severity)
        .put_byte(error_field::CODE as i8)
        .put_cstring(code)
        .put_byte(error_field::MESSAGE as i8)
        .put_cstring(message)
        .put_byte(error_field::TERMINATOR as i8);
    builder.finish()
}

/// Build a protocol 3.0 startup packet carrying `params`.
///
/// Keys and values must not contain NUL, and keys must be non-empty.
pub fn startup_message(params: &[(&str, &str)]) -> Message<'static> {
    debug_assert!(
        params
            .iter()
            .all(|(k, v)| !k.is_empty() && !k.contains('\0') && !v.contains('\0')),
        "startup parameters must be non-empty NUL-free keys with NUL-free values"
    );
    let body: usize = params.iter().map(|(k, v)| k.len() + v.len() + 2).sum();
    let length = 8 + body + 1;

    let mut buf = vec![0; length];
    write_int32(&mut buf, 0, length as i32);
    write_int32(&mut buf, 4, PROTOCOL_VERSION);
    let mut offset = 8;
    for (key, value) in params {
        write_string(&mut buf, offset, key);
        offset += key.len() + 1;
        write_string(&mut buf, offset, value);
        offset += value.len() + 1;
    }
    Message::from_untagged(buf)
}
