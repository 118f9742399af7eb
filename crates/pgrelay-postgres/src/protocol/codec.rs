//! Network byte order primitives.
//!
//! The free functions are unchecked: an offset past the end of the buffer
//! panics like any slice index. The parsers in this crate read peer-supplied
//! bytes through a cursor that checks the remaining length before every read.
//!
//! Integers are composed and decomposed with explicit shifts so the result
//! never depends on the host byte order.

use pgrelay_core::{ProtocolError, Result};

/// Read a signed byte at `offset`.
#[inline]
pub fn read_byte(buf: &[u8], offset: usize) -> i8 {
    buf[offset] as i8
}

/// Read a big-endian `i16` at `offset`.
#[inline]
pub fn read_int16(buf: &[u8], offset: usize) -> i16 {
    let b = &buf[offset..offset + 2];
    ((u16::from(b[0]) << 8) | u16::from(b[1])) as i16
}

/// Read a big-endian `i32` at `offset`.
#[inline]
pub fn read_int32(buf: &[u8], offset: usize) -> i32 {
    let b = &buf[offset..offset + 4];
    ((u32::from(b[0]) << 24)
        | (u32::from(b[1]) << 16)
        | (u32::from(b[2]) << 8)
        | u32::from(b[3])) as i32
}

/// Read a big-endian `i64` at `offset`.
#[inline]
pub fn read_long(buf: &[u8], offset: usize) -> i64 {
    buf[offset..offset + 8]
        .iter()
        .fold(0_u64, |acc, &b| (acc << 8) | u64::from(b)) as i64
}

/// Bytes from `offset` up to (not including) the first NUL.
///
/// Runs to the end of the buffer when there is no NUL.
#[inline]
pub fn read_string(buf: &[u8], offset: usize) -> &[u8] {
    let rest = &buf[offset..];
    let end = rest.iter().position(|&b| b == 0).unwrap_or(rest.len());
    &rest[..end]
}

/// Store a signed byte at `offset`.
#[inline]
pub fn write_byte(buf: &mut [u8], offset: usize, value: i8) {
    buf[offset] = value as u8;
}

/// Store `value` big-endian at `offset`.
#[inline]
pub fn write_int16(buf: &mut [u8], offset: usize, value: i16) {
    let v = value as u16;
    buf[offset] = (v >> 8) as u8;
    buf[offset + 1] = (v & 0xff) as u8;
}

/// Store `value` big-endian at `offset`.
#[inline]
pub fn write_int32(buf: &mut [u8], offset: usize, value: i32) {
    let v = value as u32;
    buf[offset] = (v >> 24) as u8;
    buf[offset + 1] = ((v >> 16) & 0xff) as u8;
    buf[offset + 2] = ((v >> 8) & 0xff) as u8;
    buf[offset + 3] = (v & 0xff) as u8;
}

/// Store `value` big-endian at `offset`.
#[inline]
pub fn write_long(buf: &mut [u8], offset: usize, value: i64) {
    let v = value as u64;
    for (i, slot) in buf[offset..offset + 8].iter_mut().enumerate() {
        *slot = ((v >> (56 - 8 * i)) & 0xff) as u8;
    }
}

/// Copy the raw bytes of `s` to `offset`. No terminator is written.
#[inline]
pub fn write_string(buf: &mut [u8], offset: usize, s: &str) {
    buf[offset..offset + s.len()].copy_from_slice(s.as_bytes());
}

/// Probe the host byte order at runtime.
pub fn host_is_bigendian() -> bool {
    let word: u16 = 0x0001;
    word.to_ne_bytes()[0] == 0
}

/// Reverse the byte order of a 32-bit word.
#[inline]
pub fn byte_swap_u32(value: u32) -> u32 {
    ((value << 24) & 0xff00_0000)
        | ((value << 8) & 0x00ff_0000)
        | ((value >> 8) & 0x0000_ff00)
        | ((value >> 24) & 0x0000_00ff)
}

/// Bounds-checked reader over a borrowed message window.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8> {
        if self.remaining() < 1 {
            return Err(ProtocolError::UnexpectedEof);
        }
        let b = read_byte(self.buf, self.pos) as u8;
        self.pos += 1;
        Ok(b)
    }

    /// Borrow the next NUL-terminated token, consuming the terminator.
    pub(crate) fn read_cstr(&mut self) -> Result<&'a [u8]> {
        let rest = &self.buf[self.pos..];
        let token = read_string(rest, 0);
        if token.len() == rest.len() {
            return Err(ProtocolError::MissingTerminator);
        }
        self.pos += token.len() + 1;
        Ok(token)
    }

    pub(crate) fn read_cstring(&mut self) -> Result<String> {
        let bytes = self.read_cstr()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }
}
