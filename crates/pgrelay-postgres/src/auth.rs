//! Base64 transcoding for authentication exchanges.
//!
//! SCRAM messages and stored credentials carry nonces, salts and proofs as base64
//! text. The encoder uses the standard alphabet with padding and never emits line
//! breaks. The decoder accepts padded and unpadded input.

use std::io::Read;

use base64::Engine;
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::read::DecoderReader;
use pgrelay_core::{ProtocolError, Result};

/// Standard alphabet, lenient about trailing `=` padding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode raw bytes as base64 text.
pub fn base64_encode(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Decode base64 text into raw bytes.
///
/// The returned vector holds exactly the decoded bytes; its capacity may be
/// larger.
pub fn base64_decode(encoded: impl AsRef<[u8]>) -> Result<Vec<u8>> {
    let encoded = encoded.as_ref();
    let mut decoded = Vec::with_capacity(decoded_capacity(encoded.len()));
    let mut reader = DecoderReader::new(encoded, &LENIENT);
    reader
        .read_to_end(&mut decoded)
        .map_err(|err| match err.into_inner() {
            Some(inner) => match inner.downcast::<base64::DecodeError>() {
                Ok(decode) => ProtocolError::InvalidBase64(*decode),
                Err(_) => ProtocolError::InvalidField("base64 stream"),
            },
            None => ProtocolError::InvalidField("base64 stream"),
        })?;
    Ok(decoded)
}

/// Working buffer size for decoding `len` characters of base64.
fn decoded_capacity(len: usize) -> usize {
    len.saturating_mul(3).div_ceil(4) + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_vectors() {
        assert_eq!(base64_encode(b""), "");
        assert_eq!(base64_encode(b"f"), "Zg==");
        assert_eq!(base64_encode(b"fo"), "Zm8=");
        assert_eq!(base64_encode(b"foo"), "Zm9v");
        assert_eq!(base64_encode(b"foobar"), "Zm9vYmFy");
    }

    #[test]
    fn test_encode_has_no_line_breaks() {
        let encoded = base64_encode(&[0xab; 300]);
        assert!(!encoded.contains('\n'));
        assert!(!encoded.contains('\r'));
    }

    #[test]
    fn test_decode_known_vectors() {
        assert_eq!(base64_decode(b"").unwrap(), b"");
        assert_eq!(base64_decode(b"Zg==").unwrap(), b"f");
        assert_eq!(base64_decode(b"Zm8=").unwrap(), b"fo");
        assert_eq!(base64_decode(b"Zm9vYmFy").unwrap(), b"foobar");
    }

    #[test]
    fn test_decode_accepts_missing_padding() {
        assert_eq!(base64_decode(b"Zg").unwrap(), b"f");
        assert_eq!(base64_decode(b"Zm8").unwrap(), b"fo");
    }

    #[test]
    fn test_decode_reports_exact_length() {
        let decoded = base64_decode(b"Zg==").unwrap();
        assert_eq!(decoded.len(), 1);
        assert!(decoded.capacity() >= 4);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = base64_decode("Zm9v!!!!").unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_scram_nonce_roundtrip() {
        let nonce = b"rOprNGfwEbeRWgbNEkqO";
        let encoded = base64_encode(nonce);
        assert_eq!(base64_decode(&encoded).unwrap(), nonce);
    }
}
