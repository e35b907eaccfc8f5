//! Canonical byte/text encodings.
//!
//! Every other component goes through these helpers so that base64, hex and
//! UTF-8 handling is identical everywhere. All functions are pure.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest, Sha256};

use crate::error::DecodeError;

/// Letter case for hex output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HexCase {
    #[default]
    Lower,
    Upper,
}

/// Encode bytes as standard, padded base64.
pub fn base64_encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard, padded base64.
///
/// Non-canonical padding and characters outside the alphabet are rejected.
pub fn base64_decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    STANDARD
        .decode(text)
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))
}

/// Encode bytes as hex in the requested case.
pub fn hex_encode(bytes: &[u8], case: HexCase) -> String {
    match case {
        HexCase::Lower => hex::encode(bytes),
        HexCase::Upper => hex::encode_upper(bytes),
    }
}

/// Decode hex of either case, with or without a `0x` prefix.
pub fn hex_decode(text: &str) -> Result<Vec<u8>, DecodeError> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(digits).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

/// Encode a string as UTF-8 bytes.
pub fn utf8_encode(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Decode UTF-8 bytes, rejecting invalid sequences.
pub fn utf8_decode(bytes: &[u8]) -> Result<String, DecodeError> {
    String::from_utf8(bytes.to_vec()).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

/// Big-endian encoding of a 16-bit integer.
pub const fn u16_be(value: u16) -> [u8; 2] {
    value.to_be_bytes()
}

/// Read a big-endian 16-bit integer from the first two bytes.
pub fn read_u16_be(bytes: &[u8]) -> Result<u16, DecodeError> {
    let head: [u8; 2] = decode_fixed(bytes.get(..2).unwrap_or(bytes))?;
    Ok(u16::from_be_bytes(head))
}

/// Concatenate byte sequences in order.
pub fn concat(parts: &[&[u8]]) -> Vec<u8> {
    let total = parts.iter().map(|p| p.len()).sum();
    let mut out = Vec::with_capacity(total);
    for part in parts {
        out.extend_from_slice(part);
    }
    out
}

/// Lowercase hex of the SHA-256 digest of `bytes`.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Convert a slice into a fixed-size array, failing on any other length.
pub fn decode_fixed<const N: usize>(bytes: &[u8]) -> Result<[u8; N], DecodeError> {
    bytes.try_into().map_err(|_| DecodeError::InvalidLength {
        expected: N,
        actual: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base64_known_answer() {
        assert_eq!(base64_encode(b"hello"), "aGVsbG8=");
        assert_eq!(base64_decode("aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn test_base64_rejects_malformed() {
        // Truncated padding
        assert!(base64_decode("aGVsbG8").is_err());
        // Wrong alphabet
        assert!(base64_decode("aGVs*G8=").is_err());
        // URL-safe characters are not part of the standard alphabet
        assert!(base64_decode("_-__").is_err());
    }

    #[test]
    fn test_hex_case_and_prefix() {
        assert_eq!(hex_encode(&[0xab, 0x01], HexCase::Lower), "ab01");
        assert_eq!(hex_encode(&[0xab, 0x01], HexCase::Upper), "AB01");
        assert_eq!(hex_decode("0xAB01").unwrap(), vec![0xab, 0x01]);
        assert_eq!(hex_decode("ab01").unwrap(), vec![0xab, 0x01]);
    }

    #[test]
    fn test_hex_rejects_malformed() {
        assert!(matches!(hex_decode("abc"), Err(DecodeError::InvalidHex(_))));
        assert!(matches!(hex_decode("zz"), Err(DecodeError::InvalidHex(_))));
    }

    #[test]
    fn test_utf8() {
        assert_eq!(utf8_encode("héllo"), "héllo".as_bytes());
        assert_eq!(utf8_decode("héllo".as_bytes()).unwrap(), "héllo");
        assert!(utf8_decode(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_u16_be() {
        assert_eq!(u16_be(0x0102), [0x01, 0x02]);
        assert_eq!(read_u16_be(&[0x01, 0x02, 0x03]).unwrap(), 0x0102);
        assert_eq!(
            read_u16_be(&[0x01]),
            Err(DecodeError::InvalidLength {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_concat() {
        assert_eq!(concat(&[&b"ab"[..], &b""[..], &b"cd"[..]]), b"abcd");
        assert!(concat(&[]).is_empty());
    }

    #[test]
    fn test_content_hash_known_answers() {
        assert_eq!(
            content_hash(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            content_hash(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_decode_fixed() {
        let arr: [u8; 3] = decode_fixed(&[1, 2, 3]).unwrap();
        assert_eq!(arr, [1, 2, 3]);
        assert!(decode_fixed::<4>(&[1, 2, 3]).is_err());
    }

    proptest! {
        #[test]
        fn prop_base64_decode_inverts_encode(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(base64_decode(&base64_encode(&bytes)).unwrap(), bytes);
        }

        #[test]
        fn prop_hex_decode_accepts_either_case(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
            let lower = hex_decode(&hex_encode(&bytes, HexCase::Lower)).unwrap();
            let upper = hex_decode(&hex_encode(&bytes, HexCase::Upper)).unwrap();
            prop_assert_eq!(&lower, &bytes);
            prop_assert_eq!(&upper, &bytes);
        }
    }
}
