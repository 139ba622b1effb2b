//! # StrKey
//!
//! Checksummed base-32 text form of keys and hashes, e.g. `GAAZI4TC...`.
//!
//! ## Layout
//! ```text
//! base32_nopad( version(1) ‖ payload ‖ crc16_le(version ‖ payload) )
//! ```
//!
//! The version byte selects the leading character: `G` account ids, `M` muxed
//! accounts, `S` seeds, `T` pre-auth transactions, `X` sha256 hashes and `P`
//! signed payloads. Decoding accepts only the canonical text, so a given payload
//! has exactly one valid string.

use crate::utils::checksum::crc16;
use data_encoding::BASE32_NOPAD;
use thiserror::Error;

/// Key algorithm bits in the low three bits of the version byte.
pub const STRKEY_ALG_ED25519: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StrKeyVersion {
    PublicKey = 6 << 3 | STRKEY_ALG_ED25519,
    Muxed = 12 << 3 | STRKEY_ALG_ED25519,
    PrivateKey = 18 << 3 | STRKEY_ALG_ED25519,
    PreAuthTx = 19 << 3 | STRKEY_ALG_ED25519,
    HashX = 23 << 3 | STRKEY_ALG_ED25519,
    SignedPayload = 15 << 3 | STRKEY_ALG_ED25519,
}

impl StrKeyVersion {
    pub const ALL: [StrKeyVersion; 6] = [
        StrKeyVersion::PublicKey,
        StrKeyVersion::Muxed,
        StrKeyVersion::PrivateKey,
        StrKeyVersion::PreAuthTx,
        StrKeyVersion::HashX,
        StrKeyVersion::SignedPayload,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.byte() == byte)
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Expected payload length; `None` for variable-length payloads.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            StrKeyVersion::Muxed => Some(40),
            StrKeyVersion::SignedPayload => None,
            _ => Some(32),
        }
    }

    pub fn prefix(self) -> char {
        match self {
            StrKeyVersion::PublicKey => 'G',
            StrKeyVersion::Muxed => 'M',
            StrKeyVersion::PrivateKey => 'S',
            StrKeyVersion::PreAuthTx => 'T',
            StrKeyVersion::HashX => 'X',
            StrKeyVersion::SignedPayload => 'P',
        }
    }
}

/// Why a string is not a valid strkey. Callers treat every variant the same way;
/// the distinction only feeds diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StrKeyError {
    #[error("impossible base32 length {0}")]
    BadLength(usize),

    #[error("invalid base32 text")]
    BadEncoding,

    #[error("too short to hold a version byte and checksum")]
    TooShort,

    #[error("unknown version byte 0x{0:02x}")]
    UnknownVersion(u8),

    #[error("payload length {actual}, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("non-canonical encoding")]
    NonCanonical,

    #[error("unexpected key type {0:?}")]
    WrongType(StrKeyVersion),
}

/// A decoded strkey.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StrKey {
    pub version: StrKeyVersion,
    pub payload: Vec<u8>,
}

impl StrKey {
    pub fn new(version: StrKeyVersion, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            version,
            payload: payload.into(),
        }
    }

    pub fn encode(&self) -> String {
        encode(self.version, &self.payload)
    }

    /// Payload as a 32-byte key, failing for any other version.
    pub fn key32(&self, version: StrKeyVersion) -> Result<[u8; 32], StrKeyError> {
        if self.version != version {
            return Err(StrKeyError::WrongType(self.version));
        }
        self.payload
            .as_slice()
            .try_into()
            .map_err(|_| StrKeyError::LengthMismatch {
                expected: 32,
                actual: self.payload.len(),
            })
    }
}

/// Render `payload` under `version`.
pub fn encode(version: StrKeyVersion, payload: &[u8]) -> String {
    let mut raw = Vec::with_capacity(payload.len() + 3);
    raw.push(version.byte());
    raw.extend_from_slice(payload);
    let sum = crc16(&raw);
    raw.extend_from_slice(&sum.to_le_bytes());
    BASE32_NOPAD.encode(&raw)
}

/// Parse and fully validate a strkey.
pub fn decode(text: &str) -> Result<StrKey, StrKeyError> {
    let input = text.as_bytes();
    // no base32 group ends after 1, 3 or 6 characters
    if matches!(input.len() % 8, 1 | 3 | 6) {
        return Err(StrKeyError::BadLength(input.len()));
    }
    let raw = BASE32_NOPAD
        .decode(input)
        .map_err(|_| StrKeyError::BadEncoding)?;
    if raw.len() < 3 {
        return Err(StrKeyError::TooShort);
    }

    let version = StrKeyVersion::from_byte(raw[0]).ok_or(StrKeyError::UnknownVersion(raw[0]))?;
    let payload_len = raw.len() - 3;
    if let Some(expected) = version.payload_len() {
        if expected != payload_len {
            return Err(StrKeyError::LengthMismatch {
                expected,
                actual: payload_len,
            });
        }
    }

    let (body, sum) = raw.split_at(raw.len() - 2);
    if u16::from_le_bytes([sum[0], sum[1]]) != crc16(body) {
        return Err(StrKeyError::BadChecksum);
    }

    // unused low bits in the final character must be zero
    if raw.len() % 5 != 0 {
        let canonical = BASE32_NOPAD.encode(&raw);
        if canonical.as_bytes().last() != input.last() {
            return Err(StrKeyError::NonCanonical);
        }
    }

    Ok(StrKey::new(version, &body[1..]))
}

/// True for characters of the strkey alphabet.
pub fn is_strkey_char(c: char) -> bool {
    c.is_ascii_uppercase() || ('2'..='7').contains(&c)
}

/// Last four bytes of a key, identifying which signer produced a signature.
///
/// For signed payloads the trailing (up to) four payload bytes are XORed into
/// the hint starting at its first byte.
pub fn signature_hint(key: &[u8; 32], payload: &[u8]) -> [u8; 4] {
    let mut hint = [key[28], key[29], key[30], key[31]];
    let tail = &payload[payload.len().saturating_sub(4)..];
    for (h, b) in hint.iter_mut().zip(tail) {
        *h ^= b;
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "GA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJVSGZ";
    const MUXED: &str =
        "MA7QYNF7SOWQ3GLR2BGMZEHXAVIRZA4KVWLTJJFC7MGXUA74P7UJUAAAAAAAAAAAACJUQ";

    #[test]
    fn test_account_roundtrip() {
        let key = decode(ACCOUNT).unwrap();
        assert_eq!(key.version, StrKeyVersion::PublicKey);
        assert_eq!(key.payload.len(), 32);
        assert_eq!(key.encode(), ACCOUNT);
    }

    #[test]
    fn test_muxed_payload() {
        let key = decode(MUXED).unwrap();
        assert_eq!(key.version, StrKeyVersion::Muxed);
        assert_eq!(key.payload.len(), 40);
        assert_eq!(&key.payload[..32], &decode(ACCOUNT).unwrap().payload[..]);
        assert_eq!(&key.payload[32..], &[0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(key.encode(), MUXED);
    }

    #[test]
    fn test_prefix_matches_version() {
        for version in StrKeyVersion::ALL {
            let len = version.payload_len().unwrap_or(40);
            let text = encode(version, &vec![0x5a; len]);
            assert!(text.starts_with(version.prefix()), "{version:?} -> {text}");
            assert_eq!(decode(&text).unwrap().version, version);
        }
    }

    #[test]
    fn test_rejects_checksum() {
        let mut text = ACCOUNT.to_string();
        text.replace_range(10..11, if &text[10..11] == "A" { "B" } else { "A" });
        assert!(decode(&text).is_err());
    }

    #[test]
    fn test_rejects_impossible_length() {
        assert_eq!(decode("GAB"), Err(StrKeyError::BadLength(3)));
        assert_eq!(decode(&ACCOUNT[..54]), Err(StrKeyError::BadLength(54)));
    }

    #[test]
    fn test_rejects_lowercase_and_short() {
        assert_eq!(
            decode(&ACCOUNT.to_lowercase()),
            Err(StrKeyError::BadEncoding)
        );
        assert!(decode("").is_err());
    }

    #[test]
    fn test_rejects_length_mismatch() {
        let text = encode(StrKeyVersion::PublicKey, &[1u8; 31]);
        assert!(matches!(
            decode(&text),
            Err(StrKeyError::LengthMismatch { expected: 32, actual: 31 })
        ));
    }

    #[test]
    fn test_rejects_padding_bits() {
        // 43 decoded bytes leave one unused bit in the final character
        let last = MUXED.chars().last().unwrap();
        let alphabet = "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";
        let index = alphabet.find(last).unwrap();
        let flipped = alphabet.as_bytes()[index ^ 1] as char;
        let mut text = MUXED.to_string();
        text.pop();
        text.push(flipped);
        assert!(decode(&text).is_err());
    }

    #[test]
    fn test_is_strkey_char() {
        assert!(ACCOUNT.chars().all(is_strkey_char));
        assert!(!is_strkey_char('a'));
        assert!(!is_strkey_char('1'));
        assert!(!is_strkey_char('8'));
    }

    #[test]
    fn test_signature_hint() {
        let mut key = [0u8; 32];
        key[28..].copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(signature_hint(&key, &[]), [1, 2, 3, 4]);
        assert_eq!(signature_hint(&key, &[0xff]), [0xfe, 2, 3, 4]);
        assert_eq!(
            signature_hint(&key, &[9, 9, 1, 1, 1, 1]),
            [0, 3, 2, 5]
        );
    }
}
