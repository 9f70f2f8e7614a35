//! Index digest
//!
//! MD5 over the header block immediately followed by the matched record,
//! byte for byte as read. Stored in sidecars as 32 uppercase hex digits.

use crate::idx::RawIndexBytes;
use md5::{Digest, Md5};
use std::fmt;

/// 128-bit digest of the bytes a sync was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexDigest([u8; 16]);

impl IndexDigest {
    /// Create a digest from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Digest the header and matched record
    pub fn compute(raw: &RawIndexBytes) -> Self {
        let mut hasher = Md5::new();
        hasher.update(raw.header);
        hasher.update(raw.record);
        let result = hasher.finalize();
        let mut bytes = [0u8; 16];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }

    /// Parse a digest from hex (either case)
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 16];
        hex::decode_to_slice(hex, &mut bytes)?;
        Ok(Self(bytes))
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Uppercase hex encoding, as persisted
    pub fn to_hex(&self) -> String {
        hex::encode_upper(self.0)
    }

    /// Whether a stored digest string is exactly this digest
    pub fn matches(&self, stored: &str) -> bool {
        stored == self.to_hex()
    }
}

impl fmt::Display for IndexDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn raw() -> RawIndexBytes {
        RawIndexBytes {
            header: *b"0123456789abcdef",
            record: *b"ghijklmnopqrstuv",
        }
    }

    #[test]
    fn test_digest_covers_header_then_record() {
        let digest = IndexDigest::compute(&raw());
        let mut hasher = Md5::new();
        hasher.update(raw().to_vec());
        let expected = hasher.finalize();
        assert_eq!(digest.as_bytes()[..], expected[..]);
    }

    #[test]
    fn test_empty_input_vector() {
        // Well-known MD5 of the empty string, to pin the hex encoding
        let digest = IndexDigest::from_hex("d41d8cd98f00b204e9800998ecf8427e").expect("hex");
        assert_eq!(digest.to_hex(), "D41D8CD98F00B204E9800998ECF8427E");
        assert_eq!(digest.to_hex().len(), 32);
    }

    #[test]
    fn test_matches_is_exact() {
        let digest = IndexDigest::compute(&raw());
        assert!(digest.matches(&digest.to_hex()));
        assert!(!digest.matches(&digest.to_hex().to_lowercase()));
        assert!(!digest.matches(""));
    }

    #[test]
    fn test_record_change_changes_digest() {
        let mut changed = raw();
        changed.record[15] ^= 1;
        assert_ne!(IndexDigest::compute(&raw()), IndexDigest::compute(&changed));
    }
}
