use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Digest length in bytes (128 bits).
pub const CONTENT_HASH_LEN: usize = 16;

/// Content digest of a fully processed image.
///
/// Identical final bytes always produce the same `ContentHash`, which is what
/// lets photo imports recognise uploads they have already made. Persisted and
/// used in object paths as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; CONTENT_HASH_LEN]);

impl ContentHash {
    /// Wrap a pre-computed digest.
    pub fn from_digest(digest: [u8; CONTENT_HASH_LEN]) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; CONTENT_HASH_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First 8 hex characters, for log lines.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != CONTENT_HASH_LEN {
            return Err(TypeError::InvalidLength {
                expected: CONTENT_HASH_LEN,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; CONTENT_HASH_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short_hex())
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let hash = ContentHash::from_digest([0xab; CONTENT_HASH_LEN]);
        let hex = hash.to_hex();
        assert_eq!(hex.len(), 32);
        assert_eq!(ContentHash::from_hex(&hex).unwrap(), hash);
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        let err = ContentHash::from_hex("abcd").unwrap_err();
        assert_eq!(
            err,
            TypeError::InvalidLength {
                expected: CONTENT_HASH_LEN,
                actual: 2
            }
        );
    }

    #[test]
    fn from_hex_rejects_non_hex() {
        assert!(matches!(
            ContentHash::from_hex("zz"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn serializes_as_hex_string() {
        let hash = ContentHash::from_digest([1; CONTENT_HASH_LEN]);
        let json = serde_json::to_value(hash).unwrap();
        assert_eq!(json, serde_json::Value::String(hash.to_hex()));
        let back: ContentHash = serde_json::from_value(json).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn short_hex_is_prefix() {
        let hash = ContentHash::from_digest([0x12; CONTENT_HASH_LEN]);
        assert!(hash.to_hex().starts_with(&hash.short_hex()));
        assert_eq!(format!("{hash:?}"), "ContentHash(12121212)");
    }
}
