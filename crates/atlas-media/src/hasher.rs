use atlas_types::hash::CONTENT_HASH_LEN;
use atlas_types::ContentHash;

/// BLAKE3 hasher for processed image bytes, keyed by a domain tag.
///
/// The domain tag is fed to the hasher before the data, so the same bytes
/// hashed for different purposes never share a digest. The 256-bit BLAKE3
/// output is truncated to [`CONTENT_HASH_LEN`] bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Hasher for processed photos and logos.
    pub const IMAGE: Self = Self {
        domain: "atlas-image-v1",
    };

    /// A hasher under another domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Digest of `data` under this domain, truncated to a [`ContentHash`].
    pub fn hash(&self, data: &[u8]) -> ContentHash {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        let full = hasher.finalize();
        let mut digest = [0u8; CONTENT_HASH_LEN];
        digest.copy_from_slice(&full.as_bytes()[..CONTENT_HASH_LEN]);
        ContentHash::from_digest(digest)
    }

    /// Verify that data produces the expected hash.
    pub fn verify(&self, data: &[u8], expected: &ContentHash) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
