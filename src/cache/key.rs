//! Cache key derivation.

use sha2::{Digest, Sha256};
use std::fmt;

/// Identifier of a cache entry on disk.
///
/// Derived from the raw reference string exactly as the user typed it, so
/// `user/repo` and `https://github.com/user/repo` occupy separate entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hash a reference into its key: the first 128 bits of its SHA-256
    /// digest, hex encoded.
    pub fn for_reference(reference: &str) -> Self {
        let hash = Sha256::digest(reference.as_bytes());
        Self(hex::encode(&hash[..16]))
    }

    /// Wrap an existing key string, e.g. one read back from a file name.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
