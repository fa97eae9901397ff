//! Content hashing for cache keys.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `text`.
///
/// Identical text always maps to the same key, so rendered artifacts (audio
/// files) can be reused without re-rendering.
#[must_use]
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
