use sha2::{Digest, Sha256};
use xxhash_rust::xxh64::xxh64;

/// Compute the public content hash: SHA-256 of the raw input bytes,
/// rendered as 64 lowercase hex characters. Computed before any
/// transformation of the input.
pub fn content_hash(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Compute the process-local cache key for a file's content. Cheap and
/// never exposed outside the process.
pub fn cache_key(bytes: &[u8]) -> u64 {
    xxh64(bytes, 0)
}
