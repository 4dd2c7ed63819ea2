//! # SHA-1 Signatures
//!
//! The platform signs webhook calls with `sha1(sort(parts).join(""))`,
//! rendered as lowercase hex.

use sha1::{Digest, Sha1};

/// SHA-1 of `data` as lowercase hex.
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}

/// Sort `parts` lexicographically, concatenate and hash.
///
/// The result does not depend on the order of `parts`.
pub fn sorted_digest(parts: &[&str]) -> String {
    let mut sorted = parts.to_vec();
    sorted.sort_unstable();

    let mut hasher = Sha1::new();
    for part in sorted {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}
