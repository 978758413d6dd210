//! SHA-256 helpers shared by block hashing and validator identity minting

use sha2::{Digest, Sha256};

/// SHA-256 over a string, rendered as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}
