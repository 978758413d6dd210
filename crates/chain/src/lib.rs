//! Pulse chain - block model and hash-link validation
//!
//! Pure building blocks for the proof-of-stake engine:
//! - `Block` with SHA-256 hash links and JSON wire names
//! - `Block::next` to mint a candidate against a known tip
//! - `Block::is_valid_link` to re-verify index/hash continuity
//!
//! Nothing here touches shared state; the consensus crate owns all
//! coordination.

pub mod block;
pub mod hash;

pub use block::Block;
pub use hash::sha256_hex;
