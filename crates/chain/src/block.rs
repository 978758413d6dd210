//! Block structure and hash-link validation

use crate::hash::sha256_hex;
use serde::{Deserialize, Serialize};

/// A single block in the pulse chain.
///
/// Serialized field names match the wire snapshot format consumed by peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Height of this block; genesis is 0
    #[serde(rename = "Index")]
    pub index: u64,
    /// Wall-clock timestamp at minting time (opaque string)
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    /// Domain payload: beats per minute reported by the proposer
    #[serde(rename = "BPM")]
    pub bpm: i64,
    /// SHA-256 hex digest over this block's contents
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Hash of the preceding block; empty for genesis
    #[serde(rename = "PrevHash")]
    pub prev_hash: String,
    /// Identity of the validator that proposed this block
    #[serde(rename = "Validator")]
    pub validator: String,
}

impl Block {
    /// Compute the digest over index, timestamp, payload and previous hash.
    ///
    /// The validator id is not part of the digest, so the same candidate
    /// hashes identically regardless of who proposed it.
    pub fn compute_hash(&self) -> String {
        let record = format!("{}{}{}{}", self.index, self.timestamp, self.bpm, self.prev_hash);
        sha256_hex(&record)
    }

    /// The fixed first block of every chain: index 0, empty previous hash,
    /// zero payload, hash computed over its own fields.
    pub fn genesis() -> Self {
        let mut genesis = Block {
            index: 0,
            timestamp: now_string(),
            bpm: 0,
            hash: String::new(),
            prev_hash: String::new(),
            validator: String::new(),
        };
        genesis.hash = genesis.compute_hash();
        genesis
    }

    /// Mint a candidate block on top of `prev`. Never fails.
    pub fn next(prev: &Block, bpm: i64, validator: &str) -> Self {
        let mut block = Block {
            index: prev.index + 1,
            timestamp: now_string(),
            bpm,
            hash: String::new(),
            prev_hash: prev.hash.clone(),
            validator: validator.to_string(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// True iff this block is a valid successor of `prev`: index continuity,
    /// previous-hash match, and the stored hash survives recomputation.
    pub fn is_valid_link(&self, prev: &Block) -> bool {
        if prev.index + 1 != self.index {
            return false;
        }
        if prev.hash != self.prev_hash {
            return false;
        }
        self.compute_hash() == self.hash
    }
}

fn now_string() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_is_self_consistent() {
        let genesis = Block::genesis();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.bpm, 0);
        assert!(genesis.prev_hash.is_empty());
        assert_eq!(genesis.hash, genesis.compute_hash());
    }

    #[test]
    fn next_links_to_previous() {
        let genesis = Block::genesis();
        let block = Block::next(&genesis, 72, "validator-a");
        assert_eq!(block.index, 1);
        assert_eq!(block.prev_hash, genesis.hash);
        assert_eq!(block.validator, "validator-a");
        assert!(block.is_valid_link(&genesis));
    }

    #[test]
    fn hash_excludes_validator() {
        let genesis = Block::genesis();
        let a = Block::next(&genesis, 72, "validator-a");
        let mut b = a.clone();
        b.validator = "validator-b".to_string();
        assert_eq!(a.compute_hash(), b.compute_hash());
    }

    #[test]
    fn rejects_index_gap() {
        let genesis = Block::genesis();
        let mut block = Block::next(&genesis, 72, "v");
        block.index = 5;
        block.hash = block.compute_hash();
        assert!(!block.is_valid_link(&genesis));
    }

    #[test]
    fn rejects_prev_hash_mismatch() {
        let genesis = Block::genesis();
        let mut block = Block::next(&genesis, 72, "v");
        block.prev_hash = "deadbeef".to_string();
        block.hash = block.compute_hash();
        assert!(!block.is_valid_link(&genesis));
    }

    #[test]
    fn rejects_tampered_payload() {
        let genesis = Block::genesis();
        let mut block = Block::next(&genesis, 72, "v");
        block.bpm = 180;
        assert!(!block.is_valid_link(&genesis));
    }

    #[test]
    fn chain_of_three_holds_invariant() {
        let genesis = Block::genesis();
        let one = Block::next(&genesis, 60, "a");
        let two = Block::next(&one, 85, "b");
        let chain = [genesis, one, two];
        for pair in chain.windows(2) {
            assert!(pair[1].is_valid_link(&pair[0]));
            assert_eq!(pair[1].index, pair[0].index + 1);
        }
    }

    #[test]
    fn json_uses_wire_field_names() {
        let genesis = Block::genesis();
        let json = serde_json::to_value(&genesis).unwrap();
        for key in ["Index", "Timestamp", "BPM", "Hash", "PrevHash", "Validator"] {
            assert!(json.get(key).is_some(), "missing field {key}");
        }
        let back: Block = serde_json::from_value(json).unwrap();
        assert_eq!(back, genesis);
    }
}
