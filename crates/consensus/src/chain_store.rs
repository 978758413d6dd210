//! Shared chain store - append-only, lottery-written, session-read

use parking_lot::RwLock;
use pulse_chain::Block;

/// The committed chain, seeded with genesis.
///
/// Single-writer discipline: only the lottery appends, one round at a time,
/// which is what makes the commit path safe without re-validating the drawn
/// block against the tail. Every other component takes read snapshots.
#[derive(Debug)]
pub struct SharedChain {
    blocks: RwLock<Vec<Block>>,
}

impl SharedChain {
    /// Build a chain holding only the genesis block.
    pub fn with_genesis() -> Self {
        let genesis = Block::genesis();
        tracing::info!(hash = %crate::registry::short(&genesis.hash), "genesis block created");
        Self {
            blocks: RwLock::new(vec![genesis]),
        }
    }

    /// Clone of the current tail block.
    pub fn tip(&self) -> Block {
        self.blocks
            .read()
            .last()
            .cloned()
            .unwrap_or_else(Block::genesis)
    }

    /// Full ordered copy of the chain.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.read().clone()
    }

    /// JSON rendering of the full chain, shipped periodically to peers.
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&*self.blocks.read())
    }

    /// Append a committed block. Only the lottery calls this.
    pub fn append(&self, block: Block) {
        let mut blocks = self.blocks.write();
        blocks.push(block);
        let tip = blocks.last().map(|b| b.index).unwrap_or_default();
        tracing::info!(height = tip, "block committed");
    }

    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl Default for SharedChain {
    fn default() -> Self {
        Self::with_genesis()
    }
}
