//! Candidate aggregation - round buffer fed by session submissions
//!
//! Sessions hand validated candidates to a bounded channel; a single
//! aggregator task drains it into the locked round buffer. A submission
//! burst suspends the proposer until the aggregator catches up, it never
//! drops a block.

use parking_lot::Mutex;
use pulse_chain::Block;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Capacity of the submission channel between sessions and the aggregator.
pub const SUBMIT_CHANNEL_CAPACITY: usize = 64;

/// Submitting a candidate failed because the engine is shutting down.
#[derive(Debug, thiserror::Error)]
#[error("candidate channel closed")]
pub struct SubmitError;

/// Holding tank for blocks proposed since the last lottery round.
#[derive(Debug, Default)]
pub struct CandidatePool {
    blocks: Mutex<Vec<Block>>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate to the current round.
    pub fn submit(&self, block: Block) {
        self.blocks.lock().push(block);
    }

    /// Atomically take and clear everything accumulated since the previous
    /// drain. The lottery is the only caller.
    pub fn drain_round(&self) -> Vec<Block> {
        std::mem::take(&mut *self.blocks.lock())
    }

    /// Candidates currently buffered for the round in progress.
    pub fn len(&self) -> usize {
        self.blocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.lock().is_empty()
    }
}

/// Handle for submitting candidates into the aggregator.
#[derive(Clone)]
pub struct CandidateSender {
    sender: mpsc::Sender<Block>,
}

impl CandidateSender {
    /// Hand a candidate to the aggregator, suspending under back-pressure.
    pub async fn submit(&self, block: Block) -> Result<(), SubmitError> {
        self.sender.send(block).await.map_err(|_| SubmitError)
    }
}

/// Spawn the aggregator task and return the submission handle alongside it.
///
/// The task ends once every `CandidateSender` clone has been dropped.
pub fn spawn_aggregator(pool: Arc<CandidatePool>) -> (CandidateSender, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::channel::<Block>(SUBMIT_CHANNEL_CAPACITY);

    let handle = tokio::spawn(async move {
        while let Some(block) = receiver.recv().await {
            tracing::debug!(
                index = block.index,
                validator = %crate::registry::short(&block.validator),
                "candidate buffered"
            );
            pool.submit(block);
        }
        tracing::debug!("aggregator stopped, all submitters gone");
    });

    (CandidateSender { sender }, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(validator: &str, bpm: i64) -> Block {
        Block::next(&Block::genesis(), bpm, validator)
    }

    #[test]
    fn drain_returns_everything_in_order() {
        let pool = CandidatePool::new();
        pool.submit(candidate("a", 60));
        pool.submit(candidate("b", 70));
        pool.submit(candidate("a", 80));

        let batch = pool.drain_round();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].validator, "a");
        assert_eq!(batch[1].validator, "b");
        assert_eq!(batch[2].bpm, 80);
    }

    #[test]
    fn drain_clears_the_round() {
        let pool = CandidatePool::new();
        pool.submit(candidate("a", 60));
        assert_eq!(pool.drain_round().len(), 1);
        assert!(pool.is_empty());
        assert!(pool.drain_round().is_empty());
    }

    #[tokio::test]
    async fn aggregator_moves_submissions_into_pool() {
        let pool = Arc::new(CandidatePool::new());
        let (sender, handle) = spawn_aggregator(pool.clone());

        sender.submit(candidate("a", 60)).await.unwrap();
        sender.submit(candidate("b", 72)).await.unwrap();
        drop(sender);
        handle.await.unwrap();

        assert_eq!(pool.len(), 2);
    }

    #[tokio::test]
    async fn submit_fails_after_shutdown() {
        let pool = Arc::new(CandidatePool::new());
        let (sender, handle) = spawn_aggregator(pool);
        handle.abort();
        let _ = handle.await;

        let err = sender.submit(candidate("a", 60)).await;
        assert!(err.is_err());
    }
}
