//! Stake-weighted lottery - one winner per round
//!
//! Every round the lottery drains the candidate pool, builds a weighted
//! multiset where each proposing validator appears once per staked token,
//! draws uniformly from it and commits the winner's block. The draw is
//! uniform over pool entries, so stake equals repetition count equals win
//! probability.

use crate::announce::Announcer;
use crate::chain_store::SharedChain;
use crate::pool::CandidatePool;
use crate::registry::{short, ValidatorId, ValidatorRegistry};
use crate::types::{EngineStats, LotteryConfig};
use parking_lot::Mutex;
use pulse_chain::Block;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Result of a round that committed a block.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub winner: ValidatorId,
    pub committed: Block,
}

/// The periodic leader-election task.
///
/// Sole writer of the chain: rounds run strictly one at a time, so the drawn
/// block is committed against the same tail it was drawn under and no
/// commit-time revalidation is needed.
pub struct Lottery {
    registry: Arc<ValidatorRegistry>,
    pool: Arc<CandidatePool>,
    chain: Arc<SharedChain>,
    announcer: Arc<Announcer>,
    config: LotteryConfig,
    // Process-wide draw source, seeded once at construction.
    rng: Mutex<StdRng>,
    stats: Mutex<EngineStats>,
}

impl Lottery {
    pub fn new(
        registry: Arc<ValidatorRegistry>,
        pool: Arc<CandidatePool>,
        chain: Arc<SharedChain>,
        announcer: Arc<Announcer>,
        config: LotteryConfig,
    ) -> Self {
        Self {
            registry,
            pool,
            chain,
            announcer,
            config,
            rng: Mutex::new(StdRng::from_entropy()),
            stats: Mutex::new(EngineStats::default()),
        }
    }

    /// Run rounds forever on the configured period.
    pub async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.config.round_interval());
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; consume it so the opening
        // round still waits a full period for proposals.
        interval.tick().await;

        tracing::info!(
            interval_secs = self.config.round_interval_secs,
            "lottery started"
        );

        loop {
            interval.tick().await;
            self.run_round();
        }
    }

    /// Execute one round: drain, weight, draw, commit, announce.
    ///
    /// Returns `None` for a no-op round (nothing proposed, or every proposer
    /// carried zero weight).
    pub fn run_round(&self) -> Option<RoundOutcome> {
        self.stats.lock().rounds_run += 1;

        let batch = self.pool.drain_round();
        if batch.is_empty() {
            self.stats.lock().empty_rounds += 1;
            tracing::debug!("round closed with no candidates");
            return None;
        }

        let lottery_pool = self.build_pool(&batch);
        if lottery_pool.is_empty() {
            self.stats.lock().empty_rounds += 1;
            tracing::debug!(
                candidates = batch.len(),
                "round closed, no proposer carried weight"
            );
            return None;
        }

        let winner = {
            let mut rng = self.rng.lock();
            let index = rng.gen_range(0..lottery_pool.len());
            lottery_pool[index].clone()
        };

        // First-seen proposal of the drawn validator is the one committed.
        let committed = batch
            .iter()
            .find(|block| block.validator == winner)?
            .clone();
        self.chain.append(committed.clone());

        let announcement = format!("winning validator: {winner}");
        let fan_out = self.registry.len();
        let mut enqueued = 0u64;
        for _ in 0..fan_out {
            if self.announcer.enqueue(&announcement) {
                enqueued += 1;
            }
        }

        {
            let mut stats = self.stats.lock();
            stats.blocks_committed += 1;
            stats.announcements_enqueued += enqueued;
        }

        tracing::info!(
            winner = %short(&winner),
            height = committed.index,
            pool_size = lottery_pool.len(),
            "round committed"
        );

        Some(RoundOutcome { winner, committed })
    }

    /// Build the weighted pool for a round batch.
    ///
    /// Iterates in submission order; a validator already represented in the
    /// pool is skipped (first-seen wins, later duplicates are discarded,
    /// never summed). Each represented validator is inserted once per staked
    /// token; unknown or zero stakes contribute nothing.
    pub fn build_pool(&self, batch: &[Block]) -> Vec<ValidatorId> {
        let mut lottery_pool: Vec<ValidatorId> = Vec::new();

        for block in batch {
            if lottery_pool.iter().any(|id| *id == block.validator) {
                continue;
            }
            if let Some(stake) = self.registry.stake_of(&block.validator) {
                for _ in 0..stake {
                    lottery_pool.push(block.validator.clone());
                }
            }
        }

        lottery_pool
    }

    /// Snapshot of the engine counters.
    pub fn stats(&self) -> EngineStats {
        self.stats.lock().clone()
    }
}

/// Builder for the lottery task.
pub struct LotteryBuilder {
    registry: Arc<ValidatorRegistry>,
    pool: Arc<CandidatePool>,
    chain: Arc<SharedChain>,
    announcer: Arc<Announcer>,
    config: LotteryConfig,
}

impl LotteryBuilder {
    pub fn new(
        registry: Arc<ValidatorRegistry>,
        pool: Arc<CandidatePool>,
        chain: Arc<SharedChain>,
        announcer: Arc<Announcer>,
    ) -> Self {
        Self {
            registry,
            pool,
            chain,
            announcer,
            config: LotteryConfig::default(),
        }
    }

    pub fn round_interval_secs(mut self, secs: u64) -> Self {
        self.config.round_interval_secs = secs;
        self
    }

    pub fn build(self) -> Lottery {
        Lottery::new(
            self.registry,
            self.pool,
            self.chain,
            self.announcer,
            self.config,
        )
    }
}
