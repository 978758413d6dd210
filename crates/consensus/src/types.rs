//! Shared configuration and stats types for the selection engine

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the lottery round loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryConfig {
    /// Seconds between rounds
    pub round_interval_secs: u64,
}

impl LotteryConfig {
    pub fn round_interval(&self) -> Duration {
        Duration::from_secs(self.round_interval_secs)
    }
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            round_interval_secs: 30,
        }
    }
}

/// Counters describing engine progress, updated by the lottery after every
/// round and read by the node for periodic logging.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStats {
    pub rounds_run: u64,
    pub empty_rounds: u64,
    pub blocks_committed: u64,
    pub announcements_enqueued: u64,
}
