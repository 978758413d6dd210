//! Node configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// TCP listen address for validator sessions
    pub listen_addr: String,
    /// Seconds between lottery rounds
    pub round_interval_secs: u64,
    /// Seconds between chain-snapshot pushes to each peer
    pub snapshot_interval_secs: u64,
}

impl NodeConfig {
    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:9000".to_string(),
            round_interval_secs: 30,
            snapshot_interval_secs: 30,
        }
    }
}
