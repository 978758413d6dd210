//! Proof-of-stake block selection - registry, aggregation, lottery, broadcast
//!
//! Architecture:
//! - Sessions register stakes in the `ValidatorRegistry` and feed candidate
//!   blocks through a `CandidateSender` into the round pool
//! - The `Lottery` ticks on a fixed period, drains the round, weights each
//!   proposer by stake and draws one winner uniformly from the weighted pool
//! - The winning block is appended to the `SharedChain` (the lottery is the
//!   only writer) and one announcement per registered validator is queued on
//!   the `Announcer` distribution queue

pub mod announce;
pub mod chain_store;
pub mod lottery;
pub mod pool;
pub mod registry;
pub mod types;

pub use announce::{AnnouncementReceiver, Announcer};
pub use chain_store::SharedChain;
pub use lottery::{Lottery, LotteryBuilder, RoundOutcome};
pub use pool::{spawn_aggregator, CandidatePool, CandidateSender, SubmitError};
pub use registry::{ValidatorId, ValidatorRegistry};
pub use types::{EngineStats, LotteryConfig};
