//! pos-node - proof-of-stake block-selection node
//!
//! Accepts validator sessions over TCP, collects candidate blocks per round
//! and runs a stake-weighted lottery on a fixed period to extend the chain.

use anyhow::Result;
use clap::Parser;
use pos_node::{Node, NodeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Proof-of-stake lottery node
#[derive(Parser, Debug)]
#[command(name = "pos-node")]
#[command(about = "Stake-weighted block selection over TCP validator sessions", long_about = None)]
struct Args {
    /// TCP listen address for validator sessions
    #[arg(long, default_value = "127.0.0.1:9000")]
    listen: String,

    /// Seconds between lottery rounds
    #[arg(long, default_value = "30")]
    round_interval_secs: u64,

    /// Seconds between chain-snapshot pushes to each peer
    #[arg(long, default_value = "30")]
    snapshot_interval_secs: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting proof-of-stake lottery node");
    tracing::info!("  Listen address: {}", args.listen);
    tracing::info!("  Round interval: {}s", args.round_interval_secs);
    tracing::info!("  Snapshot interval: {}s", args.snapshot_interval_secs);

    let config = NodeConfig {
        listen_addr: args.listen,
        round_interval_secs: args.round_interval_secs,
        snapshot_interval_secs: args.snapshot_interval_secs,
    };

    let node = Node::new(config);
    node.start().await?;

    tracing::info!("Node running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    let stats = node.stats();
    tracing::info!(
        rounds = stats.rounds_run,
        committed = stats.blocks_committed,
        empty = stats.empty_rounds,
        height = node.chain().len(),
        "shutting down"
    );

    Ok(())
}
