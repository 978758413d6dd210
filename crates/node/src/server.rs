//! TCP server - accepts validator connections and wires the engine tasks

use crate::config::NodeConfig;
use crate::session::{handle_conn, SessionContext};
use anyhow::Result;
use pos_consensus::{
    spawn_aggregator, Announcer, CandidatePool, EngineStats, Lottery, LotteryBuilder, SharedChain,
    ValidatorRegistry,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// One running node: shared engine state plus the listener.
pub struct Node {
    registry: Arc<ValidatorRegistry>,
    pool: Arc<CandidatePool>,
    chain: Arc<SharedChain>,
    announcer: Arc<Announcer>,
    lottery: Arc<Lottery>,
    config: NodeConfig,
}

impl Node {
    /// Wire up the engine around a fresh genesis chain.
    pub fn new(config: NodeConfig) -> Self {
        let registry = Arc::new(ValidatorRegistry::new());
        let pool = Arc::new(CandidatePool::new());
        let chain = Arc::new(SharedChain::with_genesis());
        let announcer = Arc::new(Announcer::new());
        let lottery = Arc::new(
            LotteryBuilder::new(
                registry.clone(),
                pool.clone(),
                chain.clone(),
                announcer.clone(),
            )
            .round_interval_secs(config.round_interval_secs)
            .build(),
        );
        Self {
            registry,
            pool,
            chain,
            announcer,
            lottery,
            config,
        }
    }

    /// Spawn the aggregator and lottery tasks, bind the listener and start
    /// accepting sessions. Returns the bound address.
    pub async fn start(&self) -> Result<SocketAddr> {
        let (candidates, _aggregator) = spawn_aggregator(self.pool.clone());
        tokio::spawn(self.lottery.clone().run());

        let listener = TcpListener::bind(&self.config.listen_addr).await?;
        let addr = listener.local_addr()?;
        tracing::info!(%addr, "TCP server listening");

        let ctx = SessionContext {
            registry: self.registry.clone(),
            chain: self.chain.clone(),
            candidates,
            announcements: self.announcer.receiver(),
            snapshot_interval: self.config.snapshot_interval(),
        };

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, peer)) => {
                        tracing::info!(%peer, "validator connected");
                        tokio::spawn(handle_conn(stream, ctx.clone()));
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "accept error");
                    }
                }
            }
        });

        Ok(addr)
    }

    /// Committed chain handle, read-only for callers.
    pub fn chain(&self) -> Arc<SharedChain> {
        self.chain.clone()
    }

    /// Registry handle.
    pub fn registry(&self) -> Arc<ValidatorRegistry> {
        self.registry.clone()
    }

    /// Engine counters, for periodic and shutdown logging.
    pub fn stats(&self) -> EngineStats {
        self.lottery.stats()
    }
}
