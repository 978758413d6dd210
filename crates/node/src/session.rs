//! Per-connection validator session
//!
//! In order: read a stake and register, then loop reading BPM payloads into
//! candidate blocks. Two side tasks per session push the periodic chain
//! snapshot and this session's share of winner announcements to the peer.
//! All writes funnel through one outbound channel so the peer sees whole
//! lines.

use pos_consensus::{
    AnnouncementReceiver, CandidateSender, SharedChain, ValidatorId, ValidatorRegistry,
};
use pulse_chain::Block;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;

/// Everything a session needs from the engine.
#[derive(Clone)]
pub struct SessionContext {
    pub registry: Arc<ValidatorRegistry>,
    pub chain: Arc<SharedChain>,
    pub candidates: CandidateSender,
    pub announcements: AnnouncementReceiver,
    pub snapshot_interval: Duration,
}

/// Drive one validator connection to completion.
pub async fn handle_conn(stream: TcpStream, ctx: SessionContext) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    // Single writer task; prompts, snapshots and announcements all go
    // through this channel.
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);
    let writer = tokio::spawn(async move {
        while let Some(message) = out_rx.recv().await {
            if write_half.write_all(message.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    // Forward this session's share of winner announcements.
    let announce_out = out_tx.clone();
    let announcements = ctx.announcements.clone();
    let announce_task = tokio::spawn(async move {
        while let Some(message) = announcements.recv().await {
            if announce_out.send(format!("\n{message}\n")).await.is_err() {
                break;
            }
        }
    });

    // Ship the full chain snapshot on a fixed period.
    let snapshot_out = out_tx.clone();
    let snapshot_chain = ctx.chain.clone();
    let snapshot_interval = ctx.snapshot_interval;
    let snapshot_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(snapshot_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match snapshot_chain.snapshot_json() {
                Ok(json) => {
                    if snapshot_out.send(format!("{json}\n")).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!(error = %e, "chain snapshot encode failed"),
            }
        }
    });

    if let Some(id) = register(&mut lines, &out_tx, &ctx).await {
        proposal_loop(&mut lines, &out_tx, &ctx, &id).await;
    }

    announce_task.abort();
    snapshot_task.abort();
    drop(out_tx);
    let _ = writer.await;
    tracing::info!(%peer, "session closed");
}

/// Read the stake line and register. `None` ends the session before the
/// validator ever existed.
async fn register(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    out_tx: &mpsc::Sender<String>,
    ctx: &SessionContext,
) -> Option<ValidatorId> {
    let _ = out_tx.send("Enter token balance:".to_string()).await;

    match lines.next_line().await {
        Ok(Some(line)) => match line.trim().parse::<u64>() {
            Ok(stake) => Some(ctx.registry.register(stake)),
            Err(_) => {
                tracing::warn!(input = %line.trim(), "stake is not a number, dropping session");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!(error = %e, "read error before registration");
            None
        }
    }
}

/// Read BPM payloads until EOF or malformed input. Malformed input
/// deregisters the validator and ends the session; an invalid chain link is
/// silently dropped and the loop continues.
async fn proposal_loop(
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    out_tx: &mpsc::Sender<String>,
    ctx: &SessionContext,
    id: &str,
) {
    let _ = out_tx.send("\nEnter a new BPM:".to_string()).await;

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "read error, closing session");
                break;
            }
        };

        let bpm = match line.trim().parse::<i64>() {
            Ok(bpm) => bpm,
            Err(_) => {
                tracing::warn!(
                    input = %line.trim(),
                    validator = %short(id),
                    "malformed BPM, deregistering validator"
                );
                ctx.registry.remove(id);
                break;
            }
        };

        let tip = ctx.chain.tip();
        let block = Block::next(&tip, bpm, id);
        if block.is_valid_link(&tip) {
            if ctx.candidates.submit(block).await.is_err() {
                tracing::warn!("candidate channel closed, ending session");
                break;
            }
        }

        let _ = out_tx.send("\nEnter a new BPM:".to_string()).await;
    }
}

fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}
