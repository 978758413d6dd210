//! Winner announcement distribution queue
//!
//! This is deliberately a distribution queue, not a fan-out broadcast: all
//! sessions share one receiver, so each enqueued message reaches exactly one
//! waiting consumer. The lottery compensates by enqueueing one copy per
//! registered validator, which approximates - without guaranteeing - that
//! every connected session sees the announcement.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Default capacity of the announcement queue.
pub const ANNOUNCE_CHANNEL_CAPACITY: usize = 1024;

/// Producer side of the announcement queue.
pub struct Announcer {
    sender: mpsc::Sender<String>,
    receiver: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl Announcer {
    pub fn new() -> Self {
        Self::with_capacity(ANNOUNCE_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity);
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Queue one message. Returns whether it was accepted; a full queue
    /// drops the message so the lottery never stalls when no session is
    /// draining.
    pub fn enqueue(&self, message: &str) -> bool {
        match self.sender.try_send(message.to_string()) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("announcement queue full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// A handle onto the shared consumer end. Every session holds one;
    /// whichever session is waiting first takes the next message.
    pub fn receiver(&self) -> AnnouncementReceiver {
        AnnouncementReceiver {
            receiver: self.receiver.clone(),
        }
    }
}

impl Default for Announcer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared consumer handle for the announcement queue.
#[derive(Clone)]
pub struct AnnouncementReceiver {
    receiver: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl AnnouncementReceiver {
    /// Wait for the next announcement. `None` once the queue is closed and
    /// drained.
    pub async fn recv(&self) -> Option<String> {
        self.receiver.lock().await.recv().await
    }
}
