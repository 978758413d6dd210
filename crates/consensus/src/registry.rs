//! Validator registry - identity minting and staked balances

use parking_lot::RwLock;
use pulse_chain::sha256_hex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque validator identity, a SHA-256 hex digest of a per-registration
/// nonce. Probabilistically unique; collisions are not checked.
pub type ValidatorId = String;

/// Sequence number mixed into the nonce so registrations landing on the
/// same clock tick still mint distinct identities.
static REGISTRATION_SEQ: AtomicU64 = AtomicU64::new(0);

/// Registered validators and their staked balances.
///
/// Sessions create entries on registration and delete them when a proposal
/// stream turns malformed. The lottery only reads.
#[derive(Debug, Default)]
pub struct ValidatorRegistry {
    validators: RwLock<HashMap<ValidatorId, u64>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh identity for `stake` and store it.
    pub fn register(&self, stake: u64) -> ValidatorId {
        let seq = REGISTRATION_SEQ.fetch_add(1, Ordering::Relaxed);
        let nonce = format!("{}/{}", chrono::Utc::now().to_rfc3339(), seq);
        let id = sha256_hex(&nonce);
        self.validators.write().insert(id.clone(), stake);
        tracing::info!(validator = %short(&id), stake, "validator registered");
        id
    }

    /// Delete a validator. Idempotent if the id is absent.
    pub fn remove(&self, id: &str) {
        if self.validators.write().remove(id).is_some() {
            tracing::info!(validator = %short(id), "validator removed");
        }
    }

    /// Current stake for `id`, or `None` if removed or never registered.
    /// Callers treat `None` as zero weight.
    pub fn stake_of(&self, id: &str) -> Option<u64> {
        self.validators.read().get(id).copied()
    }

    /// Number of currently registered validators; sizes the announcement
    /// fan-out.
    pub fn len(&self) -> usize {
        self.validators.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.read().is_empty()
    }
}

/// First eight hex chars, enough to tell validators apart in logs.
pub(crate) fn short(id: &str) -> &str {
    &id[..id.len().min(8)]
}
