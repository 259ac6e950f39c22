//! Store of overwrite prompts waiting for a click.

use std::collections::HashMap;
use std::time::Duration;

use grab_models::{PendingKey, PendingOverwrite};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{GrabError, Result};

/// Pending overwrites keyed by prompt id, channel, thread and user.
///
/// Entries are taken exactly once. Expired entries are purged whenever a new
/// one is recorded.
#[derive(Debug)]
pub struct PendingStore {
    entries: RwLock<HashMap<PendingKey, PendingOverwrite>>,
    ttl: Duration,
}

impl PendingStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Record `pending`. Other open prompts, even in the same thread, are kept.
    pub async fn insert(&self, pending: PendingOverwrite) {
        let ttl = self.ttl.as_secs();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, p| !p.is_expired(ttl));
        if entries.len() < before {
            debug!(purged = before - entries.len(), "Purged expired confirmations");
        }
        entries.insert(pending.key(), pending);
    }

    /// Remove and return the entry for `key`.
    ///
    /// # Errors
    ///
    /// [`GrabError::NoPendingConfirmation`] when nothing is recorded and
    /// [`GrabError::ConfirmationExpired`] when the entry outlived its TTL.
    pub async fn take(&self, key: &PendingKey) -> Result<PendingOverwrite> {
        let pending = self
            .entries
            .write()
            .await
            .remove(key)
            .ok_or(GrabError::NoPendingConfirmation)?;
        if pending.is_expired(self.ttl.as_secs()) {
            return Err(GrabError::ConfirmationExpired);
        }
        Ok(pending)
    }

    /// Number of recorded entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
