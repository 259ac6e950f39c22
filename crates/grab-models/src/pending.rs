//! Pending overwrite records.
//!
//! A pending overwrite is created when the user is asked to confirm a
//! destructive write and is consumed by the first confirm/cancel click.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::publish::{WriteMode, WriteTarget};
use crate::thread::ThreadRef;

/// Default lifetime of a confirmation prompt in seconds (15 minutes).
pub const DEFAULT_CONFIRMATION_TTL_SECS: u64 = 900;

/// Identifies the prompt a click belongs to.
///
/// The prompt id travels in the button value, so a click only ever resolves
/// the prompt it was rendered on, even when the same user has several open
/// in one thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingKey {
    pub prompt_id: String,
    pub channel_id: String,
    pub thread_ts: String,
    pub user_id: String,
}

impl PendingKey {
    /// Creates a new key.
    pub fn new(
        prompt_id: impl Into<String>,
        channel_id: impl Into<String>,
        thread_ts: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            prompt_id: prompt_id.into(),
            channel_id: channel_id.into(),
            thread_ts: thread_ts.into(),
            user_id: user_id.into(),
        }
    }
}

/// A write waiting for the user's confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingOverwrite {
    /// Unique per prompt; sent back as the button value.
    pub id: String,
    pub channel_id: String,
    pub thread_ts: String,
    pub user_id: String,
    pub title: String,
    pub section: Option<String>,
    pub mode: WriteMode,
    /// Message range the transcript was restricted to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(String, String)>,
    pub created_at: u64, // Unix timestamp
}

impl PendingOverwrite {
    /// Records a pending write for the given thread and user, stamped now.
    pub fn new(thread: &ThreadRef, user_id: impl Into<String>, target: WriteTarget) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            channel_id: thread.channel_id.clone(),
            thread_ts: thread.thread_ts.clone(),
            user_id: user_id.into(),
            title: target.title,
            section: target.section,
            mode: target.mode,
            range: None,
            created_at: now_secs(),
        }
    }

    /// Restricts the re-derived transcript to the given message range.
    pub fn with_range(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.range = Some((start.into(), end.into()));
        self
    }

    /// Key under which this entry is stored.
    pub fn key(&self) -> PendingKey {
        PendingKey::new(&self.id, &self.channel_id, &self.thread_ts, &self.user_id)
    }

    /// Thread the write will be re-derived from.
    pub fn thread(&self) -> ThreadRef {
        ThreadRef::new(&self.channel_id, &self.thread_ts)
    }

    /// The write to perform once confirmed.
    pub fn target(&self) -> WriteTarget {
        WriteTarget {
            title: self.title.clone(),
            section: self.section.clone(),
            mode: self.mode,
        }
    }

    /// Check if this entry is older than `ttl_secs`.
    pub fn is_expired(&self, ttl_secs: u64) -> bool {
        self.is_expired_at(now_secs(), ttl_secs)
    }

    /// Check expiry against an explicit clock reading.
    pub fn is_expired_at(&self, now: u64, ttl_secs: u64) -> bool {
        now.saturating_sub(self.created_at) > ttl_secs
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PendingOverwrite {
        PendingOverwrite::new(
            &ThreadRef::new("C1", "1700000000.000100"),
            "U1",
            WriteTarget::page("hi"),
        )
    }

    #[test]
    fn test_pending_key_and_target() {
        let p = pending();
        assert_eq!(p.key(), PendingKey::new(&p.id, "C1", "1700000000.000100", "U1"));
        assert_eq!(p.target(), WriteTarget::page("hi"));
        assert_eq!(p.thread(), ThreadRef::new("C1", "1700000000.000100"));
    }

    #[test]
    fn test_prompt_ids_are_unique() {
        let a = pending();
        let b = pending();
        assert_ne!(a.id, b.id);
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_pending_expiry() {
        let mut p = pending();
        assert!(!p.is_expired(DEFAULT_CONFIRMATION_TTL_SECS));

        // 16 minutes ago
        p.created_at -= 960;
        assert!(p.is_expired(DEFAULT_CONFIRMATION_TTL_SECS));
        assert!(!p.is_expired_at(p.created_at + 10, DEFAULT_CONFIRMATION_TTL_SECS));
    }

    #[test]
    fn test_pending_range_survives_serialization() {
        let p = pending().with_range("1.000001", "1.000009");
        let json = serde_json::to_string(&p).unwrap();
        let back: PendingOverwrite = serde_json::from_str(&json).unwrap();
        assert_eq!(back.range, Some(("1.000001".to_string(), "1.000009".to_string())));

        let plain = serde_json::to_value(pending()).unwrap();
        assert!(plain.get("range").is_none());
    }
}
