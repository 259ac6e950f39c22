//! Shared state for handling chat events.

use std::sync::Arc;

use crate::config::GrabConfig;
use crate::gateway::{ChatGateway, Notice, WikiBackend};
use crate::identity::BotIdentity;
use crate::locks::TitleLocks;
use crate::packager::ThreadPackager;
use crate::pending::PendingStore;

use grab_models::ThreadRef;
use tracing::warn;

/// Everything a mention or button click needs.
///
/// Wrap it in an `Arc` to share it between spawned tasks.
pub struct GrabContext {
    pub(crate) chat: Arc<dyn ChatGateway>,
    pub(crate) wiki: Arc<dyn WikiBackend>,
    pub(crate) identity: BotIdentity,
    pub(crate) pending: PendingStore,
    pub(crate) locks: TitleLocks,
    pub(crate) config: GrabConfig,
}

impl GrabContext {
    pub fn new(chat: Arc<dyn ChatGateway>, wiki: Arc<dyn WikiBackend>, config: GrabConfig) -> Self {
        Self {
            chat,
            wiki,
            identity: BotIdentity::new(),
            pending: PendingStore::new(config.confirmation_ttl),
            locks: TitleLocks::new(),
            config,
        }
    }

    /// Use an already known bot identity instead of looking it up.
    pub fn with_identity(mut self, identity: BotIdentity) -> Self {
        self.identity = identity;
        self
    }

    pub fn config(&self) -> &GrabConfig {
        &self.config
    }

    pub fn pending(&self) -> &PendingStore {
        &self.pending
    }

    pub(crate) fn packager(&self) -> ThreadPackager<'_> {
        ThreadPackager::new(self.chat.as_ref(), &self.identity)
    }

    /// Post an ephemeral reply, logging failures.
    pub(crate) async fn notify(&self, thread: &ThreadRef, user_id: &str, notice: Notice) {
        if let Err(e) = self.chat.post_ephemeral(thread, user_id, notice).await {
            warn!(channel = %thread.channel_id, user = %user_id, error = %e, "Failed to post reply");
        }
    }

    /// Edit the message an interaction came from, logging failures.
    pub(crate) async fn replace_original(&self, response_url: &str, thread_ts: &str, text: &str) {
        if let Err(e) = self.chat.replace_original(response_url, thread_ts, text).await {
            warn!(error = %e, "Failed to update interactive message");
        }
    }
}
