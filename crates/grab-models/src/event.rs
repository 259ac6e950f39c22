//! Chat events as seen by the command pipeline.
//!
//! Adapters translate platform payloads into these before handing them to
//! the core.

use serde::{Deserialize, Serialize};

use crate::pending::PendingKey;
use crate::thread::ThreadRef;

/// The bot was mentioned in a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEvent {
    /// Workspace the event came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub channel_id: String,
    /// User who wrote the mention.
    pub user_id: String,
    /// Full message text, mention included.
    pub text: String,
    /// Timestamp of the mentioning message.
    pub ts: String,
    /// Root of the thread, when the mention is a reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
}

impl MentionEvent {
    /// Thread the mention belongs to. A top-level mention is its own root.
    pub fn thread(&self) -> ThreadRef {
        ThreadRef::new(
            &self.channel_id,
            self.thread_ts.as_deref().unwrap_or(&self.ts),
        )
    }
}

/// The user clicked a button on an interactive message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEvent {
    /// Identifier of the clicked element.
    pub action_id: String,
    pub channel_id: String,
    /// Thread the interactive message was posted in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_ts: Option<String>,
    /// Timestamp of the interactive message itself.
    pub message_ts: String,
    /// User who clicked.
    pub user_id: String,
    /// One-shot URL for editing the interactive message.
    pub response_url: String,
    /// Prompt id carried in the button value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_id: Option<String>,
}

impl ActionEvent {
    /// Thread the interaction refers to.
    pub fn thread(&self) -> ThreadRef {
        ThreadRef::new(
            &self.channel_id,
            self.thread_ts.as_deref().unwrap_or(&self.message_ts),
        )
    }

    /// Key of the pending overwrite this click resolves.
    ///
    /// A click without a prompt id matches no recorded prompt.
    pub fn pending_key(&self) -> PendingKey {
        let thread = self.thread();
        PendingKey::new(
            self.prompt_id.as_deref().unwrap_or_default(),
            thread.channel_id,
            thread.thread_ts,
            &self.user_id,
        )
    }
}
