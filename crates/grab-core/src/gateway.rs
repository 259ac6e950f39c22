//! Collaborator seams: the chat platform and the wiki.
//!
//! The pipeline only talks to the outside world through these two traits,
//! so tests can swap in in-memory fakes.

use async_trait::async_trait;
use grab_models::{ArticleInfo, RawMessage, ThreadRef, WriteMode, WriteTarget};

use crate::error::Result;

/// Action id of the confirm button on an overwrite prompt.
pub const CONFIRM_ACTION_ID: &str = "confirm_wiki_page_overwrite";

/// Action id of the cancel button on an overwrite prompt.
pub const CANCEL_ACTION_ID: &str = "cancel_wiki_page_overwrite";

/// An ephemeral reply shown only to the requesting user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Plain text.
    Text(String),
    /// Warning with CONFIRM and CANCEL buttons attached. Both buttons carry
    /// `prompt_id` so the click can be matched to this prompt.
    ConfirmOverwrite { warning: String, prompt_id: String },
}

impl Notice {
    pub fn text(text: impl Into<String>) -> Self {
        Notice::Text(text.into())
    }

    /// The visible text of the notice.
    pub fn body(&self) -> &str {
        match self {
            Notice::Text(text) => text,
            Notice::ConfirmOverwrite { warning, .. } => warning,
        }
    }
}

/// Access to a chat platform.
///
/// Implementations report failures as [`GrabError::Chat`](crate::GrabError::Chat).
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Every message of a thread, oldest first, including the parent.
    async fn thread_replies(&self, thread: &ThreadRef) -> Result<Vec<RawMessage>>;

    /// The bot's own user id.
    async fn bot_user_id(&self) -> Result<String>;

    /// Display name of a user.
    async fn user_display_name(&self, user_id: &str) -> Result<String>;

    /// Post a reply in the thread that only `user_id` can see.
    async fn post_ephemeral(&self, thread: &ThreadRef, user_id: &str, notice: Notice)
        -> Result<()>;

    /// Replace the message an interaction came from.
    async fn replace_original(&self, response_url: &str, thread_ts: &str, text: &str)
        -> Result<()>;
}

/// Access to a wiki.
///
/// Implementations report failures as [`GrabError::Wiki`](crate::GrabError::Wiki).
/// Write operations return the URL of the written article.
#[async_trait]
pub trait WikiBackend: Send + Sync {
    /// Whether an article exists, and where.
    async fn article(&self, title: &str) -> Result<ArticleInfo>;

    /// Whether an article has a section with this heading.
    async fn section_exists(&self, title: &str, section: &str) -> Result<bool>;

    /// Replace or create the whole article.
    async fn write_page(&self, title: &str, body: &str) -> Result<String>;

    /// Replace the named section, creating it when absent.
    async fn write_section(&self, title: &str, section: &str, body: &str) -> Result<String>;

    /// Add `body` to the end of the article or of the named section.
    async fn append(&self, title: &str, section: Option<&str>, body: &str) -> Result<String>;
}

/// Perform `target` against the wiki.
pub async fn publish(wiki: &dyn WikiBackend, target: &WriteTarget, body: &str) -> Result<String> {
    let written = match (target.mode, target.section.as_deref()) {
        (WriteMode::Append, section) => wiki.append(&target.title, section, body).await,
        (WriteMode::Replace, Some(section)) => {
            wiki.write_section(&target.title, section, body).await
        }
        (WriteMode::Replace, None) => wiki.write_page(&target.title, body).await,
    };
    written.map_err(|e| e.into_publish())
}
