//! Publish types for Grab.
//!
//! A [`PublishDecision`] is produced once per command by the decision engine
//! and says whether the transcript goes straight to the wiki, needs the user
//! to confirm an overwrite first, or is refused.

use serde::{Deserialize, Serialize};

/// How a write treats existing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Replace the page (or section) content.
    #[default]
    Replace,
    /// Add the transcript after the existing content.
    Append,
}

/// What a publish writes to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteTarget {
    /// Article title. Never empty.
    pub title: String,

    /// Section heading. `None` targets the whole page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,

    /// Replace or append.
    #[serde(default)]
    pub mode: WriteMode,
}

impl WriteTarget {
    /// Targets the whole page with a replacing write.
    pub fn page(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            section: None,
            mode: WriteMode::Replace,
        }
    }

    /// Targets one section with a replacing write.
    pub fn section(title: impl Into<String>, section: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            section: Some(section.into()),
            mode: WriteMode::Replace,
        }
    }

    /// Switches the target to append mode.
    pub fn appending(mut self) -> Self {
        self.mode = WriteMode::Append;
        self
    }

    /// Returns true if this write touches the whole page.
    pub fn is_full_page(&self) -> bool {
        self.section.is_none()
    }
}

/// Existence facts about an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ArticleInfo {
    /// Whether the article exists.
    pub exists: bool,

    /// Canonical URL. Wikis report it for missing pages too.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ArticleInfo {
    /// An article that exists at the given URL.
    pub fn existing(url: impl Into<String>) -> Self {
        Self {
            exists: true,
            url: Some(url.into()),
        }
    }

    /// An article that does not exist.
    pub fn missing() -> Self {
        Self::default()
    }
}

/// Outcome of the publish decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PublishDecision {
    /// Write immediately.
    PublishDirect {
        /// Where to write.
        target: WriteTarget,
    },
    /// Ask the user before overwriting existing content.
    ConfirmOverwrite {
        /// URL of the article that would be overwritten.
        existing_url: String,
        /// Where the write goes once confirmed.
        target: WriteTarget,
    },
    /// Refuse, telling the user why.
    Reject {
        /// User-facing reason.
        reason: String,
    },
}

impl PublishDecision {
    /// Returns true if this decision needs a confirmation click.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, PublishDecision::ConfirmOverwrite { .. })
    }
}
