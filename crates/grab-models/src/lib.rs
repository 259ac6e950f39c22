//! Core data models for Grab.
//!
//! This crate provides the data types shared by the command pipeline and the
//! chat/wiki adapters: thread messages, transcripts, publish decisions, and
//! the pending-overwrite record that bridges a confirmation prompt and the
//! user's later click.

pub mod event;
pub mod pending;
pub mod publish;
pub mod thread;
pub mod transcript;

// Re-export main types
pub use event::{ActionEvent, MentionEvent};
pub use pending::{PendingKey, PendingOverwrite, DEFAULT_CONFIRMATION_TTL_SECS};
pub use publish::{ArticleInfo, PublishDecision, WriteMode, WriteTarget};
pub use thread::{RawMessage, ThreadMessage, ThreadRef};
pub use transcript::Transcript;
