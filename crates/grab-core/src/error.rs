//! Error types for the Grab pipeline.

use grab_command::CommandError;
use thiserror::Error;

/// Errors that can occur while handling a chat command.
///
/// The `Display` text of every variant is what the user sees.
#[derive(Debug, Error)]
pub enum GrabError {
    /// Malformed command. Carries the rendered usage.
    #[error("{0}")]
    Usage(String),

    /// A name or existence lookup failed.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// No message survived filtering.
    #[error("There's nothing to save: every message in this thread is from me or mentions me.")]
    EmptyTranscript,

    /// The wiki write failed.
    #[error("Failed to publish to the wiki: {0}")]
    Publish(String),

    /// Chat gateway call failed.
    #[error("Chat error: {0}")]
    Chat(String),

    /// Wiki backend call failed.
    #[error("Wiki error: {0}")]
    Wiki(String),

    /// A confirm click arrived with nothing waiting for it.
    #[error("This request is no longer pending. Please run the command again.")]
    NoPendingConfirmation,

    /// A confirm click arrived after the prompt expired.
    #[error("This request expired. Please run the command again.")]
    ConfirmationExpired,
}

impl GrabError {
    /// Recasts a backend failure that happened during a write.
    pub fn into_publish(self) -> Self {
        match self {
            GrabError::Wiki(msg) | GrabError::Chat(msg) => GrabError::Publish(msg),
            other => other,
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, GrabError>;

impl From<CommandError> for GrabError {
    fn from(e: CommandError) -> Self {
        GrabError::Usage(e.to_string())
    }
}
