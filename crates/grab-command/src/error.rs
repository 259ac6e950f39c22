//! Error types for command parsing.

use thiserror::Error;

/// Errors raised while interpreting a chat command.
///
/// All of them are user mistakes: they are reported back to the user and
/// never abort event handling.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Malformed command. Carries the rendered usage text.
    #[error("{0}")]
    Usage(String),

    /// A `range` endpoint is neither a timestamp nor a message link.
    #[error("not a message link or timestamp: {0}")]
    InvalidMessageRef(String),
}

/// Result type for command parsing.
pub type Result<T> = std::result::Result<T, CommandError>;
