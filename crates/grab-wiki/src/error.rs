//! Error types for the MediaWiki backend.

use grab_core::GrabError;
use thiserror::Error;

/// Errors that can occur when talking to a MediaWiki installation.
#[derive(Debug, Error)]
pub enum WikiError {
    /// A required setting is missing.
    #[error("missing configuration: {0}")]
    Config(String),

    #[error("invalid wiki API URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status after retries were exhausted.
    #[error("wiki returned HTTP {0}")]
    Status(u16),

    /// The API answered with an `error` object.
    #[error("MediaWiki API error [{code}]: {info}")]
    Api { code: String, info: String },

    #[error("login failed: {0}")]
    Login(String),

    #[error("edit of {title} failed: {result}")]
    Edit { title: String, result: String },

    #[error("section \"{section}\" not found in {title}")]
    SectionNotFound { title: String, section: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl WikiError {
    /// The API error code, if this is an API error.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            WikiError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Result type for wiki operations.
pub type Result<T> = std::result::Result<T, WikiError>;

impl From<WikiError> for GrabError {
    fn from(e: WikiError) -> Self {
        GrabError::Wiki(e.to_string())
    }
}
