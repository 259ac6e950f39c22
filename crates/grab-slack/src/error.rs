//! Error types for the Slack integration.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use grab_core::GrabError;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur during Slack operations.
#[derive(Error, Debug)]
pub enum SlackError {
    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The Web API answered `ok: false` or a non-success status.
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request signature verification failed.
    #[error("Signature verification failed: {0}")]
    SignatureVerification(String),

    /// Malformed request from Slack.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

/// Result type for Slack operations.
pub type SlackResult<T> = std::result::Result<T, SlackError>;

impl SlackError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            SlackError::SignatureVerification(_) => StatusCode::UNAUTHORIZED,
            SlackError::InvalidPayload(_) | SlackError::Json(_) => StatusCode::BAD_REQUEST,
            SlackError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            SlackError::Config(_) | SlackError::Api(_) | SlackError::Network(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for SlackError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));
        (status, body).into_response()
    }
}

impl From<SlackError> for GrabError {
    fn from(e: SlackError) -> Self {
        GrabError::Chat(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            SlackError::SignatureVerification("bad".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            SlackError::InvalidPayload("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SlackError::Api("channel_not_found".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_into_grab_error() {
        let err: GrabError = SlackError::Api("not_in_channel".into()).into();
        assert!(matches!(err, GrabError::Chat(_)));
        assert!(err.to_string().contains("not_in_channel"));
    }
}
