//! Application state shared across handlers.

use std::sync::Arc;

use axum::http::HeaderMap;
use grab_core::GrabContext;

use crate::config::ServerConfig;
use crate::error::SlackResult;
use crate::signature::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};

/// Header Slack sets on redelivered events.
pub const RETRY_NUM_HEADER: &str = "x-slack-retry-num";

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Command pipeline.
    pub grab: Arc<GrabContext>,
    /// Request verifier (None when no signing secret is configured).
    pub verifier: Option<Arc<SignatureVerifier>>,
}

impl AppState {
    pub fn new(config: ServerConfig, grab: GrabContext, verifier: Option<SignatureVerifier>) -> Self {
        Self {
            config: Arc::new(config),
            grab: Arc::new(grab),
            verifier: verifier.map(Arc::new),
        }
    }

    /// Checks the request signature when a verifier is configured.
    pub fn verify(&self, headers: &HeaderMap, body: &[u8]) -> SlackResult<()> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        verifier.verify(header(TIMESTAMP_HEADER), header(SIGNATURE_HEADER), body)
    }
}

/// Returns true for a redelivery of an event Slack already sent.
pub fn is_retry(headers: &HeaderMap) -> bool {
    headers.contains_key(RETRY_NUM_HEADER)
}
