//! Slack and HTTP server configuration.

use std::fmt;
use std::time::{Duration, Instant};

use crate::error::{SlackError, SlackResult};

pub const SLACK_BOT_TOKEN_ENV: &str = "SLACK_BOT_TOKEN";
pub const SLACK_SIGNING_SECRET_ENV: &str = "SLACK_SIGNING_SECRET";
pub const GRAB_HOST_ENV: &str = "GRAB_HOST";
pub const GRAB_PORT_ENV: &str = "GRAB_PORT";

const DEFAULT_API_BASE: &str = "https://slack.com/api";

/// Credentials and endpoints for the Slack Web API.
#[derive(Clone)]
pub struct SlackConfig {
    bot_token: String,
    /// Secret for verifying request signatures. Unverified when absent.
    pub signing_secret: Option<String>,
    /// Base URL of the Web API, without trailing slash.
    pub api_base: String,
    pub timeout: Duration,
}

impl SlackConfig {
    /// Creates a config for a bot token (`xoxb-...`).
    pub fn new(bot_token: impl Into<String>) -> SlackResult<Self> {
        let bot_token = bot_token.into();
        if !bot_token.starts_with("xoxb-") {
            return Err(SlackError::Config(
                "bot token must start with 'xoxb-'".to_string(),
            ));
        }
        Ok(Self {
            bot_token,
            signing_secret: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        })
    }

    /// Reads `SLACK_BOT_TOKEN` and `SLACK_SIGNING_SECRET`.
    pub fn from_env() -> SlackResult<Self> {
        let token = std::env::var(SLACK_BOT_TOKEN_ENV)
            .map_err(|_| SlackError::Config(format!("{} is not set", SLACK_BOT_TOKEN_ENV)))?;
        let secret = std::env::var(SLACK_SIGNING_SECRET_ENV)
            .ok()
            .filter(|s| !s.is_empty());
        Ok(Self::new(token)?.with_signing_secret(secret))
    }

    pub fn with_signing_secret(mut self, secret: Option<String>) -> Self {
        self.signing_secret = secret;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }
}

impl fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[redacted]")
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "[redacted]"))
            .field("api_base", &self.api_base)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            start_time: Instant::now(),
        }
    }

    /// Defaults overridden by `GRAB_HOST` and `GRAB_PORT`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var(GRAB_HOST_ENV) {
            config.host = host;
        }
        if let Some(port) = std::env::var(GRAB_PORT_ENV).ok().and_then(|p| p.parse().ok()) {
            config.port = port;
        }
        config
    }

    /// Returns the bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 8080)
    }
}
