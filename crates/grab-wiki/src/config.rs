//! MediaWiki connection settings.

use std::fmt;
use std::time::Duration;

use crate::error::{Result, WikiError};

/// Environment variable holding the `api.php` URL.
pub const WIKI_URL_ENV: &str = "WIKI_URL";
pub const WIKI_UNAME_ENV: &str = "WIKI_UNAME";
pub const WIKI_PWORD_ENV: &str = "WIKI_PWORD";
/// Optional LDAP-style login domain.
pub const WIKI_DOMAIN_ENV: &str = "WIKI_DOMAIN";

const DEFAULT_USER_AGENT: &str = concat!("Grab/", env!("CARGO_PKG_VERSION"));
const DEFAULT_EDIT_SUMMARY: &str = "Conversation saved by Grab";

/// How to reach and authenticate against a wiki.
#[derive(Clone)]
pub struct WikiConfig {
    /// Full URL of the wiki's `api.php`.
    pub api_url: String,
    pub username: String,
    pub password: String,
    pub domain: Option<String>,
    pub user_agent: String,
    pub edit_summary: String,
    pub timeout: Duration,
    /// Retries after the first attempt of a read.
    pub max_retries: usize,
    /// Retries after the first attempt of a write.
    pub max_write_retries: usize,
    /// Base delay, doubled on every retry.
    pub retry_delay: Duration,
}

impl WikiConfig {
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            username: username.into(),
            password: password.into(),
            domain: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            edit_summary: DEFAULT_EDIT_SUMMARY.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            max_write_retries: 1,
            retry_delay: Duration::from_millis(500),
        }
    }

    /// Reads `WIKI_URL`, `WIKI_UNAME`, `WIKI_PWORD` and `WIKI_DOMAIN`.
    pub fn from_env() -> Result<Self> {
        let required = |key: &str| {
            std::env::var(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| WikiError::Config(format!("{} is not set", key)))
        };
        let mut config = Self::new(
            required(WIKI_URL_ENV)?,
            required(WIKI_UNAME_ENV)?,
            required(WIKI_PWORD_ENV)?,
        );
        config.domain = std::env::var(WIKI_DOMAIN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(config)
    }

    pub fn with_domain(mut self, domain: Option<String>) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_edit_summary(mut self, summary: impl Into<String>) -> Self {
        self.edit_summary = summary.into();
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }
}

impl fmt::Debug for WikiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WikiConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("domain", &self.domain)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}
