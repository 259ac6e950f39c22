//! Shared configuration for Grab.
//!
//! Locates the state directory and reads pipeline settings from the
//! environment.
//!
//! # Storage Structure
//!
//! ```text
//! ~/.grab/
//! ├── .env           # Optional environment overrides
//! └── credentials/   # One JSON file per chat workspace
//! ```
//!
//! # Environment Variables
//!
//! - `GRAB_STATE_DIR`: Override the base state directory
//! - `GRAB_CONFIRM_TTL_SECS`: Lifetime of an overwrite confirmation prompt
//! - `GRAB_EDIT_SUMMARY`: Edit summary attached to wiki writes

use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use grab_models::DEFAULT_CONFIRMATION_TTL_SECS;

/// Environment variable for custom state directory.
pub const STATE_DIR_ENV: &str = "GRAB_STATE_DIR";

/// Environment variable for the confirmation lifetime.
pub const CONFIRM_TTL_ENV: &str = "GRAB_CONFIRM_TTL_SECS";

/// Environment variable for the wiki edit summary.
pub const EDIT_SUMMARY_ENV: &str = "GRAB_EDIT_SUMMARY";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".grab";

const CREDENTIALS_SUBDIR: &str = "credentials";

const DEFAULT_EDIT_SUMMARY: &str = "Conversation saved by Grab";

static STATE_DIR_CACHE: OnceLock<PathBuf> = OnceLock::new();

/// Get the Grab state directory.
///
/// The state directory is determined by:
/// 1. `GRAB_STATE_DIR` environment variable if set
/// 2. `~/.grab` if home directory is available
/// 3. `.grab` in current directory as fallback
pub fn state_dir() -> PathBuf {
    STATE_DIR_CACHE
        .get_or_init(|| {
            std::env::var(STATE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    dirs::home_dir()
                        .map(|h| h.join(DEFAULT_STATE_DIR))
                        .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
                })
        })
        .clone()
}

/// Get the `.env` file inside the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(".env")
}

/// Get the directory holding per-workspace credentials.
pub fn credentials_dir() -> PathBuf {
    state_dir().join(CREDENTIALS_SUBDIR)
}

/// Settings for the command pipeline.
#[derive(Debug, Clone)]
pub struct GrabConfig {
    /// How long an overwrite prompt stays valid.
    pub confirmation_ttl: Duration,
    /// Edit summary attached to wiki writes.
    pub edit_summary: String,
}

impl GrabConfig {
    /// Reads settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let ttl_secs = std::env::var(CONFIRM_TTL_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONFIRMATION_TTL_SECS);
        let edit_summary = std::env::var(EDIT_SUMMARY_ENV)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EDIT_SUMMARY.to_string());

        Self {
            confirmation_ttl: Duration::from_secs(ttl_secs),
            edit_summary,
        }
    }

    /// Sets the confirmation lifetime.
    pub fn with_confirmation_ttl(mut self, ttl: Duration) -> Self {
        self.confirmation_ttl = ttl;
        self
    }
}

impl Default for GrabConfig {
    fn default() -> Self {
        Self {
            confirmation_ttl: Duration::from_secs(DEFAULT_CONFIRMATION_TTL_SECS),
            edit_summary: DEFAULT_EDIT_SUMMARY.to_string(),
        }
    }
}
