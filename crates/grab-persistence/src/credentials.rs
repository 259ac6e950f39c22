//! Per-workspace credential storage.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::atomic::{atomic_write_json, read_json, read_json_optional};
use crate::error::{PersistenceError, Result};

/// Secrets needed to serve one chat workspace.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceCredentials {
    /// Chat workspace (team) id.
    pub workspace_id: String,
    pub bot_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_secret: Option<String>,
    pub wiki_url: String,
    pub wiki_username: String,
    pub wiki_password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wiki_domain: Option<String>,
    pub installed_at: DateTime<Utc>,
}

impl WorkspaceCredentials {
    pub fn new(
        workspace_id: impl Into<String>,
        bot_token: impl Into<String>,
        wiki_url: impl Into<String>,
        wiki_username: impl Into<String>,
        wiki_password: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id: workspace_id.into(),
            bot_token: bot_token.into(),
            signing_secret: None,
            wiki_url: wiki_url.into(),
            wiki_username: wiki_username.into(),
            wiki_password: wiki_password.into(),
            wiki_domain: None,
            installed_at: Utc::now(),
        }
    }
}

impl fmt::Debug for WorkspaceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkspaceCredentials")
            .field("workspace_id", &self.workspace_id)
            .field("bot_token", &"[redacted]")
            .field("signing_secret", &self.signing_secret.as_ref().map(|_| "[redacted]"))
            .field("wiki_url", &self.wiki_url)
            .field("wiki_username", &self.wiki_username)
            .field("wiki_password", &"[redacted]")
            .field("wiki_domain", &self.wiki_domain)
            .field("installed_at", &self.installed_at)
            .finish()
    }
}

/// Stores credentials as one JSON file per workspace:
/// ```text
/// base_path/
/// ├── T0123ABCD.json
/// └── T0456EFGH.json
/// ```
pub struct CredentialStore {
    base_path: PathBuf,
}

impl CredentialStore {
    /// Creates a store rooted at `base_path`.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    fn path_for(&self, workspace_id: &str) -> Result<PathBuf> {
        let valid = !workspace_id.is_empty()
            && workspace_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::InvalidId(workspace_id.to_string()));
        }
        Ok(self.base_path.join(format!("{}.json", workspace_id)))
    }

    /// Saves credentials, replacing any earlier ones for the workspace.
    pub fn save(&self, credentials: &WorkspaceCredentials) -> Result<()> {
        let path = self.path_for(&credentials.workspace_id)?;
        atomic_write_json(&path, credentials)
    }

    /// Loads credentials for a workspace.
    pub fn load(&self, workspace_id: &str) -> Result<WorkspaceCredentials> {
        let path = self.path_for(workspace_id)?;
        if !path.exists() {
            return Err(PersistenceError::NotFound {
                kind: "workspace".to_string(),
                id: workspace_id.to_string(),
            });
        }
        read_json(&path)
    }

    /// Loads credentials if the workspace has been installed.
    pub fn load_optional(&self, workspace_id: &str) -> Result<Option<WorkspaceCredentials>> {
        read_json_optional(&self.path_for(workspace_id)?)
    }

    /// Lists installed workspaces, sorted by id.
    ///
    /// Unreadable files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<WorkspaceCredentials>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.base_path).map_err(|source| PersistenceError::ReadError {
            path: self.base_path.clone(),
            source,
        })?;

        let mut all = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| PersistenceError::ReadError {
                    path: self.base_path.clone(),
                    source,
                })?
                .path();
            if path.extension().is_some_and(|ext| ext == "json") {
                match read_json::<WorkspaceCredentials>(&path) {
                    Ok(credentials) => all.push(credentials),
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable credentials"),
                }
            }
        }
        all.sort_by(|a, b| a.workspace_id.cmp(&b.workspace_id));
        Ok(all)
    }

    /// Removes a workspace. Returns whether anything was removed.
    pub fn delete(&self, workspace_id: &str) -> Result<bool> {
        let path = self.path_for(workspace_id)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|source| PersistenceError::WriteError { path, source })?;
        Ok(true)
    }
}
