//! The bot's own identity, resolved lazily and once.

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::Result;
use crate::gateway::ChatGateway;

/// Lazily resolved bot user id.
///
/// Concurrent first callers share a single `auth.test` style lookup; a failed
/// lookup leaves the cell empty so the next caller retries.
#[derive(Debug, Default)]
pub struct BotIdentity {
    user_id: OnceCell<String>,
}

impl BotIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// An identity that is already known.
    pub fn known(user_id: impl Into<String>) -> Self {
        Self {
            user_id: OnceCell::new_with(Some(user_id.into())),
        }
    }

    /// The bot's user id, fetched through `chat` on first use.
    pub async fn user_id(&self, chat: &dyn ChatGateway) -> Result<&str> {
        let id = self
            .user_id
            .get_or_try_init(|| async {
                let id = chat.bot_user_id().await?;
                debug!(bot_user_id = %id, "Resolved bot identity");
                Ok::<_, crate::GrabError>(id)
            })
            .await?;
        Ok(id.as_str())
    }

    /// The bot's id if it has been resolved.
    pub fn cached(&self) -> Option<&str> {
        self.user_id.get().map(String::as_str)
    }
}

/// The literal mention token for a user id, as it appears in message text.
pub fn mention_token(user_id: &str) -> String {
    format!("<@{}>", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_identity() {
        let identity = BotIdentity::known("UBOT");
        assert_eq!(identity.cached(), Some("UBOT"));
        assert!(BotIdentity::new().cached().is_none());
    }

    #[test]
    fn test_mention_token() {
        assert_eq!(mention_token("UBOT"), "<@UBOT>");
    }
}
