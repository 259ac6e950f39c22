//! Button clicks on an overwrite prompt.
//!
//! A prompt is either confirmed or cancelled, once. Confirming re-reads the
//! thread so the write reflects the conversation at click time.

use grab_models::{ActionEvent, WriteTarget};
use tracing::{debug, info, warn};

use crate::context::GrabContext;
use crate::error::Result;
use crate::gateway::{publish, CANCEL_ACTION_ID, CONFIRM_ACTION_ID};
use crate::messages;
use crate::packager::NameCache;

/// What happened in response to a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The confirmed write succeeded.
    Published { target: WriteTarget, url: String },
    Cancelled,
    /// The confirmation could not be carried out.
    Failed { error: String },
    /// Not one of our buttons.
    Ignored { action_id: String },
}

impl GrabContext {
    /// Handle a click on a CONFIRM or CANCEL button.
    pub async fn handle_action(&self, event: &ActionEvent) -> ActionOutcome {
        match event.action_id.as_str() {
            CONFIRM_ACTION_ID => self.confirm(event).await,
            CANCEL_ACTION_ID => self.cancel(event).await,
            other => {
                warn!(action_id = %other, "Unexpected interaction");
                ActionOutcome::Ignored {
                    action_id: other.to_string(),
                }
            }
        }
    }

    async fn confirm(&self, event: &ActionEvent) -> ActionOutcome {
        let (text, outcome) = match self.run_confirm(event).await {
            Ok((target, url)) => {
                info!(title = %target.title, url = %url, "Confirmed overwrite written");
                (messages::confirmed(&url), ActionOutcome::Published { target, url })
            }
            Err(e) => {
                warn!(user = %event.user_id, error = %e, "Confirmation failed");
                let error = e.to_string();
                (error.clone(), ActionOutcome::Failed { error })
            }
        };
        self.replace_original(&event.response_url, &event.thread().thread_ts, &text)
            .await;
        outcome
    }

    async fn run_confirm(&self, event: &ActionEvent) -> Result<(WriteTarget, String)> {
        let pending = self.pending.take(&event.pending_key()).await?;
        let target = pending.target();

        let _guard = self.locks.lock(&target.title).await;
        let range = pending
            .range
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()));
        let mut names = NameCache::new();
        let packaged = self
            .packager()
            .package(&pending.thread(), range, &mut names)
            .await?;

        let url = publish(self.wiki.as_ref(), &target, &packaged.transcript.body).await?;
        Ok((target, url))
    }

    async fn cancel(&self, event: &ActionEvent) -> ActionOutcome {
        if let Err(e) = self.pending.take(&event.pending_key()).await {
            debug!(user = %event.user_id, error = %e, "Cancel without a live confirmation");
        }
        info!(user = %event.user_id, "Grab request cancelled");
        self.replace_original(&event.response_url, &event.thread().thread_ts, messages::CANCELLED)
            .await;
        ActionOutcome::Cancelled
    }
}
