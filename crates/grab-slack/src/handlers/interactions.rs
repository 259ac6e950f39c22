//! Interactivity handler for the overwrite prompt buttons.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

use crate::error::SlackResult;
use crate::payloads::{parse_interaction, InteractionPayload};
use crate::state::AppState;

/// POST /interaction/handle - Slack interactivity.
pub async fn handle_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> SlackResult<StatusCode> {
    state.verify(&headers, &body)?;

    if let InteractionPayload::BlockActions(actions) = parse_interaction(&body)? {
        let event = actions.into_event()?;
        debug!(action_id = %event.action_id, user = %event.user_id, "Button clicked");
        let grab = state.grab.clone();
        tokio::spawn(async move {
            let outcome = grab.handle_action(&event).await;
            debug!(?outcome, "Action handled");
        });
    }

    Ok(StatusCode::OK)
}
