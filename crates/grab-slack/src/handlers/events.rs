//! Events API handler.

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, info};

use crate::error::SlackResult;
use crate::payloads::{parse_event, CallbackEvent, EventEnvelope};
use crate::state::{is_retry, AppState};

/// POST /event/handle - Slack Events API.
///
/// Mentions are acknowledged at once and handled on their own task.
pub async fn handle_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> SlackResult<Response> {
    state.verify(&headers, &body)?;

    if is_retry(&headers) {
        debug!("Skipping redelivered event");
        return Ok(StatusCode::OK.into_response());
    }

    match parse_event(&body)? {
        EventEnvelope::UrlVerification { challenge } => {
            info!("Answering URL verification challenge");
            Ok(Json(json!({ "challenge": challenge })).into_response())
        }
        EventEnvelope::EventCallback {
            team_id,
            event_id,
            event: CallbackEvent::AppMention(mention),
        } => {
            match mention.into_event(team_id) {
                Some(event) => {
                    debug!(event_id = ?event_id, channel = %event.channel_id, user = %event.user_id, "Mention received");
                    let grab = state.grab.clone();
                    tokio::spawn(async move {
                        let outcome = grab.handle_mention(&event).await;
                        debug!(?outcome, "Mention handled");
                    });
                }
                None => debug!(event_id = ?event_id, "Ignoring mention without a human author"),
            }
            Ok(StatusCode::OK.into_response())
        }
        EventEnvelope::EventCallback { .. } | EventEnvelope::Other => {
            Ok(StatusCode::OK.into_response())
        }
    }
}
