//! Inbound Slack payloads.
//!
//! Events API bodies are JSON; interactivity bodies are form-encoded with
//! the JSON in a single `payload` field. Both are translated into the
//! platform-neutral events of `grab_models`.

use grab_models::{ActionEvent, MentionEvent};
use serde::Deserialize;

use crate::error::{SlackError, SlackResult};

/// Top-level Events API envelope.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventEnvelope {
    /// Sent once when the request URL is configured.
    UrlVerification { challenge: String },
    EventCallback {
        #[serde(default)]
        team_id: Option<String>,
        #[serde(default)]
        event_id: Option<String>,
        event: CallbackEvent,
    },
    #[serde(other)]
    Other,
}

/// The inner event of an `event_callback`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CallbackEvent {
    AppMention(AppMention),
    #[serde(other)]
    Other,
}

/// An `app_mention` event.
#[derive(Debug, Clone, Deserialize)]
pub struct AppMention {
    /// Absent when a bot or integration mentions us.
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub text: String,
    pub channel: String,
    pub ts: String,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl AppMention {
    /// Converts into a pipeline event. Mentions without a human author
    /// are ignored.
    pub fn into_event(self, team_id: Option<String>) -> Option<MentionEvent> {
        if self.bot_id.is_some() {
            return None;
        }
        let user_id = self.user?;
        Some(MentionEvent {
            team_id,
            channel_id: self.channel,
            user_id,
            text: self.text,
            ts: self.ts,
            thread_ts: self.thread_ts,
        })
    }
}

/// Parses an Events API body.
pub fn parse_event(body: &[u8]) -> SlackResult<EventEnvelope> {
    serde_json::from_slice(body).map_err(|e| SlackError::InvalidPayload(e.to_string()))
}

/// Interactivity payload. Only `block_actions` is handled.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InteractionPayload {
    BlockActions(BlockActions),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
pub struct BlockActions {
    pub user: IdRef,
    #[serde(default)]
    pub channel: Option<IdRef>,
    #[serde(default)]
    pub container: Option<Container>,
    pub response_url: String,
    #[serde(default)]
    pub actions: Vec<BlockAction>,
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: String,
}

/// Where the clicked message lives.
#[derive(Debug, Default, Deserialize)]
pub struct Container {
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub message_ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BlockAction {
    pub action_id: String,
    /// Id of the prompt the button belongs to.
    #[serde(default)]
    pub value: Option<String>,
}

impl BlockActions {
    /// Converts the first action into a pipeline event.
    pub fn into_event(self) -> SlackResult<ActionEvent> {
        let action = self
            .actions
            .into_iter()
            .next()
            .ok_or_else(|| SlackError::InvalidPayload("block_actions without actions".into()))?;
        let container = self.container.unwrap_or_default();
        let channel_id = container
            .channel_id
            .or_else(|| self.channel.map(|c| c.id))
            .ok_or_else(|| SlackError::InvalidPayload("block_actions without channel".into()))?;
        let message_ts = container
            .message_ts
            .ok_or_else(|| SlackError::InvalidPayload("block_actions without message_ts".into()))?;

        Ok(ActionEvent {
            action_id: action.action_id,
            channel_id,
            thread_ts: container.thread_ts,
            message_ts,
            user_id: self.user.id,
            response_url: self.response_url,
            prompt_id: action.value,
        })
    }
}

/// Parses a form-encoded interactivity body.
pub fn parse_interaction(body: &[u8]) -> SlackResult<InteractionPayload> {
    let payload = url::form_urlencoded::parse(body)
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| value.into_owned())
        .ok_or_else(|| SlackError::InvalidPayload("missing payload field".into()))?;
    serde_json::from_str(&payload).map_err(|e| SlackError::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_verification() {
        let body = br#"{"token":"x","challenge":"3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P","type":"url_verification"}"#;
        match parse_event(body).unwrap() {
            EventEnvelope::UrlVerification { challenge } => {
                assert!(challenge.starts_with("3eZbrw"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_app_mention_in_thread() {
        let body = br#"{
            "type": "event_callback",
            "team_id": "T1",
            "event_id": "Ev1",
            "event": {
                "type": "app_mention",
                "user": "U1",
                "text": "<@UBOT> append Notes",
                "ts": "1700000000.000300",
                "thread_ts": "1700000000.000100",
                "channel": "C1"
            }
        }"#;
        let EventEnvelope::EventCallback { team_id, event, .. } = parse_event(body).unwrap() else {
            panic!("expected event_callback");
        };
        let CallbackEvent::AppMention(mention) = event else {
            panic!("expected app_mention");
        };
        let event = mention.into_event(team_id).unwrap();
        assert_eq!(event.team_id.as_deref(), Some("T1"));
        assert_eq!(event.user_id, "U1");
        assert_eq!(event.thread().thread_ts, "1700000000.000100");
    }

    #[test]
    fn test_other_events_are_tolerated() {
        let body = br#"{"type":"event_callback","event":{"type":"reaction_added","user":"U1"}}"#;
        assert!(matches!(
            parse_event(body).unwrap(),
            EventEnvelope::EventCallback {
                event: CallbackEvent::Other,
                ..
            }
        ));
        assert!(matches!(
            parse_event(br#"{"type":"app_rate_limited"}"#).unwrap(),
            EventEnvelope::Other
        ));
        assert!(matches!(
            parse_event(b"not json"),
            Err(SlackError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_bot_mention_is_ignored() {
        let mention = AppMention {
            user: None,
            bot_id: Some("B1".to_string()),
            text: "<@UBOT>".to_string(),
            channel: "C1".to_string(),
            ts: "1.0".to_string(),
            thread_ts: None,
        };
        assert!(mention.into_event(None).is_none());
    }

    #[test]
    fn test_block_actions_form() {
        let json = r#"{
            "type": "block_actions",
            "user": {"id": "U1"},
            "channel": {"id": "C1"},
            "container": {"type": "message", "message_ts": "1700000000.000400",
                          "channel_id": "C1", "thread_ts": "1700000000.000100",
                          "is_ephemeral": true},
            "response_url": "https://hooks.slack.com/actions/T1/1/abc",
            "actions": [{"action_id": "confirm_wiki_page_overwrite",
                         "value": "0b5c8a9e-3f1d-4c2a-9d7e-1a2b3c4d5e6f"}]
        }"#;
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("payload", json)
            .finish();

        let InteractionPayload::BlockActions(actions) = parse_interaction(body.as_bytes()).unwrap()
        else {
            panic!("expected block_actions");
        };
        let event = actions.into_event().unwrap();
        assert_eq!(event.action_id, "confirm_wiki_page_overwrite");
        assert_eq!(event.channel_id, "C1");
        assert_eq!(event.thread_ts.as_deref(), Some("1700000000.000100"));
        assert_eq!(event.message_ts, "1700000000.000400");
        assert_eq!(event.response_url, "https://hooks.slack.com/actions/T1/1/abc");
        assert_eq!(
            event.prompt_id.as_deref(),
            Some("0b5c8a9e-3f1d-4c2a-9d7e-1a2b3c4d5e6f")
        );
    }

    #[test]
    fn test_interaction_without_payload_field() {
        assert!(matches!(
            parse_interaction(b"foo=bar"),
            Err(SlackError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_block_actions_without_actions() {
        let json = r#"{"type":"block_actions","user":{"id":"U1"},
            "container":{"channel_id":"C1","message_ts":"1.0"},
            "response_url":"https://hooks.slack.com/x","actions":[]}"#;
        let payload: InteractionPayload = serde_json::from_str(json).unwrap();
        let InteractionPayload::BlockActions(actions) = payload else {
            panic!("expected block_actions");
        };
        assert!(actions.into_event().is_err());
    }
}
