//! Thread types for Grab.
//!
//! A thread is a root chat message plus its chronological replies. The chat
//! gateway hands them over as [`RawMessage`]s; packaging turns the ones worth
//! keeping into [`ThreadMessage`]s with resolved author names.

use serde::{Deserialize, Serialize};

/// Identifies a thread: the channel plus the timestamp of the root message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadRef {
    /// Channel the thread lives in.
    pub channel_id: String,
    /// Timestamp of the thread's root message.
    pub thread_ts: String,
}

impl ThreadRef {
    /// Creates a new thread reference.
    pub fn new(channel_id: impl Into<String>, thread_ts: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            thread_ts: thread_ts.into(),
        }
    }
}

/// A message as delivered by the chat gateway, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMessage {
    /// Author user id. Absent for some integration posts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// Bot id, set when the message was posted by a bot user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_id: Option<String>,

    /// Message text.
    #[serde(default)]
    pub text: String,

    /// Message timestamp (e.g. `1700000000.123456`).
    pub ts: String,
}

impl RawMessage {
    /// Creates a message authored by a user.
    pub fn new(user: impl Into<String>, text: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
            bot_id: None,
            text: text.into(),
            ts: ts.into(),
        }
    }

    /// Returns the author id, or an empty string when there is none.
    pub fn author_id(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }
}

/// A message kept for the transcript, with its author resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadMessage {
    /// Author user id.
    pub author_id: String,

    /// Resolved display name. Empty when the lookup failed.
    pub author_display_name: String,

    /// Message text.
    pub text: String,

    /// Message timestamp.
    pub timestamp: String,
}

impl ThreadMessage {
    /// Formats the message as a transcript line.
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.author_display_name, self.text)
    }
}

/// Splits a chat timestamp into an orderable key.
///
/// Timestamps look like `1700000000.123456`. The fraction is read as
/// microseconds, so `.1` is `100000`. Returns `None` when the value isn't in
/// that shape or the fraction has more than six digits.
pub fn timestamp_key(ts: &str) -> Option<(u64, u64)> {
    const FRACTION_DIGITS: usize = 6;

    let (secs, fraction) = ts.split_once('.').unwrap_or((ts, "0"));
    if fraction.is_empty()
        || fraction.len() > FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let secs = secs.parse().ok()?;
    let micros = format!("{:0<width$}", fraction, width = FRACTION_DIGITS)
        .parse()
        .ok()?;
    Some((secs, micros))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_message_author_id() {
        let msg = RawMessage::new("U1", "hi", "1.000001");
        assert_eq!(msg.author_id(), "U1");

        let bot_post = RawMessage {
            user: None,
            bot_id: Some("B1".to_string()),
            text: "beep".to_string(),
            ts: "1.000002".to_string(),
        };
        assert_eq!(bot_post.author_id(), "");
    }

    #[test]
    fn test_raw_message_deserialize_slack_shape() {
        let json = r#"{"type":"message","user":"U1","text":"hello","ts":"1700000000.000100"}"#;
        let msg: RawMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.user.as_deref(), Some("U1"));
        assert_eq!(msg.text, "hello");
        assert!(msg.bot_id.is_none());
    }

    #[test]
    fn test_transcript_line() {
        let msg = ThreadMessage {
            author_id: "U1".to_string(),
            author_display_name: "alice".to_string(),
            text: "hi".to_string(),
            timestamp: "1.0".to_string(),
        };
        assert_eq!(msg.transcript_line(), "alice: hi");
    }

    #[test]
    fn test_timestamp_key_ordering() {
        let a = timestamp_key("1700000000.000100").unwrap();
        let b = timestamp_key("1700000000.000200").unwrap();
        let c = timestamp_key("1700000001.000000").unwrap();
        assert!(a < b);
        assert!(b < c);
        assert_eq!(timestamp_key("1700000000"), Some((1_700_000_000, 0)));
        assert!(timestamp_key("not-a-ts").is_none());
    }

    #[test]
    fn test_timestamp_key_short_fraction_is_microseconds() {
        assert_eq!(timestamp_key("1700000000.1"), Some((1_700_000_000, 100_000)));
        assert_eq!(timestamp_key("1700000000.05"), Some((1_700_000_000, 50_000)));
        assert!(timestamp_key("1700000000.1") > timestamp_key("1700000000.000200"));

        assert!(timestamp_key("1700000000.1234567").is_none());
        assert!(timestamp_key("1700000000.").is_none());
        assert!(timestamp_key("1700000000.+1").is_none());
    }
}
