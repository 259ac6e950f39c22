//! Thread packaging.
//!
//! Fetches a thread, drops the bot's own traffic, resolves display names
//! and renders the wiki transcript. Also pulls the explicit title and section
//! out of the command message.

use std::collections::HashMap;

use chrono::{DateTime, Local};
use grab_command::{tokenize, trim_quotes, SUBCOMMAND_KEYWORDS};
use grab_models::thread::timestamp_key;
use grab_models::{RawMessage, ThreadMessage, ThreadRef, Transcript};
use tracing::{debug, warn};

use crate::error::{GrabError, Result};
use crate::gateway::ChatGateway;
use crate::identity::{mention_token, BotIdentity};

/// Display names already looked up during one command.
///
/// Failed lookups are cached as an empty name so a flaky user lookup is only
/// attempted once per command.
#[derive(Debug, Default)]
pub struct NameCache {
    names: HashMap<String, String>,
}

impl NameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name for `user_id`, asking `chat` on a miss.
    pub async fn resolve(&mut self, chat: &dyn ChatGateway, user_id: &str) -> String {
        if let Some(name) = self.names.get(user_id) {
            return name.clone();
        }
        let name = match chat.user_display_name(user_id).await {
            Ok(name) => name,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Display name lookup failed");
                String::new()
            }
        };
        self.names.insert(user_id.to_string(), name.clone());
        name
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Everything the pipeline needs from one thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagedThread {
    /// Tokens of the last message of the unfiltered thread.
    pub command: Vec<String>,
    /// Title given explicitly in the command message.
    pub title: Option<String>,
    /// Section given explicitly in the command message.
    pub section: Option<String>,
    /// Messages kept after filtering, oldest first.
    pub messages: Vec<ThreadMessage>,
    pub transcript: Transcript,
}

/// Builds [`PackagedThread`]s from a chat gateway.
pub struct ThreadPackager<'a> {
    chat: &'a dyn ChatGateway,
    identity: &'a BotIdentity,
}

impl<'a> ThreadPackager<'a> {
    pub fn new(chat: &'a dyn ChatGateway, identity: &'a BotIdentity) -> Self {
        Self { chat, identity }
    }

    /// Package `thread`, optionally restricted to the inclusive range of
    /// messages between two timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`GrabError::Lookup`] when the thread or bot identity can't be
    /// fetched and [`GrabError::EmptyTranscript`] when nothing survives
    /// filtering.
    pub async fn package(
        &self,
        thread: &ThreadRef,
        range: Option<(&str, &str)>,
        names: &mut NameCache,
    ) -> Result<PackagedThread> {
        let bot_id = self
            .identity
            .user_id(self.chat)
            .await
            .map_err(|e| GrabError::Lookup(e.to_string()))?
            .to_string();
        let raw = self
            .chat
            .thread_replies(thread)
            .await
            .map_err(|e| GrabError::Lookup(e.to_string()))?;

        let command = raw.last().map(|m| tokenize(&m.text)).unwrap_or_default();
        let (title, section) = command_positionals(&command);

        let in_range: Vec<&RawMessage> = match range {
            Some((start, end)) => restrict_to_range(&raw, start, end)?,
            None => raw.iter().collect(),
        };

        let mut messages = Vec::new();
        for msg in in_range {
            if is_own_traffic(msg, &bot_id) {
                continue;
            }
            let author_id = msg.author_id().to_string();
            let author_display_name = names.resolve(self.chat, &author_id).await;
            messages.push(ThreadMessage {
                author_id,
                author_display_name,
                text: msg.text.clone(),
                timestamp: msg.ts.clone(),
            });
        }

        debug!(
            channel = %thread.channel_id,
            thread_ts = %thread.thread_ts,
            fetched = raw.len(),
            kept = messages.len(),
            "Packaged thread"
        );

        let transcript = render_transcript(&messages, Local::now())?;
        Ok(PackagedThread {
            command,
            title,
            section,
            messages,
            transcript,
        })
    }
}

/// Messages authored by the bot or addressed to it.
pub fn is_own_traffic(msg: &RawMessage, bot_id: &str) -> bool {
    msg.user.as_deref() == Some(bot_id) || msg.text.contains(&mention_token(bot_id))
}

/// Explicit title and section from command tokens.
///
/// Skips the leading mention, any flags and a subcommand keyword.
pub fn command_positionals(tokens: &[String]) -> (Option<String>, Option<String>) {
    let mut rest = tokens
        .iter()
        .skip(1)
        .filter(|t| !t.starts_with('-'))
        .map(|t| trim_quotes(t))
        .peekable();
    if rest
        .peek()
        .is_some_and(|t| SUBCOMMAND_KEYWORDS.contains(t))
    {
        rest.next();
    }
    let title = rest.next().map(str::to_string);
    let section = rest.next().map(str::to_string);
    (title, section)
}

/// Messages whose timestamps fall between `start` and `end`, inclusive.
///
/// The endpoints may be given in either order.
pub fn restrict_to_range<'m>(
    messages: &'m [RawMessage],
    start: &str,
    end: &str,
) -> Result<Vec<&'m RawMessage>> {
    let parse = |ts: &str| {
        timestamp_key(ts).ok_or_else(|| GrabError::Usage(format!("Invalid message reference: {}", ts)))
    };
    let (a, b) = (parse(start)?, parse(end)?);
    let (low, high) = if a <= b { (a, b) } else { (b, a) };

    Ok(messages
        .iter()
        .filter(|m| timestamp_key(&m.ts).is_some_and(|k| k >= low && k <= high))
        .collect())
}

/// Render kept messages as a wiki transcript.
///
/// The generated title is the text of the first message with any content.
pub fn render_transcript(messages: &[ThreadMessage], started: DateTime<Local>) -> Result<Transcript> {
    let generated_title = messages
        .iter()
        .map(|m| m.text.trim())
        .find(|t| !t.is_empty())
        .ok_or(GrabError::EmptyTranscript)?;

    let mut body = format!(
        "Conversation begins at {}\n\n",
        started.format("%Y-%m-%d at %H:%M")
    );
    for msg in messages {
        body.push_str(&msg.transcript_line());
        body.push_str("\n\n");
    }
    Ok(Transcript::new(generated_title, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn toks(s: &str) -> Vec<String> {
        tokenize(s)
    }

    fn message(name: &str, text: &str, ts: &str) -> ThreadMessage {
        ThreadMessage {
            author_id: format!("U{}", name),
            author_display_name: name.to_string(),
            text: text.to_string(),
            timestamp: ts.to_string(),
        }
    }

    #[test]
    fn test_own_traffic() {
        assert!(is_own_traffic(&RawMessage::new("UBOT", "Article saved!", "1.1"), "UBOT"));
        assert!(is_own_traffic(&RawMessage::new("U1", "<@UBOT> \"Title\"", "1.2"), "UBOT"));
        assert!(!is_own_traffic(&RawMessage::new("U1", "ping <@U2>", "1.3"), "UBOT"));
    }

    #[test]
    fn test_command_positionals() {
        assert_eq!(
            command_positionals(&toks("<@UBOT> \"Release Notes\" Q3")),
            (Some("Release Notes".to_string()), Some("Q3".to_string()))
        );
        assert_eq!(command_positionals(&toks("<@UBOT>")), (None, None));
        assert_eq!(
            command_positionals(&toks("<@UBOT> -c append Notes")),
            (Some("Notes".to_string()), None)
        );
        assert_eq!(command_positionals(&[]), (None, None));
    }

    #[test]
    fn test_restrict_to_range_is_inclusive_and_order_agnostic() {
        let raw = vec![
            RawMessage::new("U1", "a", "1700000000.000001"),
            RawMessage::new("U1", "b", "1700000000.000002"),
            RawMessage::new("U1", "c", "1700000000.000003"),
            RawMessage::new("U1", "d", "1700000000.000004"),
        ];
        let kept = restrict_to_range(&raw, "1700000000.000003", "1700000000.000002").unwrap();
        let texts: Vec<_> = kept.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);

        assert!(matches!(
            restrict_to_range(&raw, "yesterday", "1700000000.000002"),
            Err(GrabError::Usage(_))
        ));
    }

    #[test]
    fn test_restrict_to_range_reads_short_fractions_as_micros() {
        let raw = vec![
            RawMessage::new("U1", "a", "1700000000.000002"),
            RawMessage::new("U1", "b", "1700000000.100000"),
            RawMessage::new("U1", "c", "1700000000.200000"),
        ];
        let kept = restrict_to_range(&raw, "1700000000.1", "1700000000.2").unwrap();
        let texts: Vec<_> = kept.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c"]);
    }

    #[test]
    fn test_render_transcript() {
        let started = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        let transcript = render_transcript(
            &[
                message("alice", "Deploy plan", "1.1"),
                message("bob", "Looks good", "1.2"),
            ],
            started,
        )
        .unwrap();

        assert_eq!(transcript.generated_title, "Deploy plan");
        assert_eq!(
            transcript.body,
            "Conversation begins at 2024-03-05 at 09:07\n\nalice: Deploy plan\n\nbob: Looks good\n\n"
        );
    }

    #[test]
    fn test_render_transcript_skips_blank_title_source() {
        let started = Local.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        let transcript =
            render_transcript(&[message("alice", "  ", "1.1"), message("bob", "hi", "1.2")], started)
                .unwrap();
        assert_eq!(transcript.generated_title, "hi");

        assert!(matches!(
            render_transcript(&[], started),
            Err(GrabError::EmptyTranscript)
        ));
    }
}
