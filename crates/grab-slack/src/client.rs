//! Slack Web API client.

use std::collections::HashSet;

use async_trait::async_trait;
use grab_core::{ChatGateway, Notice};
use grab_models::{RawMessage, ThreadRef};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use crate::blocks::notice_blocks;
use crate::config::SlackConfig;
use crate::error::{SlackError, SlackResult};

/// Page size for `conversations.replies`.
const REPLIES_PAGE_LIMIT: u32 = 200;

/// Seconds to wait when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// Client for the subset of the Web API Grab needs.
#[derive(Debug, Clone)]
pub struct SlackClient {
    http: Client,
    config: SlackConfig,
}

#[derive(Debug, Deserialize)]
struct RepliesResponse {
    #[serde(default)]
    messages: Vec<RawMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

#[derive(Debug, Deserialize)]
struct AuthTestResponse {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: SlackUser,
}

#[derive(Debug, Deserialize)]
struct SlackUser {
    #[serde(default)]
    name: String,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
struct UserProfile {
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    real_name: String,
}

impl SlackUser {
    /// Profile display name, then real name, then handle.
    fn display_name(self) -> String {
        let profile = self.profile.unwrap_or(UserProfile {
            display_name: String::new(),
            real_name: String::new(),
        });
        [
            profile.display_name,
            profile.real_name,
            self.real_name.unwrap_or_default(),
        ]
        .into_iter()
        .find(|n| !n.trim().is_empty())
        .unwrap_or(self.name)
    }
}

impl SlackClient {
    pub fn new(config: SlackConfig) -> SlackResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &SlackConfig {
        &self.config
    }

    /// Fetches every message of a thread, following pagination cursors.
    ///
    /// Stops early if the API hands back a cursor it already returned.
    #[instrument(skip(self), fields(channel = %thread.channel_id, ts = %thread.thread_ts))]
    pub async fn replies(&self, thread: &ThreadRef) -> SlackResult<Vec<RawMessage>> {
        let limit = REPLIES_PAGE_LIMIT.to_string();
        let mut messages = Vec::new();
        let mut cursor = String::new();
        let mut seen = HashSet::new();

        loop {
            let mut query = vec![
                ("channel", thread.channel_id.as_str()),
                ("ts", thread.thread_ts.as_str()),
                ("limit", limit.as_str()),
            ];
            if !cursor.is_empty() {
                query.push(("cursor", cursor.as_str()));
            }

            let page: RepliesResponse = self.api_get("conversations.replies", &query).await?;
            messages.extend(page.messages);

            match page.response_metadata {
                Some(meta) if !meta.next_cursor.is_empty() => {
                    if !seen.insert(meta.next_cursor.clone()) {
                        warn!(cursor = %meta.next_cursor, "Repeated pagination cursor, stopping");
                        break;
                    }
                    cursor = meta.next_cursor;
                }
                _ => break,
            }
        }

        debug!(count = messages.len(), "Fetched thread replies");
        Ok(messages)
    }

    /// The bot's own user id, from `auth.test`.
    pub async fn auth_test(&self) -> SlackResult<String> {
        let response: AuthTestResponse = self.api_post("auth.test", &json!({})).await?;
        Ok(response.user_id)
    }

    /// Best available name for a user, from `users.info`.
    pub async fn user_name(&self, user_id: &str) -> SlackResult<String> {
        let response: UserInfoResponse = self.api_get("users.info", &[("user", user_id)]).await?;
        Ok(response.user.display_name())
    }

    /// Posts a message only `user_id` can see, in the thread.
    #[instrument(skip(self, notice), fields(channel = %thread.channel_id))]
    pub async fn post_notice(
        &self,
        thread: &ThreadRef,
        user_id: &str,
        notice: &Notice,
    ) -> SlackResult<()> {
        let mut payload = json!({
            "channel": thread.channel_id,
            "user": user_id,
            "thread_ts": thread.thread_ts,
            "text": notice.body(),
        });
        if let Some(blocks) = notice_blocks(notice) {
            payload["blocks"] = blocks;
        }
        let _: Value = self.api_post("chat.postEphemeral", &payload).await?;
        Ok(())
    }

    /// Replaces an interactive message through its response URL.
    pub async fn respond(&self, response_url: &str, thread_ts: &str, text: &str) -> SlackResult<()> {
        let payload = json!({
            "replace_original": "true",
            "thread_ts": thread_ts,
            "text": text,
        });
        let response = self.http.post(response_url).json(&payload).send().await?;
        check_status(response).await.map(|_| ())
    }

    async fn api_get<T: DeserializeOwned>(&self, method: &str, query: &[(&str, &str)]) -> SlackResult<T> {
        let request = self.http.get(self.method_url(method)).query(query);
        self.send(method, request).await
    }

    async fn api_post<T: DeserializeOwned>(&self, method: &str, payload: &Value) -> SlackResult<T> {
        let request = self
            .http
            .post(self.method_url(method))
            .header("Content-Type", "application/json; charset=utf-8")
            .json(payload);
        self.send(method, request).await
    }

    async fn send<T: DeserializeOwned>(&self, method: &str, request: RequestBuilder) -> SlackResult<T> {
        let response = request.bearer_auth(self.config.bot_token()).send().await?;
        let body: Value = check_status(response).await?.json().await?;

        if body.get("ok").and_then(Value::as_bool) != Some(true) {
            let error = body
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown_error");
            return Err(SlackError::Api(format!("{}: {}", method, error)));
        }

        Ok(serde_json::from_value(body)?)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.config.api_base, method)
    }
}

/// Turns 429 and non-success statuses into errors.
async fn check_status(response: Response) -> SlackResult<Response> {
    if response.status() == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
        return Err(SlackError::RateLimited {
            retry_after_secs: retry_after,
        });
    }

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(SlackError::Api(format!("{}: {}", status, body)));
    }

    Ok(response)
}

#[async_trait]
impl ChatGateway for SlackClient {
    async fn thread_replies(&self, thread: &ThreadRef) -> grab_core::Result<Vec<RawMessage>> {
        Ok(self.replies(thread).await?)
    }

    async fn bot_user_id(&self) -> grab_core::Result<String> {
        Ok(self.auth_test().await?)
    }

    async fn user_display_name(&self, user_id: &str) -> grab_core::Result<String> {
        Ok(self.user_name(user_id).await?)
    }

    async fn post_ephemeral(
        &self,
        thread: &ThreadRef,
        user_id: &str,
        notice: Notice,
    ) -> grab_core::Result<()> {
        Ok(self.post_notice(thread, user_id, &notice).await?)
    }

    async fn replace_original(
        &self,
        response_url: &str,
        thread_ts: &str,
        text: &str,
    ) -> grab_core::Result<()> {
        Ok(self.respond(response_url, thread_ts, text).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(json: Value) -> SlackUser {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_display_name_preference() {
        let u = user(json!({"name": "al", "real_name": "Alice R",
            "profile": {"display_name": "alice", "real_name": "Alice Real"}}));
        assert_eq!(u.display_name(), "alice");

        let u = user(json!({"name": "al", "profile": {"display_name": "", "real_name": "Alice Real"}}));
        assert_eq!(u.display_name(), "Alice Real");

        let u = user(json!({"name": "al", "real_name": "Alice R"}));
        assert_eq!(u.display_name(), "Alice R");

        let u = user(json!({"name": "al"}));
        assert_eq!(u.display_name(), "al");
    }
}
