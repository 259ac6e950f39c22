//! Intake server end to end: signed Slack deliveries in, Slack Web API calls
//! out (mocked), wiki writes recorded by an in-memory backend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use grab_core::{BotIdentity, GrabConfig, GrabContext, Result, WikiBackend, CANCEL_ACTION_ID};
use grab_models::{ArticleInfo, PendingOverwrite, ThreadRef, WriteTarget};
use grab_slack::{create_router, AppState, ServerConfig, SignatureVerifier, SlackClient, SlackConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
const THREAD_TS: &str = "1700000000.000001";

#[derive(Default)]
struct MemoryWiki {
    pages: Mutex<HashMap<String, String>>,
}

impl MemoryWiki {
    fn url(title: &str) -> String {
        format!("https://wiki.example.com/index.php/{}", title)
    }
}

#[async_trait]
impl WikiBackend for MemoryWiki {
    async fn article(&self, title: &str) -> Result<ArticleInfo> {
        Ok(match self.pages.lock().unwrap().contains_key(title) {
            true => ArticleInfo::existing(Self::url(title)),
            false => ArticleInfo::missing(),
        })
    }

    async fn section_exists(&self, _title: &str, _section: &str) -> Result<bool> {
        Ok(false)
    }

    async fn write_page(&self, title: &str, body: &str) -> Result<String> {
        self.pages
            .lock()
            .unwrap()
            .insert(title.to_string(), body.to_string());
        Ok(Self::url(title))
    }

    async fn write_section(&self, title: &str, section: &str, body: &str) -> Result<String> {
        self.write_page(title, &format!("== {} ==\n\n{}", section, body)).await
    }

    async fn append(&self, title: &str, _section: Option<&str>, body: &str) -> Result<String> {
        let mut pages = self.pages.lock().unwrap();
        pages.entry(title.to_string()).or_default().push_str(body);
        Ok(Self::url(title))
    }
}

async fn mount_slack(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/conversations.replies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "messages": [
                {"user": "U1", "text": "hi", "ts": THREAD_TS},
                {"user": "U1", "text": "let's save this", "ts": "1700000000.000002"},
                {"user": "U1", "text": "<@UBOT>", "ts": "1700000000.000003", "thread_ts": THREAD_TS}
            ]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users.info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true, "user": {"id": "U1", "name": "alice"}
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat.postEphemeral"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/actions/1"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn make_state(slack: &MockServer, wiki: Arc<MemoryWiki>) -> AppState {
    let config = SlackConfig::new("xoxb-test")
        .unwrap()
        .with_api_base(format!("{}/api", slack.uri()));
    let chat = Arc::new(SlackClient::new(config).unwrap());
    let grab = GrabContext::new(chat, wiki, GrabConfig::default())
        .with_identity(BotIdentity::known("UBOT"));
    AppState::new(
        ServerConfig::default(),
        grab,
        Some(SignatureVerifier::new(SECRET)),
    )
}

fn signed(body: &str) -> (String, String) {
    let ts = chrono::Utc::now().timestamp().to_string();
    let signature = SignatureVerifier::new(SECRET)
        .sign(&ts, body.as_bytes())
        .unwrap();
    (ts, signature)
}

/// Posts `body` with the given Slack headers.
async fn post(server: &TestServer, path: &str, body: String, headers: &[(&'static str, String)]) -> TestResponse {
    let mut request = server.post(path);
    for (name, value) in headers {
        request = request.add_header(
            HeaderName::from_static(*name),
            HeaderValue::from_str(value).unwrap(),
        );
    }
    request.text(body).await
}

/// Posts `body` with a valid signature.
async fn post_signed(server: &TestServer, path: &str, body: String) -> TestResponse {
    let (ts, signature) = signed(&body);
    post(
        server,
        path,
        body,
        &[
            ("x-slack-request-timestamp", ts),
            ("x-slack-signature", signature),
        ],
    )
    .await
}

/// Waits for the first request to `path` seen by the mock server.
async fn wait_for(server: &MockServer, path: &str) -> Option<Request> {
    for _ in 0..100 {
        let received = server.received_requests().await.unwrap_or_default();
        if let Some(req) = received.into_iter().find(|r| r.url.path() == path) {
            return Some(req);
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    None
}

fn mention_body() -> String {
    json!({
        "type": "event_callback",
        "team_id": "T1",
        "event_id": "Ev1",
        "event": {
            "type": "app_mention",
            "user": "U1",
            "text": "<@UBOT>",
            "ts": "1700000000.000003",
            "thread_ts": THREAD_TS,
            "channel": "C1"
        }
    })
    .to_string()
}

#[tokio::test]
async fn test_mention_creates_article_and_replies() {
    let slack = MockServer::start().await;
    mount_slack(&slack).await;
    let wiki = Arc::new(MemoryWiki::default());
    let server = TestServer::new(create_router(make_state(&slack, wiki.clone()))).unwrap();

    let response = post_signed(&server, "/event/handle", mention_body()).await;
    response.assert_status_ok();

    let reply = wait_for(&slack, "/api/chat.postEphemeral")
        .await
        .expect("no ephemeral reply");
    let reply: Value = serde_json::from_slice(&reply.body).unwrap();
    assert_eq!(reply["user"], "U1");
    assert_eq!(reply["thread_ts"], THREAD_TS);
    assert!(reply["text"]
        .as_str()
        .unwrap()
        .contains("https://wiki.example.com/index.php/hi"));

    let pages = wiki.pages.lock().unwrap();
    let page = pages.get("hi").expect("article not written");
    assert!(page.contains("alice: hi"));
    assert!(page.contains("alice: let's save this"));
    assert!(!page.contains("<@UBOT>"));
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let slack = MockServer::start().await;
    let server = TestServer::new(create_router(make_state(
        &slack,
        Arc::new(MemoryWiki::default()),
    )))
    .unwrap();

    let body = mention_body();
    let (ts, _) = signed(&body);
    let response = post(
        &server,
        "/event/handle",
        body,
        &[
            ("x-slack-request-timestamp", ts),
            ("x-slack-signature", "v0=deadbeef".to_string()),
        ],
    )
    .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = post(&server, "/interaction/handle", "payload={}".to_string(), &[]).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_retry_delivery_is_acknowledged_only() {
    let slack = MockServer::start().await;
    mount_slack(&slack).await;
    let wiki = Arc::new(MemoryWiki::default());
    let server = TestServer::new(create_router(make_state(&slack, wiki.clone()))).unwrap();

    let body = mention_body();
    let (ts, signature) = signed(&body);
    let response = post(
        &server,
        "/event/handle",
        body,
        &[
            ("x-slack-request-timestamp", ts),
            ("x-slack-signature", signature),
            ("x-slack-retry-num", "1".to_string()),
            ("x-slack-retry-reason", "http_timeout".to_string()),
        ],
    )
    .await;
    response.assert_status_ok();

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(slack.received_requests().await.unwrap_or_default().is_empty());
    assert!(wiki.pages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_click_replaces_prompt() {
    let slack = MockServer::start().await;
    mount_slack(&slack).await;
    let wiki = Arc::new(MemoryWiki::default());
    let state = make_state(&slack, wiki.clone());
    let pending = PendingOverwrite::new(&ThreadRef::new("C1", THREAD_TS), "U1", WriteTarget::page("hi"));
    let prompt_id = pending.id.clone();
    state.grab.pending().insert(pending).await;
    let grab = state.grab.clone();
    let server = TestServer::new(create_router(state)).unwrap();

    let payload = json!({
        "type": "block_actions",
        "user": {"id": "U1"},
        "container": {"channel_id": "C1", "message_ts": "1700000000.000004", "thread_ts": THREAD_TS},
        "response_url": format!("{}/actions/1", slack.uri()),
        "actions": [{"action_id": CANCEL_ACTION_ID, "value": prompt_id}]
    })
    .to_string();
    let body: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("payload", &payload)
        .finish();

    let response = post_signed(&server, "/interaction/handle", body).await;
    response.assert_status_ok();

    let edit = wait_for(&slack, "/actions/1").await.expect("prompt not replaced");
    let edit: Value = serde_json::from_slice(&edit.body).unwrap();
    assert_eq!(edit["text"], "Grab request cancelled.");
    assert_eq!(edit["replace_original"], "true");

    assert!(grab.pending().is_empty().await);
    assert!(wiki.pages.lock().unwrap().is_empty());
}
