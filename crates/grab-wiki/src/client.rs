//! Async MediaWiki Action API client.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use grab_models::ArticleInfo;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::api::{EditResponse, InfoResponse, LoginResponse, ParseResponse, TokenQueryResponse};
use crate::config::WikiConfig;
use crate::error::{Result, WikiError};

/// A section heading of an article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Position used by `action=edit&section=`.
    pub index: u32,
    /// Heading level, 2 for `== Heading ==`.
    pub level: usize,
    pub heading: String,
}

/// Content half of an edit request.
#[derive(Debug, Clone)]
enum EditBody<'a> {
    Page(&'a str),
    Section { index: u32, text: String },
    NewSection { heading: &'a str, text: &'a str },
    Append { section: Option<u32>, text: String },
}

impl EditBody<'_> {
    fn fields(&self) -> Vec<(&'static str, String)> {
        match self {
            EditBody::Page(text) => vec![("text", text.to_string())],
            EditBody::Section { index, text } => {
                vec![("section", index.to_string()), ("text", text.clone())]
            }
            EditBody::NewSection { heading, text } => vec![
                ("section", "new".to_string()),
                ("sectiontitle", heading.to_string()),
                ("text", text.to_string()),
            ],
            EditBody::Append { section, text } => {
                let mut fields = Vec::with_capacity(2);
                if let Some(index) = section {
                    fields.push(("section", index.to_string()));
                }
                fields.push(("appendtext", text.clone()));
                fields
            }
        }
    }
}

/// Client for one wiki, logged in as one bot account.
///
/// Session cookies live in the HTTP client's cookie store. The CSRF token is
/// fetched on first write and refreshed when the wiki rejects it.
pub struct MediaWikiClient {
    http: Client,
    api_url: Url,
    config: WikiConfig,
    csrf_token: Mutex<Option<String>>,
}

impl MediaWikiClient {
    /// Builds a client without logging in.
    pub fn new(config: WikiConfig) -> Result<Self> {
        let api_url = Url::parse(&config.api_url).map_err(|source| WikiError::InvalidUrl {
            url: config.api_url.clone(),
            source,
        })?;
        let http = Client::builder()
            .timeout(config.timeout)
            .cookie_store(true)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            api_url,
            config,
            csrf_token: Mutex::new(None),
        })
    }

    /// Builds a client and logs in.
    pub async fn connect(config: WikiConfig) -> Result<Self> {
        let client = Self::new(config)?;
        client.login().await?;
        Ok(client)
    }

    pub fn config(&self) -> &WikiConfig {
        &self.config
    }

    /// Logs in with the configured bot account.
    pub async fn login(&self) -> Result<()> {
        let response = self
            .get(&[
                ("action", "query".to_string()),
                ("meta", "tokens".to_string()),
                ("type", "login".to_string()),
            ])
            .await?;
        let login_token = serde_json::from_value::<TokenQueryResponse>(response)?
            .query
            .tokens
            .and_then(|tokens| tokens.logintoken)
            .ok_or_else(|| WikiError::UnexpectedResponse("no login token".to_string()))?;

        let mut params = vec![
            ("action", "login".to_string()),
            ("lgname", self.config.username.clone()),
            ("lgpassword", self.config.password.clone()),
        ];
        if let Some(domain) = &self.config.domain {
            params.push(("lgdomain", domain.clone()));
        }
        params.push(("lgtoken", login_token));

        let response = self.post(&params, false).await?;
        let login = serde_json::from_value::<LoginResponse>(response)?.login;
        match login.result.as_deref() {
            Some("Success") => {
                *self.csrf_token.lock().await = None;
                info!(user = %self.config.username, wiki = %self.api_url, "Logged in to wiki");
                Ok(())
            }
            other => Err(WikiError::Login(
                login
                    .reason
                    .or_else(|| other.map(ToString::to_string))
                    .unwrap_or_else(|| "unknown error".to_string()),
            )),
        }
    }

    /// Existence and canonical URL of `title`.
    pub async fn page_info(&self, title: &str) -> Result<ArticleInfo> {
        let response = self
            .get(&[
                ("action", "query".to_string()),
                ("prop", "info".to_string()),
                ("inprop", "url".to_string()),
                ("titles", title.to_string()),
            ])
            .await?;
        let page = serde_json::from_value::<InfoResponse>(response)?
            .query
            .pages
            .into_iter()
            .next()
            .ok_or_else(|| WikiError::UnexpectedResponse(format!("no page info for {}", title)))?;

        if page.invalid {
            return Err(WikiError::Api {
                code: "invalidtitle".to_string(),
                info: page
                    .invalidreason
                    .unwrap_or_else(|| format!("Bad title \"{}\"", page.title)),
            });
        }
        Ok(ArticleInfo {
            exists: !page.missing,
            url: page.fullurl,
        })
    }

    /// Section headings of `title`, in page order. A missing page has none.
    pub async fn sections(&self, title: &str) -> Result<Vec<Section>> {
        let response = self
            .get(&[
                ("action", "parse".to_string()),
                ("page", title.to_string()),
                ("prop", "sections".to_string()),
            ])
            .await;
        let response = match response {
            Err(e) if e.api_code() == Some("missingtitle") => return Ok(Vec::new()),
            other => other?,
        };

        let sections = serde_json::from_value::<ParseResponse>(response)?
            .parse
            .map(|p| p.sections)
            .unwrap_or_default()
            .into_iter()
            // transcluded sections have indexes like "T-1" and can't be edited here
            .filter_map(|s| {
                Some(Section {
                    index: s.index.parse().ok()?,
                    level: s.level.parse().unwrap_or(2),
                    heading: s.line,
                })
            })
            .collect();
        Ok(sections)
    }

    /// The first section of `title` whose heading is `heading`.
    pub async fn find_section(&self, title: &str, heading: &str) -> Result<Option<Section>> {
        let heading = heading.trim();
        Ok(self
            .sections(title)
            .await?
            .into_iter()
            .find(|s| s.heading.trim() == heading))
    }

    /// Replaces or creates the whole page.
    pub async fn write_page(&self, title: &str, body: &str) -> Result<String> {
        self.edit(title, EditBody::Page(body)).await
    }

    /// Replaces the section headed `heading`, or adds it at the end.
    pub async fn write_section(&self, title: &str, heading: &str, body: &str) -> Result<String> {
        let edit = match self.find_section(title, heading).await? {
            Some(section) => {
                let marks = "=".repeat(section.level);
                EditBody::Section {
                    index: section.index,
                    text: format!("{marks} {} {marks}\n\n{}", section.heading, body),
                }
            }
            None => EditBody::NewSection {
                heading,
                text: body,
            },
        };
        self.edit(title, edit).await
    }

    /// Appends `body` to the page or to the section headed `heading`.
    pub async fn append_text(&self, title: &str, heading: Option<&str>, body: &str) -> Result<String> {
        let section = match heading {
            Some(heading) => Some(
                self.find_section(title, heading)
                    .await?
                    .ok_or_else(|| WikiError::SectionNotFound {
                        title: title.to_string(),
                        section: heading.to_string(),
                    })?
                    .index,
            ),
            None => None,
        };
        self.edit(
            title,
            EditBody::Append {
                section,
                text: format!("\n\n{}", body),
            },
        )
        .await
    }

    async fn edit(&self, title: &str, body: EditBody<'_>) -> Result<String> {
        let result = match self.try_edit(title, &body).await {
            Err(e) if e.api_code() == Some("badtoken") => {
                debug!(title = %title, "CSRF token rejected, refreshing");
                *self.csrf_token.lock().await = None;
                self.try_edit(title, &body).await
            }
            Err(e) if matches!(e.api_code(), Some("assertuserfailed" | "assertbotfailed")) => {
                warn!(title = %title, "Wiki session expired, logging in again");
                self.login().await?;
                self.try_edit(title, &body).await
            }
            other => other,
        };
        let edited = result?;
        self.page_info(&edited)
            .await?
            .url
            .ok_or_else(|| WikiError::UnexpectedResponse(format!("no URL for {}", edited)))
    }

    /// Performs one edit and returns the normalized title.
    async fn try_edit(&self, title: &str, body: &EditBody<'_>) -> Result<String> {
        let token = self.csrf_token().await?;
        let mut params = vec![
            ("action", "edit".to_string()),
            ("title", title.to_string()),
            ("summary", self.config.edit_summary.clone()),
            ("assert", "user".to_string()),
        ];
        params.extend(body.fields());
        params.push(("token", token));

        let response = self.post(&params, true).await?;
        let edit = serde_json::from_value::<EditResponse>(response)?
            .edit
            .ok_or_else(|| WikiError::UnexpectedResponse("missing edit payload".to_string()))?;
        if edit.result.as_deref() != Some("Success") {
            return Err(WikiError::Edit {
                title: title.to_string(),
                result: edit.result.unwrap_or_else(|| "unknown".to_string()),
            });
        }
        info!(title = %title, nochange = edit.nochange, "Wiki edit saved");
        Ok(edit.title.unwrap_or_else(|| title.to_string()))
    }

    async fn csrf_token(&self) -> Result<String> {
        let mut cached = self.csrf_token.lock().await;
        if let Some(token) = cached.as_ref() {
            return Ok(token.clone());
        }
        let response = self
            .get(&[
                ("action", "query".to_string()),
                ("meta", "tokens".to_string()),
            ])
            .await?;
        let token = serde_json::from_value::<TokenQueryResponse>(response)?
            .query
            .tokens
            .and_then(|tokens| tokens.csrftoken)
            .ok_or_else(|| WikiError::UnexpectedResponse("no csrf token".to_string()))?;
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn get(&self, params: &[(&str, String)]) -> Result<Value> {
        self.request(Method::GET, params, false).await
    }

    async fn post(&self, params: &[(&str, String)], is_write: bool) -> Result<Value> {
        self.request(Method::POST, params, is_write).await
    }

    async fn request(&self, method: Method, params: &[(&str, String)], is_write: bool) -> Result<Value> {
        let max_retries = if is_write {
            self.config.max_write_retries
        } else {
            self.config.max_retries
        };

        let mut pairs = Vec::with_capacity(params.len() + 2);
        pairs.push(("format", "json".to_string()));
        pairs.push(("formatversion", "2".to_string()));
        pairs.extend(
            params
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| (*key, value.clone())),
        );

        let mut attempt = 0;
        loop {
            let request = self.http.request(method.clone(), self.api_url.clone());
            let request = if method == Method::GET {
                request.query(&pairs)
            } else {
                request.form(&pairs)
            };

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if !status.is_success() {
                        if attempt < max_retries && is_retryable_status(status) {
                            self.wait_before_retry(attempt, is_write, &status.to_string()).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(WikiError::Status(status.as_u16()));
                    }

                    let payload: Value = response.json().await?;
                    if let Some(error) = payload.get("error") {
                        let field = |name: &str, default: &str| {
                            error
                                .get(name)
                                .and_then(Value::as_str)
                                .unwrap_or(default)
                                .to_string()
                        };
                        return Err(WikiError::Api {
                            code: field("code", "unknown_error"),
                            info: field("info", "unknown info"),
                        });
                    }
                    return Ok(payload);
                }
                Err(e) => {
                    if attempt < max_retries && is_retryable_error(&e) {
                        self.wait_before_retry(attempt, is_write, &e.to_string()).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }

    async fn wait_before_retry(&self, attempt: usize, is_write: bool, reason: &str) {
        let exponent = u32::try_from(attempt).unwrap_or(16);
        let base = self
            .config
            .retry_delay
            .saturating_mul(2u32.saturating_pow(exponent));
        let base = if is_write { base.saturating_mul(2) } else { base };
        let jitter = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| Duration::from_millis(u64::from(d.subsec_millis() % 100)))
            .unwrap_or_default();
        let delay = if self.config.retry_delay.is_zero() {
            Duration::ZERO
        } else {
            base + jitter
        };
        warn!(attempt = attempt + 1, delay_ms = delay.as_millis() as u64, reason = %reason, "Retrying wiki request");
        tokio::time::sleep(delay).await;
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
        )
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(is_retryable_status(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(!is_retryable_status(StatusCode::FORBIDDEN));
        assert!(!is_retryable_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn test_edit_fields() {
        let fields = EditBody::NewSection {
            heading: "Notes",
            text: "body",
        }
        .fields();
        assert_eq!(
            fields,
            vec![
                ("section", "new".to_string()),
                ("sectiontitle", "Notes".to_string()),
                ("text", "body".to_string()),
            ]
        );

        let fields = EditBody::Append {
            section: None,
            text: "more".to_string(),
        }
        .fields();
        assert_eq!(fields, vec![("appendtext", "more".to_string())]);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let config = WikiConfig::new("not a url", "grab", "pw");
        assert!(matches!(
            MediaWikiClient::new(config),
            Err(WikiError::InvalidUrl { .. })
        ));
    }
}
