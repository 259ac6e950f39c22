//! Response shapes of the MediaWiki Action API (`formatversion=2`).

use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenQueryResponse {
    #[serde(default)]
    pub query: TokenQueryPayload,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenQueryPayload {
    pub tokens: Option<TokenPayload>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct TokenPayload {
    pub logintoken: Option<String>,
    pub csrftoken: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub login: LoginPayload,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct LoginPayload {
    pub result: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct InfoResponse {
    #[serde(default)]
    pub query: InfoQuery,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct InfoQuery {
    #[serde(default)]
    pub pages: Vec<InfoPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InfoPage {
    pub title: String,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub invalid: bool,
    pub invalidreason: Option<String>,
    pub fullurl: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ParseResponse {
    pub parse: Option<ParsePayload>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct ParsePayload {
    #[serde(default)]
    pub sections: Vec<ParseSection>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ParseSection {
    pub level: String,
    pub line: String,
    pub index: String,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct EditResponse {
    pub edit: Option<EditPayload>,
}

#[derive(Debug, Deserialize, Default)]
pub(crate) struct EditPayload {
    pub result: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub nochange: bool,
}
