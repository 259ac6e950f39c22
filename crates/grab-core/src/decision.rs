//! Publish decision engine.
//!
//! [`decide`] is a pure function of the request and the wiki facts. The
//! facts are collected separately by [`gather_facts`], which treats lookup
//! failures as "does not exist".

use grab_models::{ArticleInfo, PublishDecision, WriteTarget};
use tracing::warn;

use crate::gateway::WikiBackend;

/// Reject reason when appending to a missing article.
pub const MISSING_ARTICLE_REASON: &str =
    "That article doesn't exist. Try again without the \"append\" subcommand.";

/// Reject reason when appending to a missing section.
pub const MISSING_SECTION_REASON: &str =
    "That section doesn't exist. Try again without the \"append\" subcommand.";

/// What the user asked the wiki write to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishIntent {
    /// Default and `range`.
    Save,
    /// `append`, optionally clobbering.
    Append { clobber: bool },
}

/// A section heading and whether the user typed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionChoice {
    pub name: String,
    pub explicit: bool,
}

impl SectionChoice {
    pub fn explicit(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            explicit: true,
        }
    }

    pub fn inferred(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            explicit: false,
        }
    }
}

/// Title and section a write is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub title: String,
    pub section: Option<SectionChoice>,
}

impl PublishRequest {
    pub fn new(title: impl Into<String>, section: Option<SectionChoice>) -> Self {
        Self {
            title: title.into(),
            section,
        }
    }

    fn explicit_section(&self) -> Option<&str> {
        self.section
            .as_ref()
            .filter(|s| s.explicit)
            .map(|s| s.name.as_str())
    }

    fn section_name(&self) -> Option<&str> {
        self.section.as_ref().map(|s| s.name.as_str())
    }
}

/// Existence facts the decision depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WikiFacts {
    pub article: ArticleInfo,
    pub section_exists: bool,
}

/// Look up the facts for `request`.
///
/// The section is only checked when the article exists.
pub async fn gather_facts(wiki: &dyn WikiBackend, request: &PublishRequest) -> WikiFacts {
    let article = match wiki.article(&request.title).await {
        Ok(article) => article,
        Err(e) => {
            warn!(title = %request.title, error = %e, "Article lookup failed");
            ArticleInfo::missing()
        }
    };

    let section_exists = match (article.exists, request.section_name()) {
        (true, Some(section)) => match wiki.section_exists(&request.title, section).await {
            Ok(found) => found,
            Err(e) => {
                warn!(title = %request.title, section = %section, error = %e, "Section lookup failed");
                false
            }
        },
        _ => false,
    };

    WikiFacts {
        article,
        section_exists,
    }
}

/// Decide what to do with a write request.
pub fn decide(intent: PublishIntent, request: &PublishRequest, facts: &WikiFacts) -> PublishDecision {
    let existing_url = || {
        facts
            .article
            .url
            .clone()
            .unwrap_or_else(|| request.title.clone())
    };

    match intent {
        PublishIntent::Save => {
            if !facts.article.exists {
                let target = match request.explicit_section() {
                    Some(section) => WriteTarget::section(&request.title, section),
                    None => WriteTarget::page(&request.title),
                };
                return PublishDecision::PublishDirect { target };
            }
            match request.section_name() {
                // nothing to collide with, write the whole page
                None => PublishDecision::PublishDirect {
                    target: WriteTarget::page(&request.title),
                },
                Some(section) if !facts.section_exists => PublishDecision::PublishDirect {
                    target: WriteTarget::section(&request.title, section),
                },
                Some(_) => PublishDecision::ConfirmOverwrite {
                    existing_url: existing_url(),
                    target: WriteTarget::page(&request.title),
                },
            }
        }
        PublishIntent::Append { clobber } => {
            if !facts.article.exists {
                return PublishDecision::Reject {
                    reason: MISSING_ARTICLE_REASON.to_string(),
                };
            }
            if request.explicit_section().is_some() && !facts.section_exists {
                return PublishDecision::Reject {
                    reason: MISSING_SECTION_REASON.to_string(),
                };
            }
            let target = match request.section_name() {
                Some(section) => WriteTarget::section(&request.title, section),
                None => WriteTarget::page(&request.title),
            };
            if clobber {
                PublishDecision::ConfirmOverwrite {
                    existing_url: existing_url(),
                    target,
                }
            } else {
                PublishDecision::PublishDirect {
                    target: target.appending(),
                }
            }
        }
    }
}
