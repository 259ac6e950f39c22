//! MediaWiki backend for Grab.
//!
//! [`MediaWikiClient`] speaks the Action API: bot login, CSRF tokens, page
//! info, section listing and edits. It implements
//! [`grab_core::WikiBackend`] so the pipeline can write transcripts to a
//! wiki.
//!
//! Requests are retried with exponential backoff on HTTP 429, 5xx and
//! transport failures.

mod api;
mod backend;
pub mod client;
pub mod config;
pub mod error;

pub use client::{MediaWikiClient, Section};
pub use config::WikiConfig;
pub use error::{Result, WikiError};
