//! Slack integration for Grab.
//!
//! - [`SlackClient`] implements [`grab_core::ChatGateway`] on the Web API.
//! - [`create_router`] serves the Events API and interactivity endpoints,
//!   acknowledging each delivery at once and handling it on its own task.
//! - [`SignatureVerifier`] checks `X-Slack-Signature` on every request when
//!   a signing secret is configured.
//!
//! # Endpoints
//!
//! - `POST /event/handle` - Events API (`url_verification`, `app_mention`)
//! - `POST /interaction/handle` - button clicks on overwrite prompts
//! - `GET /health` - liveness

pub mod blocks;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod payloads;
pub mod router;
pub mod signature;
pub mod state;

pub use client::SlackClient;
pub use config::{ServerConfig, SlackConfig};
pub use error::{SlackError, SlackResult};
pub use router::{create_router, serve};
pub use signature::SignatureVerifier;
pub use state::AppState;
