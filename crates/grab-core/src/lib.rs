//! Conversation-to-article pipeline for Grab.
//!
//! Given a chat mention, this crate interprets the command, packages the
//! thread into a wiki transcript, decides whether the write can go ahead and
//! either performs it or asks the user to confirm. Button clicks on that
//! prompt are resolved by [`GrabContext::handle_action`].
//!
//! The chat platform and the wiki are reached only through the
//! [`ChatGateway`] and [`WikiBackend`] traits.

pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod gateway;
pub mod identity;
pub mod interaction;
pub mod locks;
pub mod messages;
pub mod packager;
pub mod pending;
pub mod pipeline;

pub use config::GrabConfig;
pub use context::GrabContext;
pub use decision::{decide, PublishIntent, PublishRequest, SectionChoice, WikiFacts};
pub use error::{GrabError, Result};
pub use gateway::{publish, ChatGateway, Notice, WikiBackend, CANCEL_ACTION_ID, CONFIRM_ACTION_ID};
pub use identity::BotIdentity;
pub use interaction::ActionOutcome;
pub use locks::TitleLocks;
pub use packager::{NameCache, PackagedThread, ThreadPackager};
pub use pending::PendingStore;
pub use pipeline::MentionOutcome;
