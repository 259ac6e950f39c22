//! HTTP request handlers.

mod events;
mod health;
mod interactions;

pub use events::handle_event;
pub use health::{health, HealthResponse};
pub use interactions::handle_interaction;
