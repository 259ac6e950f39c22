//! Router configuration and server setup.

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::handlers;
use crate::state::AppState;

/// Creates the intake router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/event/handle", post(handlers::handle_event))
        .route("/interaction/handle", post(handlers::handle_interaction))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

/// Starts the intake server.
pub async fn serve(config: &ServerConfig, state: AppState) -> Result<(), std::io::Error> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Grab listening on {}", addr);
    axum::serve(listener, create_router(state)).await
}
