//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::rest::{channels, message};
use crate::relay::{handler::ws_handler, RelayState};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<RelayState>) -> Router {
    // Participants are unauthenticated, so any origin may connect
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket endpoint
        .route("/ws", get(ws_handler))
        // Health check
        .route("/health", get(health_check))
        // Message ingress
        .route("/message", post(message::post_message))
        // Membership inspection
        .route("/api/channels", get(channels::list_channels))
        .route("/api/channels/:channel", get(channels::get_channel))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
