//! Chat Relay Server - Binary Entry Point
//!
//! Serves the relay over HTTP/WebSocket until Ctrl+C.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use chat_relay::types::ServerResult;
use chat_relay::{create_router, RelayConfig, RelayState, NAME, VERSION};

const DEFAULT_LOG_FILTER: &str = "chat_relay=info,chat_relay_server=info,tower_http=info";

#[tokio::main]
async fn main() -> ServerResult<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = RelayConfig::from_env();
    let bind_addr = config.bind_addr();
    let state = Arc::new(RelayState::new(config));
    let app = create_router(state);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    if let Err(err) = ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    }) {
        tracing::warn!(error = %err, "Could not install Ctrl+C handler");
    }

    let listener = tokio::net::TcpListener::bind(bind_addr.as_str()).await?;
    tracing::info!(name = NAME, version = VERSION, addr = %bind_addr, "Chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.wait_for(|stopped| *stopped).await;
            tracing::info!("Shutting down");
        })
        .await?;

    Ok(())
}
