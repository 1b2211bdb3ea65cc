//! Chat Relay
//!
//! A realtime multi-channel chat relay. Clients connect over WebSocket, join
//! a named channel, rename themselves or switch channels without
//! reconnecting, and receive every message posted into their channel.
//!
//! # Modules
//!
//! - `types`: Core data structures (Participant)
//! - `registry`: Participant registry and the channel membership index
//! - `relay`: Connection sessions, broadcast dispatcher, wire events, `/ws`
//! - `api`: Axum router, `POST /message` and membership endpoints
//! - `validation`: Checks for untrusted payload fields
//! - `config`: Environment-driven server configuration
//! - `error`: Relay error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chat_relay::{create_router, RelayConfig, RelayState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = RelayConfig::from_env();
//!     let listener = tokio::net::TcpListener::bind(config.bind_addr()).await.unwrap();
//!     let app = create_router(Arc::new(RelayState::new(config)));
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod registry;
pub mod relay;
pub mod types;
pub mod validation;

// Re-export commonly used items at crate root
pub use api::create_router;
pub use config::RelayConfig;
pub use error::{RelayError, RelayResult};
pub use registry::{MembershipIndex, ParticipantRegistry};
pub use relay::{ClientEvent, ConnectionSession, RelayMessage, RelayState, ServerEvent, SessionState};
pub use types::{ConnectionId, Participant};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
