//! Relay core: sessions, broadcast fan-out and the WebSocket transport
//!
//! Provides the `/ws` endpoint. Each socket gets a [`ConnectionSession`]
//! that applies `newUser` / `nameChange` / `channelChange` events to the
//! shared registry and broadcasts the outcome to the affected channels.

pub mod dispatcher;
pub mod events;
pub mod handler;
pub mod session;
pub mod state;

// Re-export commonly used items
pub use dispatcher::{ConnectionSender, Transports};
pub use events::{ClientEvent, RelayMessage, ServerEvent};
pub use session::{ConnectionSession, SessionState};
pub use state::{RelayCore, RelayState};
