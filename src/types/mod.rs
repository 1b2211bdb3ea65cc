//! Data types for the chat relay
//!
//! This module contains the core data structures shared by the registry,
//! sessions and the HTTP layer.

mod participant;

pub use participant::{ConnectionId, Participant};

/// Result type for process-level operations (server startup, binding)
pub type ServerResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Sender tag attached to membership notices
pub const SYSTEM_SENDER: &str = "system";
