//! Participant types for the relay

use serde::{Deserialize, Serialize};

/// Identifier assigned by the transport when a connection opens
pub type ConnectionId = String;

/// One connected user, as recorded in the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ConnectionId,
    pub name: String,
    pub channel: String,
}

impl Participant {
    /// Create a new participant record
    pub fn new(id: impl Into<String>, name: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            channel: channel.into(),
        }
    }
}
