//! Wire events exchanged over the relay socket
//!
//! Frames are JSON text of the form `{"event": "<name>", "data": {...}}`.
//! Client frames are parsed loosely first and then validated field by field,
//! so a malformed payload only fails that one event.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{RelayError, RelayResult};
use crate::types::{ConnectionId, Participant, SYSTEM_SENDER};
use crate::validation::{optional_string, require_channel, require_string};

/// Raw client frame before validation
#[derive(Debug, Deserialize)]
struct ClientFrame {
    event: String,
    #[serde(default)]
    data: Value,
}

/// Validated client → server events
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientEvent {
    /// Join a channel (`newUser`)
    NewUser {
        id: Option<ConnectionId>,
        name: String,
        channel: String,
    },

    /// Rename within the current channel (`nameChange`)
    NameChange { name: String },

    /// Move to another channel (`channelChange`)
    ChannelChange { channel: String },

    /// Heartbeat
    Ping,
}

impl ClientEvent {
    /// Parse and validate a text frame
    pub fn parse(text: &str) -> RelayResult<Self> {
        let frame: ClientFrame = serde_json::from_str(text)
            .map_err(|e| RelayError::validation(format!("malformed frame: {}", e)))?;
        Self::from_parts(&frame.event, &frame.data)
    }

    /// Validate an already-decoded event name and payload
    pub fn from_parts(event: &str, data: &Value) -> RelayResult<Self> {
        match event {
            "newUser" => Ok(Self::NewUser {
                id: optional_string(data, "id")?,
                name: require_string(data, "name")?,
                channel: require_channel(data)?,
            }),
            "nameChange" => Ok(Self::NameChange {
                name: require_string(data, "name")?,
            }),
            "channelChange" => Ok(Self::ChannelChange {
                channel: require_channel(data)?,
            }),
            "ping" => Ok(Self::Ping),
            other => Err(RelayError::validation(format!("unknown event '{}'", other))),
        }
    }

    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewUser { .. } => "newUser",
            Self::NameChange { .. } => "nameChange",
            Self::ChannelChange { .. } => "channelChange",
            Self::Ping => "ping",
        }
    }
}

/// Server → client events
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Sent once to a new connection with its assigned id
    Connected { id: ConnectionId },

    /// Heartbeat reply
    Pong,

    /// Member list of a channel after someone joined it
    NewConnection { participants: Vec<Participant> },

    /// A member of the channel renamed themselves
    NameChanged { id: ConnectionId, name: String },

    /// Member list of a channel after someone switched into it
    ChannelChanged { participants: Vec<Participant> },

    /// A member left the channel (disconnect or switch)
    UserDisconnected { id: ConnectionId, sender: String },

    /// Chat message posted over HTTP
    IncomingMessage {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl ServerEvent {
    pub fn user_disconnected(id: impl Into<String>) -> Self {
        Self::UserDisconnected {
            id: id.into(),
            sender: SYSTEM_SENDER.to_string(),
        }
    }

    /// Event name as it appears on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::Pong => "pong",
            Self::NewConnection { .. } => "newConnection",
            Self::NameChanged { .. } => "nameChanged",
            Self::ChannelChanged { .. } => "channelChanged",
            Self::UserDisconnected { .. } => "userDisconnected",
            Self::IncomingMessage { .. } => "incomingMessage",
        }
    }
}

/// Outbound envelope with metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RelayMessage {
    /// The event
    #[serde(flatten)]
    pub event: ServerEvent,

    /// Monotonically increasing broadcast sequence, for gap detection
    pub sequence_id: u64,

    /// Unix timestamp when the message was created
    pub timestamp: i64,
}

impl RelayMessage {
    pub fn new(event: ServerEvent, sequence_id: u64) -> Self {
        Self {
            event,
            sequence_id,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}
