//! Channel membership endpoints
//!
//! Snapshots carry the relay's current sequence id so a client can line
//! them up with the events it sees on its socket.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use crate::relay::RelayState;
use crate::types::Participant;

/// Body of `GET /api/channels`
#[derive(Debug, Serialize)]
pub struct ChannelsSnapshot {
    pub channels: BTreeMap<String, Vec<Participant>>,
    pub sequence_id: u64,
}

/// Body of `GET /api/channels/:channel`
#[derive(Debug, Serialize)]
pub struct ChannelSnapshot {
    pub channel: String,
    pub participants: Vec<Participant>,
    pub sequence_id: u64,
}

/// GET /api/channels - Every non-empty channel with its participants
pub async fn list_channels(State(state): State<Arc<RelayState>>) -> impl IntoResponse {
    let snapshot = {
        let core = state.lock();
        ChannelsSnapshot {
            channels: core.registry.membership().channels(),
            sequence_id: core.current_sequence_id(),
        }
    };

    Json(snapshot)
}

/// GET /api/channels/:channel - Participants of one channel
///
/// An unknown channel is just an empty one.
pub async fn get_channel(
    State(state): State<Arc<RelayState>>,
    Path(channel): Path<String>,
) -> impl IntoResponse {
    let (participants, sequence_id) = {
        let core = state.lock();
        (core.registry.membership().members_of(&channel), core.current_sequence_id())
    };

    Json(ChannelSnapshot {
        channel,
        participants,
        sequence_id,
    })
}
