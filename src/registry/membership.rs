//! Channel Membership Index
//!
//! A borrowed projection of the registry grouped by channel. Nothing is
//! cached: every query reads the registry as it is at call time.

use std::collections::BTreeMap;

use super::ParticipantRegistry;
use crate::types::{ConnectionId, Participant};

/// Read-only view grouping participants by channel
#[derive(Debug, Clone, Copy)]
pub struct MembershipIndex<'a> {
    registry: &'a ParticipantRegistry,
}

impl<'a> MembershipIndex<'a> {
    pub fn new(registry: &'a ParticipantRegistry) -> Self {
        Self { registry }
    }

    /// Participants recorded in `channel`; empty when nobody is there
    pub fn members_of(&self, channel: &str) -> Vec<Participant> {
        self.registry.list_by_channel(channel)
    }

    /// Ids of the participants in `channel` (the broadcast audience)
    pub fn member_ids(&self, channel: &str) -> Vec<ConnectionId> {
        self.registry
            .iter()
            .filter(|p| p.channel == channel)
            .map(|p| p.id.clone())
            .collect()
    }

    /// Every non-empty channel with its members
    pub fn channels(&self) -> BTreeMap<String, Vec<Participant>> {
        let mut grouped: BTreeMap<String, Vec<Participant>> = BTreeMap::new();
        for participant in self.registry.iter() {
            grouped
                .entry(participant.channel.clone())
                .or_default()
                .push(participant.clone());
        }
        grouped
    }
}
