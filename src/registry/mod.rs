//! Participant Registry
//!
//! Holds the authoritative set of connected participants. The registry itself
//! is not synchronized: it lives inside [`crate::relay::RelayCore`] behind a
//! single lock, so every mutation and the broadcast snapshot taken after it
//! happen in one critical section.

pub mod membership;

use crate::error::{RelayError, RelayResult};
use crate::types::Participant;

pub use membership::MembershipIndex;

/// Canonical participant records, in insertion order
#[derive(Debug, Default, Clone)]
pub struct ParticipantRegistry {
    participants: Vec<Participant>,
}

impl ParticipantRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new record
    pub fn add(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        channel: impl Into<String>,
    ) -> RelayResult<&Participant> {
        let id = id.into();
        if self.position(&id).is_some() {
            return Err(RelayError::DuplicateParticipant(id));
        }

        self.participants.push(Participant::new(id, name, channel));
        let index = self.participants.len() - 1;
        Ok(&self.participants[index])
    }

    /// Delete a record, returning it
    pub fn remove(&mut self, id: &str) -> RelayResult<Participant> {
        let index = self
            .position(id)
            .ok_or_else(|| RelayError::UnknownParticipant(id.to_string()))?;
        Ok(self.participants.remove(index))
    }

    /// Change a participant's display name
    pub fn set_name(&mut self, id: &str, name: impl Into<String>) -> RelayResult<&Participant> {
        let participant = self.get_mut(id)?;
        participant.name = name.into();
        Ok(participant)
    }

    /// Move a participant to another channel, returning the channel it left
    pub fn set_channel(&mut self, id: &str, channel: impl Into<String>) -> RelayResult<String> {
        let participant = self.get_mut(id)?;
        Ok(std::mem::replace(&mut participant.channel, channel.into()))
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Participants currently in `channel`, in insertion order
    pub fn list_by_channel(&self, channel: &str) -> Vec<Participant> {
        self.participants
            .iter()
            .filter(|p| p.channel == channel)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter()
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Borrow the membership view over this registry
    pub fn membership(&self) -> MembershipIndex<'_> {
        MembershipIndex::new(self)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.participants.iter().position(|p| p.id == id)
    }

    fn get_mut(&mut self, id: &str) -> RelayResult<&mut Participant> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| RelayError::UnknownParticipant(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lobby_with_alice_and_bob() -> ParticipantRegistry {
        let mut registry = ParticipantRegistry::new();
        registry.add("a", "Alice", "lobby").unwrap();
        registry.add("b", "Bob", "lobby").unwrap();
        registry
    }

    #[test]
    fn test_add_and_get() {
        let registry = lobby_with_alice_and_bob();

        assert_eq!(registry.len(), 2);
        let alice = registry.get("a").unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.channel, "lobby");
        assert!(registry.get("z").is_none());
    }

    #[test]
    fn test_add_duplicate_rejected() {
        let mut registry = lobby_with_alice_and_bob();

        let err = registry.add("a", "Impostor", "hallway").unwrap_err();
        assert_eq!(err, RelayError::DuplicateParticipant("a".to_string()));

        // Original record untouched
        assert_eq!(registry.get("a").unwrap().name, "Alice");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_remove() {
        let mut registry = lobby_with_alice_and_bob();

        let removed = registry.remove("a").unwrap();
        assert_eq!(removed.name, "Alice");
        assert!(registry.get("a").is_none());

        let err = registry.remove("a").unwrap_err();
        assert_eq!(err, RelayError::UnknownParticipant("a".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_set_name() {
        let mut registry = lobby_with_alice_and_bob();

        registry.set_name("a", "Alicia").unwrap();
        assert_eq!(registry.get("a").unwrap().name, "Alicia");

        assert!(matches!(
            registry.set_name("z", "Zed"),
            Err(RelayError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn test_set_channel_returns_previous() {
        let mut registry = lobby_with_alice_and_bob();

        let old = registry.set_channel("a", "hallway").unwrap();
        assert_eq!(old, "lobby");
        assert_eq!(registry.get("a").unwrap().channel, "hallway");

        assert!(matches!(
            registry.set_channel("z", "hallway"),
            Err(RelayError::UnknownParticipant(_))
        ));
    }

    #[test]
    fn test_list_by_channel_insertion_order() {
        let mut registry = lobby_with_alice_and_bob();
        registry.add("c", "Carol", "hallway").unwrap();
        registry.add("d", "Dave", "lobby").unwrap();

        let ids: Vec<String> = registry
            .list_by_channel("lobby")
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["a", "b", "d"]);
        assert!(registry.list_by_channel("attic").is_empty());
    }
}
