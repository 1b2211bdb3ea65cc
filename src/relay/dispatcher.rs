//! Broadcast Dispatcher
//!
//! Owns the transport table (one outbound handle per connection, plus the
//! channel that handle is subscribed to) and fans events out to the members
//! of a channel as resolved through the membership index.

use std::collections::HashMap;

use tokio::sync::mpsc;

use super::events::RelayMessage;
use crate::registry::ParticipantRegistry;
use crate::types::ConnectionId;

/// Sender half feeding one connection's writer task.
/// Unbounded, so enqueueing never blocks while the relay lock is held.
pub type ConnectionSender = mpsc::UnboundedSender<RelayMessage>;

#[derive(Debug)]
struct TransportHandle {
    sender: ConnectionSender,
    channel: Option<String>,
}

/// Live connections and their channel subscriptions
#[derive(Debug, Default)]
pub struct Transports {
    handles: HashMap<ConnectionId, TransportHandle>,
}

impl Transports {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the outbound handle of a freshly opened connection
    pub fn attach(&mut self, id: impl Into<String>, sender: ConnectionSender) {
        self.handles.insert(
            id.into(),
            TransportHandle {
                sender,
                channel: None,
            },
        );
    }

    /// Drop a connection's handle. Returns false if it was already gone.
    pub fn detach(&mut self, id: &str) -> bool {
        self.handles.remove(id).is_some()
    }

    /// Subscribe a connection to `channel`, replacing any previous subscription
    pub fn subscribe(&mut self, id: &str, channel: &str) -> bool {
        match self.handles.get_mut(id) {
            Some(handle) => {
                handle.channel = Some(channel.to_string());
                true
            }
            None => false,
        }
    }

    /// Remove a connection's subscription to `channel`
    pub fn unsubscribe(&mut self, id: &str, channel: &str) -> bool {
        match self.handles.get_mut(id) {
            Some(handle) if handle.channel.as_deref() == Some(channel) => {
                handle.channel = None;
                true
            }
            _ => false,
        }
    }

    /// Channel the connection is currently subscribed to
    pub fn subscription(&self, id: &str) -> Option<&str> {
        self.handles.get(id).and_then(|h| h.channel.as_deref())
    }

    pub fn is_attached(&self, id: &str) -> bool {
        self.handles.contains_key(id)
    }

    /// Enqueue a message for one connection
    pub fn send_to(&self, id: &str, message: RelayMessage) -> bool {
        match self.handles.get(id) {
            Some(handle) => handle.sender.send(message).is_ok(),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Deliver `message` to every member of `channel`.
///
/// The audience comes from the registry at call time; each member's handle
/// must be subscribed to the same channel. Returns the number of connections
/// the message was enqueued for.
pub fn broadcast(
    registry: &ParticipantRegistry,
    transports: &Transports,
    channel: &str,
    message: &RelayMessage,
) -> usize {
    let mut delivered = 0;

    for id in registry.membership().member_ids(channel) {
        let Some(handle) = transports.handles.get(&id) else {
            tracing::warn!(connection_id = %id, channel = %channel, "Member has no transport");
            continue;
        };

        if handle.channel.as_deref() != Some(channel) {
            tracing::warn!(
                connection_id = %id,
                channel = %channel,
                subscribed = ?handle.channel,
                "Member subscription out of sync, skipping"
            );
            continue;
        }

        // A closed receiver means the socket is going away; its disconnect
        // will clean up the record.
        if handle.sender.send(message.clone()).is_ok() {
            delivered += 1;
        }
    }

    tracing::debug!(
        channel = %channel,
        event = message.event.name(),
        sequence_id = message.sequence_id,
        delivered,
        "Broadcast"
    );
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::events::ServerEvent;

    fn message(seq: u64) -> RelayMessage {
        RelayMessage::new(ServerEvent::user_disconnected("x"), seq)
    }

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut transports = Transports::new();
        transports.attach("a", tx);

        assert_eq!(transports.subscription("a"), None);
        assert!(transports.subscribe("a", "lobby"));
        assert_eq!(transports.subscription("a"), Some("lobby"));

        // Wrong channel is a no-op
        assert!(!transports.unsubscribe("a", "hallway"));
        assert!(transports.unsubscribe("a", "lobby"));
        assert_eq!(transports.subscription("a"), None);

        assert!(!transports.subscribe("missing", "lobby"));
    }

    #[test]
    fn test_detach_is_idempotent() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut transports = Transports::new();
        transports.attach("a", tx);

        assert!(transports.detach("a"));
        assert!(!transports.detach("a"));
        assert!(transports.is_empty());
    }

    #[test]
    fn test_broadcast_reaches_only_channel_members() {
        let mut registry = ParticipantRegistry::new();
        let mut transports = Transports::new();

        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let (tx_c, mut rx_c) = mpsc::unbounded_channel();
        for (id, tx, channel) in [("a", tx_a, "lobby"), ("b", tx_b, "lobby"), ("c", tx_c, "hallway")] {
            transports.attach(id, tx);
            transports.subscribe(id, channel);
            registry.add(id, id, channel).unwrap();
        }

        let delivered = broadcast(&registry, &transports, "lobby", &message(0));
        assert_eq!(delivered, 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_skips_unsubscribed_member() {
        let mut registry = ParticipantRegistry::new();
        let mut transports = Transports::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        transports.attach("a", tx);
        registry.add("a", "Alice", "lobby").unwrap();

        assert_eq!(broadcast(&registry, &transports, "lobby", &message(0)), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_to_empty_channel() {
        let registry = ParticipantRegistry::new();
        let transports = Transports::new();
        assert_eq!(broadcast(&registry, &transports, "lobby", &message(0)), 0);
    }

    #[test]
    fn test_broadcast_ignores_closed_receiver() {
        let mut registry = ParticipantRegistry::new();
        let mut transports = Transports::new();
        let (tx, rx) = mpsc::unbounded_channel();
        transports.attach("a", tx);
        transports.subscribe("a", "lobby");
        registry.add("a", "Alice", "lobby").unwrap();
        drop(rx);

        assert_eq!(broadcast(&registry, &transports, "lobby", &message(0)), 0);
    }
}
