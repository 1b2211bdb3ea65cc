//! Shared relay state
//!
//! The registry and the transport table sit together behind one lock, so a
//! mutation, the membership snapshot it produces, and the enqueueing of the
//! resulting broadcast form a single unit of work.

use parking_lot::{Mutex, MutexGuard};

use super::dispatcher::{self, Transports};
use super::events::{RelayMessage, ServerEvent};
use crate::config::RelayConfig;
use crate::registry::ParticipantRegistry;

/// Everything guarded by the relay lock
#[derive(Debug, Default)]
pub struct RelayCore {
    pub registry: ParticipantRegistry,
    pub transports: Transports,
    sequence_counter: u64,
}

impl RelayCore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap `event` in an envelope and deliver it to every member of `channel`
    pub fn broadcast(&mut self, channel: &str, event: ServerEvent) -> usize {
        let message = RelayMessage::new(event, self.sequence_counter);
        self.sequence_counter += 1;
        dispatcher::broadcast(&self.registry, &self.transports, channel, &message)
    }

    /// Send `event` to a single connection. Does not advance the sequence.
    pub fn send_to(&self, id: &str, event: ServerEvent) -> bool {
        self.transports
            .send_to(id, RelayMessage::new(event, self.sequence_counter))
    }

    /// Sequence id the next broadcast will carry
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter
    }
}

/// Shared application state for relay connections and HTTP handlers
pub struct RelayState {
    core: Mutex<RelayCore>,
    config: RelayConfig,
}

impl RelayState {
    /// Create relay state with the given configuration
    pub fn new(config: RelayConfig) -> Self {
        Self {
            core: Mutex::new(RelayCore::new()),
            config,
        }
    }

    /// Take the relay lock for one mutate-then-broadcast step
    pub fn lock(&self) -> MutexGuard<'_, RelayCore> {
        self.core.lock()
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Broadcast an event into a channel without touching the registry
    pub fn broadcast(&self, channel: &str, event: ServerEvent) -> usize {
        self.lock().broadcast(channel, event)
    }

    pub fn current_sequence_id(&self) -> u64 {
        self.lock().current_sequence_id()
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(RelayConfig::default())
    }
}
