//! Connection Session
//!
//! One state machine per live connection. Every transition takes the relay
//! lock once, reads whatever channel state it needs from the registry before
//! mutating, applies the mutation, and enqueues the resulting broadcasts
//! computed from the post-mutation registry.

use std::sync::Arc;

use super::dispatcher::ConnectionSender;
use super::events::{ClientEvent, ServerEvent};
use super::state::RelayState;
use crate::error::{RelayError, RelayResult};
use crate::types::ConnectionId;

/// Lifecycle of a connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, no `newUser` yet
    Unjoined,
    /// Recorded in the registry, member of `channel`
    Joined { channel: String },
    /// Disconnected; terminal
    Terminated,
}

/// Per-connection event handler
pub struct ConnectionSession {
    id: ConnectionId,
    state: SessionState,
    relay: Arc<RelayState>,
}

impl ConnectionSession {
    /// Register the connection's outbound handle and greet it with its id
    pub fn open(relay: Arc<RelayState>, id: impl Into<String>, sender: ConnectionSender) -> Self {
        let id = id.into();
        {
            let mut core = relay.lock();
            core.transports.attach(id.clone(), sender);
            core.send_to(&id, ServerEvent::Connected { id: id.clone() });
        }
        tracing::debug!(connection_id = %id, "Session opened");

        Self {
            id,
            state: SessionState::Unjoined,
            relay,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Parse and apply one text frame
    pub fn handle_text(&mut self, text: &str) -> RelayResult<()> {
        let event = ClientEvent::parse(text)?;
        self.handle(event)
    }

    /// Apply one client event
    pub fn handle(&mut self, event: ClientEvent) -> RelayResult<()> {
        if self.state == SessionState::Terminated {
            return Err(RelayError::SessionTerminated(self.id.clone()));
        }

        match event {
            ClientEvent::NewUser { id, name, channel } => self.join(id, name, channel),
            ClientEvent::NameChange { name } => self.rename(name),
            ClientEvent::ChannelChange { channel } => self.switch_channel(channel),
            ClientEvent::Ping => {
                self.relay.lock().send_to(&self.id, ServerEvent::Pong);
                Ok(())
            }
        }
    }

    fn join(&mut self, claimed_id: Option<String>, name: String, channel: String) -> RelayResult<()> {
        if let Some(claimed) = claimed_id {
            if claimed != self.id {
                return Err(RelayError::validation(format!(
                    "id '{}' does not match connection",
                    claimed
                )));
            }
        }
        if matches!(self.state, SessionState::Joined { .. }) {
            return Err(RelayError::DuplicateParticipant(self.id.clone()));
        }

        let mut core = self.relay.lock();
        core.registry.add(self.id.clone(), name.clone(), channel.clone())?;
        core.transports.subscribe(&self.id, &channel);
        self.state = SessionState::Joined {
            channel: channel.clone(),
        };

        let participants = core.registry.membership().members_of(&channel);
        core.broadcast(&channel, ServerEvent::NewConnection { participants });
        drop(core);

        tracing::info!(connection_id = %self.id, name = %name, channel = %channel, "Participant joined");
        Ok(())
    }

    fn rename(&mut self, name: String) -> RelayResult<()> {
        self.require_joined()?;

        let mut core = self.relay.lock();
        let channel = core.registry.set_name(&self.id, name.clone())?.channel.clone();
        core.broadcast(
            &channel,
            ServerEvent::NameChanged {
                id: self.id.clone(),
                name: name.clone(),
            },
        );
        drop(core);

        tracing::debug!(connection_id = %self.id, name = %name, channel = %channel, "Participant renamed");
        Ok(())
    }

    fn switch_channel(&mut self, new_channel: String) -> RelayResult<()> {
        self.require_joined()?;

        let mut core = self.relay.lock();
        let old_channel = core
            .registry
            .get(&self.id)
            .map(|p| p.channel.clone())
            .ok_or_else(|| RelayError::UnknownParticipant(self.id.clone()))?;

        core.transports.unsubscribe(&self.id, &old_channel);
        core.registry.set_channel(&self.id, new_channel.clone())?;
        core.transports.subscribe(&self.id, &new_channel);
        self.state = SessionState::Joined {
            channel: new_channel.clone(),
        };

        core.broadcast(&old_channel, ServerEvent::user_disconnected(self.id.clone()));
        let participants = core.registry.membership().members_of(&new_channel);
        core.broadcast(&new_channel, ServerEvent::ChannelChanged { participants });
        drop(core);

        tracing::info!(
            connection_id = %self.id,
            from = %old_channel,
            to = %new_channel,
            "Participant switched channel"
        );
        Ok(())
    }

    /// Tear the session down. Safe to call more than once.
    pub fn disconnect(&mut self) {
        let previous = std::mem::replace(&mut self.state, SessionState::Terminated);

        match previous {
            SessionState::Terminated => {}
            SessionState::Unjoined => {
                self.relay.lock().transports.detach(&self.id);
                tracing::debug!(connection_id = %self.id, "Session closed before joining");
            }
            SessionState::Joined { .. } => {
                let mut core = self.relay.lock();
                core.transports.detach(&self.id);
                let removed = core.registry.remove(&self.id);
                match removed {
                    Ok(participant) => {
                        core.broadcast(
                            &participant.channel,
                            ServerEvent::user_disconnected(self.id.clone()),
                        );
                        drop(core);
                        tracing::info!(
                            connection_id = %self.id,
                            channel = %participant.channel,
                            "Participant disconnected"
                        );
                    }
                    Err(err) => {
                        drop(core);
                        tracing::warn!(connection_id = %self.id, error = %err, "Disconnect without record");
                    }
                }
            }
        }
    }

    fn require_joined(&self) -> RelayResult<()> {
        match self.state {
            SessionState::Joined { .. } => Ok(()),
            _ => Err(RelayError::UnknownParticipant(self.id.clone())),
        }
    }
}

impl Drop for ConnectionSession {
    fn drop(&mut self) {
        self.disconnect();
    }
}
