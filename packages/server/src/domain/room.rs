//! Room aggregate: the single authoritative chat state.
//!
//! Owns the connections, the Presence Registry and the History Buffer. Every
//! method takes `&mut self`, so a caller holding the room behind one lock gets
//! each operation as one atomic step.

use std::collections::HashMap;

use serde::Serialize;

use super::{
    admission::{AdmissionGate, AdmissionRejection},
    entity::{ChatMessage, Connection, ConnectionState, Sender},
    error::{AdmitError, RoomError},
    history::HistoryBuffer,
    presence::PresenceRegistry,
    value_object::{ConnectionId, Identity, MessageContent, MessageId, ReactionSymbol, Timestamp},
};

/// What closing a connection amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseOutcome {
    /// An Active participant left; its identity was released
    Left(Identity),
    /// The connection never got past admission
    Discarded,
    /// Nothing known about the connection (already closed)
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct Room {
    pub created_at: Timestamp,
    connections: HashMap<ConnectionId, Connection>,
    presence: PresenceRegistry,
    history: HistoryBuffer,
    last_timestamp: Timestamp,
}

impl Room {
    pub fn new(created_at: Timestamp, history_capacity: usize) -> Self {
        Self {
            created_at,
            connections: HashMap::new(),
            presence: PresenceRegistry::new(),
            history: HistoryBuffer::new(history_capacity),
            last_timestamp: created_at,
        }
    }

    /// Register a freshly established transport session as Unauthenticated.
    pub fn open_connection(
        &mut self,
        connection_id: ConnectionId,
        opened_at: Timestamp,
    ) -> Result<(), RoomError> {
        if self.connections.contains_key(&connection_id) {
            return Err(RoomError::ConnectionAlreadyOpen(connection_id.to_string()));
        }
        let mut connection = Connection::new(connection_id, opened_at);
        connection.state = ConnectionState::Unauthenticated;
        self.connections.insert(connection_id, connection);
        Ok(())
    }

    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(connection_id)
    }

    /// Run the admission gate and bind the identity in one step.
    ///
    /// On success the connection is Active and present. On rejection nothing
    /// changes.
    pub fn admit(
        &mut self,
        connection_id: &ConnectionId,
        gate: &AdmissionGate,
        candidate: &str,
        credential: &str,
    ) -> Result<Identity, AdmitError> {
        let state = self
            .connections
            .get(connection_id)
            .map(|c| c.state)
            .ok_or_else(|| RoomError::UnknownConnection(connection_id.to_string()))?;
        if state != ConnectionState::Unauthenticated {
            return Err(RoomError::InvalidConnectionState(connection_id.to_string()).into());
        }

        let identity = gate.admit(candidate, credential, &self.presence)?;
        self.presence
            .try_add(identity.clone(), *connection_id)
            .map_err(|_| AdmissionRejection::IdentityTaken)?;

        if let Some(connection) = self.connections.get_mut(connection_id) {
            connection.identity = Some(identity.clone());
            connection.state = ConnectionState::Active;
        }
        Ok(identity)
    }

    /// Identity of an Active connection.
    pub fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, RoomError> {
        let connection = self
            .connections
            .get(connection_id)
            .ok_or_else(|| RoomError::UnknownConnection(connection_id.to_string()))?;
        match (&connection.identity, connection.state) {
            (Some(identity), ConnectionState::Active) => Ok(identity.clone()),
            _ => Err(RoomError::NotJoined(connection_id.to_string())),
        }
    }

    /// Stamp, append and return a new message.
    ///
    /// Acceptance timestamps never go backwards even if `now` does.
    pub fn accept_message(
        &mut self,
        sender: Sender,
        content: MessageContent,
        now: Timestamp,
    ) -> ChatMessage {
        let timestamp = now.max(self.last_timestamp);
        self.last_timestamp = timestamp;

        let message = ChatMessage::new(sender, content, timestamp);
        let evicted = self.history.append(message.clone());
        if evicted > 0 {
            tracing::debug!("Evicted {} message(s) from history", evicted);
        }
        message
    }

    pub fn apply_reaction(&mut self, message_id: &MessageId, symbol: ReactionSymbol) -> Option<u32> {
        self.history.apply_reaction(message_id, symbol)
    }

    /// Drop the connection. Releases its identity if it was Active.
    ///
    /// Idempotent: closing an unknown connection reports `Unknown`.
    pub fn close_connection(&mut self, connection_id: &ConnectionId) -> CloseOutcome {
        let Some(mut connection) = self.connections.remove(connection_id) else {
            return CloseOutcome::Unknown;
        };
        let was_active = connection.is_active();
        connection.state = ConnectionState::Closed;

        match connection.identity {
            Some(identity) if was_active => {
                self.presence.remove(&identity);
                CloseOutcome::Left(identity)
            }
            _ => CloseOutcome::Discarded,
        }
    }

    /// Connections that receive broadcasts.
    pub fn active_connections(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .connections
            .values()
            .filter(|c| c.is_active())
            .map(|c| c.id)
            .collect();
        ids.sort();
        ids
    }

    pub fn presence_snapshot(&self) -> Vec<Identity> {
        self.presence.snapshot()
    }

    pub fn history_snapshot(&self) -> Vec<ChatMessage> {
        self.history.all()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
