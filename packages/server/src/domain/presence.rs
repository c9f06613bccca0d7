//! Presence Registry: the live identity → connection bindings.

use std::collections::HashMap;

use serde::Serialize;

use super::{
    error::RoomError,
    value_object::{ConnectionId, Identity},
};

/// Set of currently-joined identities; at most one entry per identity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PresenceRegistry {
    entries: HashMap<Identity, ConnectionId>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `identity` owned by `connection_id` if and only if it is absent.
    ///
    /// Leaves the registry untouched on failure.
    pub fn try_add(
        &mut self,
        identity: Identity,
        connection_id: ConnectionId,
    ) -> Result<(), RoomError> {
        if self.entries.contains_key(&identity) {
            return Err(RoomError::IdentityTaken(identity.into_string()));
        }
        self.entries.insert(identity, connection_id);
        Ok(())
    }

    /// Remove `identity` if present; no-op otherwise.
    pub fn remove(&mut self, identity: &Identity) -> Option<ConnectionId> {
        self.entries.remove(identity)
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn owner_of(&self, identity: &Identity) -> Option<ConnectionId> {
        self.entries.get(identity).copied()
    }

    /// Current identities, sorted for a stable presentation order.
    pub fn snapshot(&self) -> Vec<Identity> {
        let mut identities: Vec<Identity> = self.entries.keys().cloned().collect();
        identities.sort();
        identities
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
