//! Entities of the chat room.

use std::collections::BTreeMap;

use serde::Serialize;

use super::value_object::{
    ConnectionId, Identity, MessageContent, MessageId, ReactionSymbol, Timestamp,
};

/// Who a message is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "origin", content = "name", rename_all = "lowercase")]
pub enum Sender {
    Participant(Identity),
    /// Room notices such as joins and leaves
    System,
    /// Messages injected through the external bridge
    Relay,
}

impl Sender {
    /// Name shown to readers.
    pub fn display_name(&self) -> &str {
        match self {
            Sender::Participant(identity) => identity.as_str(),
            Sender::System => "system",
            Sender::Relay => "relay",
        }
    }
}

/// Most distinct reaction symbols a single message can carry.
pub const MAX_REACTION_SYMBOLS_PER_MESSAGE: usize = 32;

/// An accepted chat message.
///
/// Immutable once created apart from its reaction tally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub id: MessageId,
    pub sender: Sender,
    pub content: MessageContent,
    pub timestamp: Timestamp,
    pub reactions: BTreeMap<ReactionSymbol, u32>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: MessageContent, timestamp: Timestamp) -> Self {
        Self {
            id: MessageId::generate(),
            sender,
            content,
            timestamp,
            reactions: BTreeMap::new(),
        }
    }

    /// Increment the tally for `symbol` and return the new count.
    ///
    /// A symbol not yet on the message is refused (`None`) once the message
    /// already carries [`MAX_REACTION_SYMBOLS_PER_MESSAGE`] symbols.
    pub fn add_reaction(&mut self, symbol: ReactionSymbol) -> Option<u32> {
        if !self.reactions.contains_key(&symbol)
            && self.reactions.len() >= MAX_REACTION_SYMBOLS_PER_MESSAGE
        {
            return None;
        }
        let count = self.reactions.entry(symbol).or_insert(0);
        *count = count.saturating_add(1);
        Some(*count)
    }
}

/// Lifecycle of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Unauthenticated,
    Active,
    Closed,
}

/// A live transport session as seen by the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub identity: Option<Identity>,
    pub state: ConnectionState,
    pub opened_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, opened_at: Timestamp) -> Self {
        Self {
            id,
            identity: None,
            state: ConnectionState::Connecting,
            opened_at,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }
}
