//! History Buffer: bounded, ordered log of accepted messages.

use std::collections::VecDeque;

use serde::Serialize;

use super::{
    entity::ChatMessage,
    value_object::{MessageId, ReactionSymbol},
};

/// Capacity used when none is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// FIFO buffer holding at most `capacity` messages in acceptance order.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryBuffer {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl HistoryBuffer {
    /// Create an empty buffer. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Append to the end, evicting from the front until within capacity.
    ///
    /// Returns the number of evicted messages.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        self.messages.push_back(message);
        let mut evicted = 0;
        while self.messages.len() > self.capacity {
            self.messages.pop_front();
            evicted += 1;
        }
        evicted
    }

    /// Owned snapshot in acceptance order.
    pub fn all(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn get(&self, message_id: &MessageId) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| &m.id == message_id)
    }

    /// Increment `symbol` on the message with `message_id`.
    ///
    /// Returns the new count, or `None` when nothing changed: the message is
    /// not (or no longer) in the buffer, or its tally refuses a new symbol.
    pub fn apply_reaction(&mut self, message_id: &MessageId, symbol: ReactionSymbol) -> Option<u32> {
        self.messages
            .iter_mut()
            .find(|m| &m.id == message_id)
            .and_then(|m| m.add_reaction(symbol))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
