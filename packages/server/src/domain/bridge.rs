//! Bridge port: the external messaging platform mirrored into the room.
//!
//! The coordinator never talks to an adapter directly. It enqueues
//! [`RelayCommand`]s on a [`RelayOutbox`]; a worker drains the queue so that a
//! slow or failing platform never holds up the local broadcast.

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::{ChatMessage, Identity, MessageKind, Sender};

/// Prefix that turns an inbound relay text into a room message.
pub const SEND_COMMAND_PREFIX: &str = "/send ";

pub const SEND_CONFIRMATION: &str = "Message sent to the chat.";

pub const SEND_USAGE: &str = "Use /send [message] to send a message to the chat.";

/// Chat on the external platform that a relay message came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelayChatId(String);

impl RelayChatId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelayChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Text received from the external platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayInbound {
    pub chat: RelayChatId,
    pub text: String,
}

/// Work item for the outbound bridge worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayCommand {
    /// Notice for the configured destination
    Post(String),
    /// Answer to a specific chat only
    Reply { chat: RelayChatId, text: String },
}

pub type RelayOutbox = mpsc::UnboundedSender<RelayCommand>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    #[error("bridge request failed: {0}")]
    Transport(String),

    #[error("bridge rejected the request: {0}")]
    Rejected(String),

    #[error("bridge has no destination configured")]
    NoDestination,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BridgeAdapter: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Send text to the configured destination. Best effort.
    async fn send_outbound(&self, text: &str) -> Result<(), BridgeError>;

    /// Send text back to the chat a relay message came from.
    async fn reply(&self, chat: &RelayChatId, text: &str) -> Result<(), BridgeError>;

    /// Wait for the next batch of inbound messages.
    async fn poll_inbound(&self) -> Result<Vec<RelayInbound>, BridgeError>;
}

/// Extract the text of a `/send <text>` command.
///
/// Returns `None` when the prefix is missing or the remaining text is blank.
pub fn parse_send_command(text: &str) -> Option<&str> {
    text.strip_prefix(SEND_COMMAND_PREFIX)
        .filter(|rest| !rest.trim().is_empty())
}

pub fn joined_notice(identity: &Identity) -> String {
    format!("{} joined the chat.", identity)
}

pub fn left_notice(identity: &Identity) -> String {
    format!("{} left the chat.", identity)
}

/// Notice mirroring a participant message to the bridge.
pub fn message_notice(message: &ChatMessage) -> String {
    let name = message.sender.display_name();
    let kind = message.content.kind();
    let payload = message.content.payload();
    if kind == MessageKind::Text {
        return format!("{}: {}", name, payload);
    }
    let article = if kind.as_str().starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    };
    format!("{} shared {} {}: {}", name, article, kind, payload)
}

/// Whether a message should be mirrored to the bridge.
///
/// Relay-origin messages came from the bridge and are not echoed back.
pub fn should_mirror(message: &ChatMessage) -> bool {
    matches!(message.sender, Sender::Participant(_))
}
