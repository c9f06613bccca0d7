//! Events crossing the coordinator boundary.
//!
//! Inbound events come from a connection, outbound events go to one or all
//! Active connections. Both are closed sets; the transport maps its wire
//! format onto them.

use super::{
    admission::AdmissionRejection,
    entity::ChatMessage,
    value_object::{Identity, MessageId, MessageKind, ReactionSymbol},
};

/// Intent received from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Join { nickname: String, password: String },
    /// Payload is validated by the coordinator; blank payloads are dropped there
    Message { kind: MessageKind, payload: String },
    Reaction { message_id: MessageId, symbol: String },
    /// Explicit leave; handled exactly like a transport disconnect
    Leave,
}

/// Event emitted by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// Catch-up snapshot, sent once on admission
    History(Vec<ChatMessage>),
    Presence(Vec<Identity>),
    Message(ChatMessage),
    ReactionUpdate {
        message_id: MessageId,
        symbol: ReactionSymbol,
        count: u32,
    },
    /// Admission rejection, unicast to the originating connection
    Error(AdmissionRejection),
}
