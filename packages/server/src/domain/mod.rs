//! Domain layer: chat room state, its invariants, and the ports the
//! coordinator depends on.

pub mod admission;
pub mod bridge;
pub mod entity;
pub mod error;
pub mod event;
pub mod history;
pub mod message_pusher;
pub mod presence;
pub mod repository;
pub mod room;
pub mod value_object;

pub use admission::{AdmissionGate, AdmissionRejection};
pub use bridge::{
    BridgeAdapter, BridgeError, RelayChatId, RelayCommand, RelayInbound, RelayOutbox,
};
pub use entity::{ChatMessage, Connection, ConnectionState, MAX_REACTION_SYMBOLS_PER_MESSAGE, Sender};
pub use error::{AdmitError, RepositoryError, RoomError, ValueObjectError};
pub use event::{InboundEvent, RoomEvent};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryBuffer};
pub use message_pusher::{MessagePushError, MessagePusher, PusherChannel};
pub use presence::PresenceRegistry;
pub use repository::RoomRepository;
pub use room::{CloseOutcome, Room};
pub use value_object::{
    ConnectionId, Identity, MAX_REACTION_SYMBOL_CHARS, MessageContent, MessageId, MessageKind,
    ReactionSymbol, SharedSecret, Timestamp,
};
