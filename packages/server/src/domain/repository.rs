//! Repository port: access to the chat state the coordinator needs.
//!
//! Implementations live in the infrastructure layer. Each method is one
//! atomic operation on the `Room` aggregate.

use async_trait::async_trait;

use super::{
    AdmissionGate, AdmitError, ChatMessage, CloseOutcome, ConnectionId, Identity,
    MessageContent, MessageId, ReactionSymbol, RepositoryError, Room, Sender, Timestamp,
};

/// Room Repository trait
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Snapshot of the whole aggregate
    async fn get_room(&self) -> Room;

    /// Register an accepted transport session as an unauthenticated connection
    async fn open_connection(
        &self,
        connection_id: ConnectionId,
        opened_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// Run the admission check and the presence insert as one step
    async fn admit(
        &self,
        connection_id: &ConnectionId,
        gate: &AdmissionGate,
        candidate: &str,
        credential: &str,
    ) -> Result<Identity, AdmitError>;

    /// Identity bound to an Active connection
    async fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, RepositoryError>;

    /// Accept a message into the history
    async fn append_message(
        &self,
        sender: Sender,
        content: MessageContent,
        now: Timestamp,
    ) -> ChatMessage;

    /// Add a reaction; `None` when it was not applied
    async fn apply_reaction(&self, message_id: &MessageId, symbol: ReactionSymbol) -> Option<u32>;

    /// Close a connection (idempotent)
    async fn close_connection(&self, connection_id: &ConnectionId) -> CloseOutcome;

    /// Broadcast targets (Active connections)
    async fn active_connections(&self) -> Vec<ConnectionId>;

    /// Present identities, sorted by name
    async fn presence_snapshot(&self) -> Vec<Identity>;

    /// History snapshot in acceptance order
    async fn history_snapshot(&self) -> Vec<ChatMessage>;
}
