//! In-memory `RoomRepository`.
//!
//! The aggregate sits behind one mutex and every method completes under a
//! single lock. Nothing outlives the process.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    AdmissionGate, AdmitError, ChatMessage, CloseOutcome, ConnectionId, Identity,
    MessageContent, MessageId, ReactionSymbol, RepositoryError, Room, RoomRepository, Sender,
    Timestamp,
};

/// In-memory Room repository
pub struct InMemoryRoomRepository {
    room: Arc<Mutex<Room>>,
}

impl InMemoryRoomRepository {
    pub fn new(room: Arc<Mutex<Room>>) -> Self {
        Self { room }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn get_room(&self) -> Room {
        self.room.lock().await.clone()
    }

    async fn open_connection(
        &self,
        connection_id: ConnectionId,
        opened_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut room = self.room.lock().await;
        room.open_connection(connection_id, opened_at)?;
        Ok(())
    }

    async fn admit(
        &self,
        connection_id: &ConnectionId,
        gate: &AdmissionGate,
        candidate: &str,
        credential: &str,
    ) -> Result<Identity, AdmitError> {
        let mut room = self.room.lock().await;
        room.admit(connection_id, gate, candidate, credential)
    }

    async fn identity_of(&self, connection_id: &ConnectionId) -> Result<Identity, RepositoryError> {
        let room = self.room.lock().await;
        Ok(room.identity_of(connection_id)?)
    }

    async fn append_message(
        &self,
        sender: Sender,
        content: MessageContent,
        now: Timestamp,
    ) -> ChatMessage {
        let mut room = self.room.lock().await;
        room.accept_message(sender, content, now)
    }

    async fn apply_reaction(&self, message_id: &MessageId, symbol: ReactionSymbol) -> Option<u32> {
        let mut room = self.room.lock().await;
        room.apply_reaction(message_id, symbol)
    }

    async fn close_connection(&self, connection_id: &ConnectionId) -> CloseOutcome {
        let mut room = self.room.lock().await;
        room.close_connection(connection_id)
    }

    async fn active_connections(&self) -> Vec<ConnectionId> {
        self.room.lock().await.active_connections()
    }

    async fn presence_snapshot(&self) -> Vec<Identity> {
        self.room.lock().await.presence_snapshot()
    }

    async fn history_snapshot(&self) -> Vec<ChatMessage> {
        self.room.lock().await.history_snapshot()
    }
}
