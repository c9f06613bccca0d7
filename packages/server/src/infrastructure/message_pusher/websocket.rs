//! WebSocket-backed `MessagePusher`.
//!
//! Keeps one `PusherChannel` per connection and writes each `RoomEvent` to it
//! as a JSON frame. Accepting sockets and running the writer task happen in
//! `ui/handler/websocket.rs`.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomEvent},
    infrastructure::dto::websocket::ServerFrame,
};

/// Channel-per-connection pusher
pub struct WebSocketMessagePusher {
    clients: Arc<Mutex<HashMap<ConnectionId, PusherChannel>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self {
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn encode(event: &RoomEvent) -> Result<String, MessagePushError> {
        serde_json::to_string(&ServerFrame::from(event))
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))
    }
}

impl Default for WebSocketMessagePusher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        clients.insert(connection_id, sender);
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        if clients.remove(connection_id).is_some() {
            tracing::debug!(
                "Connection '{}' unregistered from MessagePusher",
                connection_id
            );
        }
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(frame)
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed event to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        let frame = Self::encode(event)?;
        let clients = self.clients.lock().await;

        for target in targets {
            match clients.get(target) {
                Some(sender) => {
                    if let Err(e) = sender.send(frame.clone()) {
                        tracing::warn!("Failed to push event to connection '{}': {}", target, e);
                    }
                }
                None => {
                    tracing::warn!("Connection '{}' not found during broadcast, skipping", target);
                }
            }
        }

        Ok(())
    }
}
