//! MessagePusher port: delivery of room events to connections.
//!
//! Pushing only writes to the connection's channel; it never waits for the
//! frame to reach the peer.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::{ConnectionId, RoomEvent};

/// Outbound channel of one connection (serialized frames).
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push event: {0}")]
    PushFailed(String),
}

#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a connection
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Drop the channel of a connection. The channel closes and the writer drains and exits.
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Push an event to one connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;

    /// Push the same event to every target; individual failures are tolerated
    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &RoomEvent,
    ) -> Result<(), MessagePushError>;
}
