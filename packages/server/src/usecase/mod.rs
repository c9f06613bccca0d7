//! UseCase 層
//!
//! コーディネーターの操作ごとに 1 つのユースケースを置き、
//! `ChatCoordinator` がそれらを直列化して呼び出します。

pub mod coordinator;
pub mod error;
pub mod get_room_state;
pub mod join_room;
pub mod leave_room;
pub mod react_message;
pub mod relay_inbound;
pub mod send_message;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::{ChatCoordinator, Flow};
pub use error::{JoinError, ReactMessageError, RelayError, SendMessageError};
pub use get_room_state::GetRoomStateUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use react_message::ReactMessageUseCase;
pub use relay_inbound::RelayInboundUseCase;
pub use send_message::SendMessageUseCase;

use crate::domain::{ConnectionId, MessagePusher, RelayCommand, RelayOutbox, RoomEvent};

/// ブリッジへの送信をキューに積む（完了は待たない）
fn enqueue_relay(outbox: &RelayOutbox, command: RelayCommand) {
    if let Err(e) = outbox.send(command) {
        tracing::warn!("Relay outbox closed, dropping {:?}", e.0);
    }
}

/// Active な全接続へイベントを送信
async fn broadcast_event(pusher: &dyn MessagePusher, targets: &[ConnectionId], event: &RoomEvent) {
    if let Err(e) = pusher.broadcast(targets, event).await {
        tracing::warn!("Failed to broadcast event: {}", e);
    }
}
