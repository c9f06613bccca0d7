//! UseCase: 退室・切断処理
//!
//! `Active → Closed` の遷移。トランスポートの切断検知と明示的な leave の
//! どちらもここを通ります。2 回目以降の呼び出しは何もしません。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    CloseOutcome, ConnectionId, MessageContent, MessagePusher, RelayCommand, RelayOutbox,
    RoomEvent, RoomRepository, Sender, Timestamp, bridge,
};

use super::{broadcast_event, enqueue_relay};

/// 退室のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    outbox: RelayOutbox,
    clock: Arc<dyn Clock>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        outbox: RelayOutbox,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            outbox,
            clock,
        }
    }

    /// 接続を破棄し、入室済みだった場合は退室を通知
    pub async fn execute(&self, connection_id: &ConnectionId) -> CloseOutcome {
        let outcome = self.repository.close_connection(connection_id).await;
        // 送信チャンネルを閉じると送信タスクは残りを送り切って終了する
        self.message_pusher.unregister_client(connection_id).await;

        match &outcome {
            CloseOutcome::Left(identity) => {
                tracing::info!("'{}' left (connection '{}')", identity, connection_id);

                let now = Timestamp::new(self.clock.now_millis());
                let message = self
                    .repository
                    .append_message(Sender::System, MessageContent::left(identity), now)
                    .await;

                let targets = self.repository.active_connections().await;
                let presence = self.repository.presence_snapshot().await;
                broadcast_event(
                    self.message_pusher.as_ref(),
                    &targets,
                    &RoomEvent::Presence(presence),
                )
                .await;
                broadcast_event(
                    self.message_pusher.as_ref(),
                    &targets,
                    &RoomEvent::Message(message),
                )
                .await;

                enqueue_relay(&self.outbox, RelayCommand::Post(bridge::left_notice(identity)));
            }
            CloseOutcome::Discarded => {
                tracing::debug!("Connection '{}' closed before joining", connection_id);
            }
            CloseOutcome::Unknown => {
                tracing::debug!("Connection '{}' already closed", connection_id);
            }
        }

        outcome
    }
}
