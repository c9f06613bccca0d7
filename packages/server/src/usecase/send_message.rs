//! UseCase: メッセージ送信処理
//!
//! `Active → Active`（メッセージ）の遷移。空白のみのテキストや空のメディアは
//! `SendMessageError::InvalidContent` として返し、履歴にもブロードキャストにも
//! 影響を与えません。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatMessage, ConnectionId, MessageContent, MessageKind, MessagePusher, RelayCommand,
    RelayOutbox, RoomEvent, RoomRepository, Sender, Timestamp, bridge,
};

use super::{broadcast_event, enqueue_relay, error::SendMessageError};

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    outbox: RelayOutbox,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
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

    /// 参加者のメッセージを受理して全員に配信
    ///
    /// # Returns
    ///
    /// * `Ok(ChatMessage)` - 受理されたメッセージ
    /// * `Err(SendMessageError)` - 未入室の接続、または不正な内容
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        kind: MessageKind,
        payload: String,
    ) -> Result<ChatMessage, SendMessageError> {
        let identity = self.repository.identity_of(connection_id).await?;
        let content = MessageContent::new(kind, payload)?;

        let now = Timestamp::new(self.clock.now_millis());
        let message = self
            .repository
            .append_message(Sender::Participant(identity), content, now)
            .await;
        tracing::debug!("Accepted {} message {} from '{}'", kind, message.id, connection_id);

        let targets = self.repository.active_connections().await;
        broadcast_event(
            self.message_pusher.as_ref(),
            &targets,
            &RoomEvent::Message(message.clone()),
        )
        .await;

        if bridge::should_mirror(&message) {
            enqueue_relay(
                &self.outbox,
                RelayCommand::Post(bridge::message_notice(&message)),
            );
        }

        Ok(message)
    }
}
