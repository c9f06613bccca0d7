//! UseCase: ブリッジからの受信処理
//!
//! ブリッジは常に Active な疑似接続（送信者 `relay`）として扱います。
//! `/send <text>` のみが部屋に投稿され、それ以外には使い方を返信します。
//! 返信はブリッジにのみ送られ、部屋には配信されません。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    ChatMessage, MessageContent, MessagePusher, RelayChatId, RelayCommand, RelayInbound,
    RelayOutbox, RoomEvent, RoomRepository, Sender, Timestamp,
    bridge::{self, SEND_CONFIRMATION, SEND_USAGE},
};

use super::{broadcast_event, enqueue_relay, error::RelayError};

/// ブリッジ受信のユースケース
pub struct RelayInboundUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    outbox: RelayOutbox,
    clock: Arc<dyn Clock>,
}

impl RelayInboundUseCase {
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

    pub async fn execute(&self, inbound: RelayInbound) -> Result<ChatMessage, RelayError> {
        let RelayInbound { chat, text } = inbound;

        let content = match bridge::parse_send_command(&text).map(MessageContent::text) {
            Some(Ok(content)) => content,
            Some(Err(e)) => {
                self.reply_usage(chat);
                return Err(e.into());
            }
            None => {
                self.reply_usage(chat);
                return Err(RelayError::NotASendCommand);
            }
        };

        let now = Timestamp::new(self.clock.now_millis());
        let message = self
            .repository
            .append_message(Sender::Relay, content, now)
            .await;
        tracing::info!("Relay message {} posted from chat '{}'", message.id, chat);

        let targets = self.repository.active_connections().await;
        broadcast_event(
            self.message_pusher.as_ref(),
            &targets,
            &RoomEvent::Message(message.clone()),
        )
        .await;

        enqueue_relay(
            &self.outbox,
            RelayCommand::Reply {
                chat,
                text: SEND_CONFIRMATION.to_string(),
            },
        );

        Ok(message)
    }

    fn reply_usage(&self, chat: RelayChatId) {
        enqueue_relay(
            &self.outbox,
            RelayCommand::Reply {
                chat,
                text: SEND_USAGE.to_string(),
            },
        );
    }
}
