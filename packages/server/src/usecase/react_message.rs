//! UseCase: リアクション処理
//!
//! 対象メッセージが履歴から追い出されている場合、またはシンボルの種類数が
//! 上限に達している場合は加算せず、更新の配信も行いません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, MessageId, MessagePusher, ReactionSymbol, RoomEvent, RoomRepository,
};

use super::{broadcast_event, error::ReactMessageError};

/// リアクションのユースケース
pub struct ReactMessageUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl ReactMessageUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// リアクションを加算し、更新後の件数を全員に配信
    ///
    /// # Returns
    ///
    /// * `Ok(u32)` - 加算後の件数
    /// * `Err(ReactMessageError)` - 未入室、不正なシンボル、または対象メッセージなし
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        message_id: MessageId,
        symbol: &str,
    ) -> Result<u32, ReactMessageError> {
        self.repository.identity_of(connection_id).await?;
        let symbol = ReactionSymbol::new(symbol)?;

        let count = self
            .repository
            .apply_reaction(&message_id, symbol.clone())
            .await
            .ok_or_else(|| ReactMessageError::NotApplied(message_id.to_string()))?;

        let targets = self.repository.active_connections().await;
        broadcast_event(
            self.message_pusher.as_ref(),
            &targets,
            &RoomEvent::ReactionUpdate {
                message_id,
                symbol,
                count,
            },
        )
        .await;

        Ok(count)
    }
}
