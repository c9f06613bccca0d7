//! UseCase: Room 状態の取得（HTTP API・デバッグ用）

use std::sync::Arc;

use crate::domain::{ChatMessage, Room, RoomRepository};

pub struct GetRoomStateUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomStateUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// Room 集約のスナップショット
    pub async fn execute(&self) -> Room {
        self.repository.get_room().await
    }

    /// 履歴のスナップショット（受理順）
    pub async fn history(&self) -> Vec<ChatMessage> {
        self.repository.history_snapshot().await
    }
}
