//! Broadcast Coordinator
//!
//! WebSocket 接続とブリッジからのイベントはすべて 1 つの `ChatCoordinator` を通ります。
//! 非同期 Mutex 1 つでイベント処理を直列化するため、入室判定・履歴への追加と
//! それに伴う配信は 1 イベントずつ適用され、全接続が同じ順序で配信を受け取ります。
//! 配信とブリッジ送信はキューに積むだけなので、ガードを保持したまま遅い相手を待つことはありません。

use std::sync::Arc;

use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    AdmissionGate, ConnectionId, InboundEvent, MessageKind, MessageId, MessagePusher,
    PusherChannel, RelayInbound, RelayOutbox, RepositoryError, RoomError, RoomRepository,
    Timestamp,
};

use super::{
    GetRoomStateUseCase, JoinError, JoinRoomUseCase, LeaveRoomUseCase, ReactMessageError,
    ReactMessageUseCase, RelayInboundUseCase, SendMessageError, SendMessageUseCase,
};

/// イベント処理後にトランスポートが接続をどう扱うか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// 未送信のフレームを送り切ってからソケットを閉じる
    Close,
}

pub struct ChatCoordinator {
    serial: Mutex<()>,
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    join_room: JoinRoomUseCase,
    send_message: SendMessageUseCase,
    react_message: ReactMessageUseCase,
    leave_room: LeaveRoomUseCase,
    relay_inbound: RelayInboundUseCase,
}

impl ChatCoordinator {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        gate: AdmissionGate,
        outbox: RelayOutbox,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            serial: Mutex::new(()),
            join_room: JoinRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                gate,
                outbox.clone(),
                clock.clone(),
            ),
            send_message: SendMessageUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                outbox.clone(),
                clock.clone(),
            ),
            react_message: ReactMessageUseCase::new(repository.clone(), message_pusher.clone()),
            leave_room: LeaveRoomUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                outbox.clone(),
                clock.clone(),
            ),
            relay_inbound: RelayInboundUseCase::new(
                repository.clone(),
                message_pusher.clone(),
                outbox,
                clock.clone(),
            ),
            repository,
            message_pusher,
            clock,
        }
    }

    /// HTTP API 用の読み取り専用ビュー
    pub fn room_state(&self) -> GetRoomStateUseCase {
        GetRoomStateUseCase::new(self.repository.clone())
    }

    /// 新しいトランスポートセッションを登録（`Connecting → Unauthenticated`）
    pub async fn connect(&self, sender: PusherChannel) -> Result<ConnectionId, RepositoryError> {
        let _guard = self.serial.lock().await;

        let connection_id = ConnectionId::generate();
        let opened_at = Timestamp::new(self.clock.now_millis());
        self.repository
            .open_connection(connection_id, opened_at)
            .await?;
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        tracing::info!("Connection '{}' opened", connection_id);
        Ok(connection_id)
    }

    /// イベントを専用タスクで処理し、その完了を待つ
    ///
    /// 呼び出し側の future が途中で破棄されても、処理中のイベントは最後まで適用されます。
    /// トランスポートからはこちらを使います。
    pub async fn dispatch(self: &Arc<Self>, connection_id: ConnectionId, event: InboundEvent) -> Flow {
        let coordinator = Arc::clone(self);
        let task = tokio::spawn(async move { coordinator.handle(&connection_id, event).await });
        match task.await {
            Ok(flow) => flow,
            Err(e) => {
                tracing::error!("Event task for '{}' failed: {}", connection_id, e);
                Flow::Close
            }
        }
    }

    /// 接続からのイベントを 1 つ処理
    pub async fn handle(&self, connection_id: &ConnectionId, event: InboundEvent) -> Flow {
        let _guard = self.serial.lock().await;

        match event {
            InboundEvent::Join { nickname, password } => {
                self.on_join(connection_id, &nickname, &password).await
            }
            InboundEvent::Message { kind, payload } => {
                self.on_message(connection_id, kind, payload).await;
                Flow::Continue
            }
            InboundEvent::Reaction { message_id, symbol } => {
                self.on_reaction(connection_id, message_id, &symbol).await;
                Flow::Continue
            }
            InboundEvent::Leave => {
                tracing::info!("Connection '{}' requested leave", connection_id);
                self.leave_room.execute(connection_id).await;
                Flow::Close
            }
        }
    }

    /// トランスポートの切断（複数回呼んでも安全）
    pub async fn disconnect(&self, connection_id: &ConnectionId) {
        let _guard = self.serial.lock().await;
        self.leave_room.execute(connection_id).await;
    }

    /// ブリッジからの受信テキスト
    pub async fn relay(&self, inbound: RelayInbound) {
        let _guard = self.serial.lock().await;
        if let Err(e) = self.relay_inbound.execute(inbound).await {
            tracing::debug!("Relay text not posted: {}", e);
        }
    }

    async fn on_join(&self, connection_id: &ConnectionId, nickname: &str, password: &str) -> Flow {
        if self.repository.identity_of(connection_id).await.is_ok() {
            tracing::warn!(
                "Connection '{}' sent join while already joined, ignoring",
                connection_id
            );
            return Flow::Continue;
        }

        match self.join_room.execute(connection_id, nickname, password).await {
            Ok(_) => Flow::Continue,
            Err(JoinError::Rejected(_)) => Flow::Close,
            Err(JoinError::InvalidState(RoomError::UnknownConnection(_))) => {
                tracing::warn!("Join from unknown connection '{}'", connection_id);
                Flow::Close
            }
            Err(e) => {
                tracing::warn!("Join from '{}' ignored: {}", connection_id, e);
                Flow::Continue
            }
        }
    }

    async fn on_message(&self, connection_id: &ConnectionId, kind: MessageKind, payload: String) {
        match self.send_message.execute(connection_id, kind, payload).await {
            Ok(_) => {}
            Err(SendMessageError::NotJoined(e)) => {
                tracing::warn!("Message from '{}' dropped: {}", connection_id, e);
            }
            Err(SendMessageError::InvalidContent(e)) => {
                tracing::debug!("Message from '{}' dropped: {}", connection_id, e);
            }
        }
    }

    async fn on_reaction(&self, connection_id: &ConnectionId, message_id: MessageId, symbol: &str) {
        match self
            .react_message
            .execute(connection_id, message_id, symbol)
            .await
        {
            Ok(_) => {}
            Err(ReactMessageError::NotJoined(e)) => {
                tracing::warn!("Reaction from '{}' dropped: {}", connection_id, e);
            }
            Err(e) => {
                tracing::debug!("Reaction from '{}' dropped: {}", connection_id, e);
            }
        }
    }
}
