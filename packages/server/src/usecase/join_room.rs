//! UseCase: 入室処理
//!
//! `Unauthenticated → Active` の遷移。入室判定と Presence への登録は
//! Repository の 1 操作で行い、成功後に履歴の送信と入室通知を行います。

use std::sync::Arc;

use hiroba_shared::time::Clock;

use crate::domain::{
    AdmissionGate, AdmitError, ConnectionId, Identity, MessageContent, MessagePusher,
    RelayCommand, RelayOutbox, RoomEvent, RoomRepository, Sender, Timestamp, bridge,
};

use super::{broadcast_event, enqueue_relay, error::JoinError};

/// 入室のユースケース
pub struct JoinRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    gate: AdmissionGate,
    outbox: RelayOutbox,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        gate: AdmissionGate,
        outbox: RelayOutbox,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            gate,
            outbox,
            clock,
        }
    }

    /// 入室を実行
    ///
    /// 拒否された場合は理由を接続にのみ通知し、`JoinError::Rejected` を返します。
    /// 拒否された試行は Presence にも履歴にも痕跡を残しません。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        nickname: &str,
        password: &str,
    ) -> Result<Identity, JoinError> {
        let identity = match self
            .repository
            .admit(connection_id, &self.gate, nickname, password)
            .await
        {
            Ok(identity) => identity,
            Err(AdmitError::Rejected(rejection)) => {
                tracing::warn!(
                    "Connection '{}' rejected ({}) for nickname '{}'",
                    connection_id,
                    rejection.code(),
                    nickname.trim()
                );
                if let Err(e) = self
                    .message_pusher
                    .push_to(connection_id, &RoomEvent::Error(rejection))
                    .await
                {
                    tracing::warn!("Failed to notify rejection to '{}': {}", connection_id, e);
                }
                return Err(JoinError::Rejected(rejection));
            }
            Err(AdmitError::Room(e)) => return Err(e.into()),
        };
        tracing::info!("'{}' joined on connection '{}'", identity, connection_id);

        // 1. 入室した接続に履歴を送信（入室メッセージより前の状態）
        let history = self.repository.history_snapshot().await;
        if let Err(e) = self
            .message_pusher
            .push_to(connection_id, &RoomEvent::History(history))
            .await
        {
            tracing::warn!("Failed to send history to '{}': {}", connection_id, e);
        }

        // 2. 入室のシステムメッセージを履歴に追加
        let content = MessageContent::joined(&identity);
        let now = Timestamp::new(self.clock.now_millis());
        let message = self
            .repository
            .append_message(Sender::System, content, now)
            .await;

        // 3. Presence と入室メッセージを全員に送信
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

        // 4. ブリッジへ通知（完了は待たない）
        enqueue_relay(&self.outbox, RelayCommand::Post(bridge::joined_notice(&identity)));

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{AdmissionRejection, RelayCommand},
        usecase::test_support::{Fixture, SECRET},
    };

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 入室成功時: 履歴の送信、入室メッセージの追加、Presence とメッセージのブロードキャスト、ブリッジ通知
    // - 入室拒否時: 拒否理由の単独通知、状態に痕跡が残らないこと
    // - 判定順序: missing-identity → bad-credential → identity-taken
    // ========================================

    fn create_usecase(fixture: &Fixture) -> JoinRoomUseCase {
        JoinRoomUseCase::new(
            fixture.repository.clone(),
            fixture.pusher.clone(),
            fixture.gate(),
            fixture.outbox.clone(),
            fixture.clock.clone(),
        )
    }

    #[tokio::test]
    async fn test_join_success_sends_history_presence_and_message() {
        // テスト項目: 入室成功で履歴 → Presence → 入室メッセージの順に届く
        // given (前提条件):
        let mut fixture = Fixture::new(100);
        let usecase = create_usecase(&fixture);
        let bob = fixture.join("bob").await;
        let alice = fixture.open().await;

        // when (操作):
        let result = usecase.execute(&alice, "  alice ", SECRET).await;

        // then (期待する結果):
        assert_eq!(result, Ok(Identity::new("alice").unwrap()));

        let alice_events = fixture.pusher.events_for(&alice);
        assert_eq!(alice_events.len(), 3);
        assert_eq!(alice_events[0], RoomEvent::History(vec![]));
        assert_eq!(
            alice_events[1],
            RoomEvent::Presence(vec![
                Identity::new("alice").unwrap(),
                Identity::new("bob").unwrap(),
            ])
        );
        match &alice_events[2] {
            RoomEvent::Message(message) => {
                assert_eq!(message.sender, Sender::System);
                assert_eq!(message.content.payload(), "alice has joined the chat.");
            }
            other => panic!("unexpected event: {:?}", other),
        }

        // 既存の参加者には Presence と入室メッセージのみ
        assert_eq!(fixture.pusher.events_for(&bob).len(), 2);
        assert_eq!(fixture.repository.history_snapshot().await.len(), 1);
        assert_eq!(
            fixture.drain_relay(),
            vec![RelayCommand::Post("alice joined the chat.".to_string())]
        );
    }

    #[tokio::test]
    async fn test_join_identity_taken() {
        // テスト項目: 在室中の名前での入室は identity-taken で拒否され、本人にだけ通知される
        // given (前提条件):
        let mut fixture = Fixture::new(100);
        let usecase = create_usecase(&fixture);
        let first = fixture.open().await;
        usecase.execute(&first, "alice", SECRET).await.unwrap();
        fixture.drain_relay();
        let events_before = fixture.pusher.events_for(&first).len();
        let second = fixture.open().await;

        // when (操作):
        let result = usecase.execute(&second, "alice", SECRET).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(JoinError::Rejected(AdmissionRejection::IdentityTaken))
        );
        assert_eq!(
            fixture.pusher.events_for(&second),
            vec![RoomEvent::Error(AdmissionRejection::IdentityTaken)]
        );
        assert_eq!(fixture.pusher.events_for(&first).len(), events_before);
        assert_eq!(fixture.repository.presence_snapshot().await.len(), 1);
        assert_eq!(fixture.repository.history_snapshot().await.len(), 1);
        assert!(fixture.drain_relay().is_empty());
    }

    #[tokio::test]
    async fn test_join_rejection_order() {
        // テスト項目: 空の名前は資格情報より先に missing-identity で拒否される
        // given (前提条件):
        let fixture = Fixture::new(100);
        let usecase = create_usecase(&fixture);
        let connection_id = fixture.open().await;

        // when (操作):
        let missing = usecase.execute(&connection_id, "   ", "wrong").await;
        let bad = usecase.execute(&connection_id, "alice", "wrong").await;

        // then (期待する結果):
        assert_eq!(
            missing,
            Err(JoinError::Rejected(AdmissionRejection::MissingIdentity))
        );
        assert_eq!(
            bad,
            Err(JoinError::Rejected(AdmissionRejection::BadCredential))
        );
        assert!(fixture.repository.presence_snapshot().await.is_empty());
        assert!(fixture.repository.history_snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_join_unknown_connection() {
        // テスト項目: 登録されていない接続からの入室は状態エラーになる
        // given (前提条件):
        let fixture = Fixture::new(100);
        let usecase = create_usecase(&fixture);

        // when (操作):
        let result = usecase
            .execute(&ConnectionId::generate(), "alice", SECRET)
            .await;

        // then (期待する結果):
        assert!(matches!(result, Err(JoinError::InvalidState(_))));
    }
}
