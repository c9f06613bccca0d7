//! ユースケースのテスト用ヘルパー

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use hiroba_shared::time::FixedClock;
use tokio::sync::{Mutex as AsyncMutex, mpsc};

use crate::{
    domain::{
        AdmissionGate, ConnectionId, MessagePushError, MessagePusher, PusherChannel,
        RelayCommand, RelayOutbox, Room, RoomEvent, RoomRepository, SharedSecret, Timestamp,
    },
    infrastructure::repository::InMemoryRoomRepository,
};

pub(crate) const SECRET: &str = "secret";
pub(crate) const NOW: i64 = 1_700_000_000_000;

/// 送信されたイベントを接続ごとに記録する MessagePusher
#[derive(Default)]
pub(crate) struct RecordingPusher {
    registered: Mutex<HashSet<ConnectionId>>,
    events: Mutex<Vec<(ConnectionId, RoomEvent)>>,
}

impl RecordingPusher {
    pub(crate) fn events_for(&self, connection_id: &ConnectionId) -> Vec<RoomEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == connection_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub(crate) fn total_events(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub(crate) fn is_registered(&self, connection_id: &ConnectionId) -> bool {
        self.registered.lock().unwrap().contains(connection_id)
    }

    fn record(&self, connection_id: ConnectionId, event: &RoomEvent) {
        self.events
            .lock()
            .unwrap()
            .push((connection_id, event.clone()));
    }
}

#[async_trait]
impl MessagePusher for RecordingPusher {
    async fn register_client(&self, connection_id: ConnectionId, _sender: PusherChannel) {
        self.registered.lock().unwrap().insert(connection_id);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        self.registered.lock().unwrap().remove(connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        if !self.is_registered(connection_id) {
            return Err(MessagePushError::ClientNotFound(connection_id.to_string()));
        }
        self.record(*connection_id, event);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: &[ConnectionId],
        event: &RoomEvent,
    ) -> Result<(), MessagePushError> {
        for target in targets {
            if self.is_registered(target) {
                self.record(*target, event);
            }
        }
        Ok(())
    }
}

/// ユースケースの依存一式
pub(crate) struct Fixture {
    pub(crate) repository: Arc<InMemoryRoomRepository>,
    pub(crate) pusher: Arc<RecordingPusher>,
    pub(crate) outbox: RelayOutbox,
    pub(crate) relay_rx: mpsc::UnboundedReceiver<RelayCommand>,
    pub(crate) clock: Arc<FixedClock>,
}

impl Fixture {
    pub(crate) fn new(history_capacity: usize) -> Self {
        let room = Arc::new(AsyncMutex::new(Room::new(
            Timestamp::new(NOW),
            history_capacity,
        )));
        let (outbox, relay_rx) = mpsc::unbounded_channel();
        Self {
            repository: Arc::new(InMemoryRoomRepository::new(room)),
            pusher: Arc::new(RecordingPusher::default()),
            outbox,
            relay_rx,
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    pub(crate) fn gate(&self) -> AdmissionGate {
        AdmissionGate::new(SharedSecret::new(SECRET))
    }

    /// 未認証の接続を 1 つ開き、送信先として登録する
    pub(crate) async fn open(&self) -> ConnectionId {
        let connection_id = ConnectionId::generate();
        self.repository
            .open_connection(connection_id, Timestamp::new(NOW))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        self.pusher.register_client(connection_id, tx).await;
        connection_id
    }

    /// 入室済みの接続を 1 つ用意する
    pub(crate) async fn join(&self, nickname: &str) -> ConnectionId {
        let connection_id = self.open().await;
        self.repository
            .admit(&connection_id, &self.gate(), nickname, SECRET)
            .await
            .unwrap();
        connection_id
    }

    pub(crate) fn drain_relay(&mut self) -> Vec<RelayCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.relay_rx.try_recv() {
            commands.push(command);
        }
        commands
    }
}
