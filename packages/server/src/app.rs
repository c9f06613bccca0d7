//! Wiring of the server: repository, pusher, coordinator, bridge tasks.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};
use tokio::sync::{Mutex, mpsc};

use crate::{
    config::ServerConfig,
    domain::{
        AdmissionGate, BridgeAdapter, BridgeError, RelayCommand, Room, SharedSecret, Timestamp,
    },
    infrastructure::{
        bridge::{
            DisabledBridge, TelegramBridge, TelegramConfig, spawn_inbound_listener,
            spawn_outbound_worker, worker::DEFAULT_POLL_BACKOFF,
        },
        message_pusher::WebSocketMessagePusher,
        repository::InMemoryRoomRepository,
    },
    ui::Server,
    usecase::ChatCoordinator,
};

/// Build the coordinator over a fresh in-memory room.
///
/// Returns the receiving end of the relay outbox; whoever drives the bridge
/// must drain it.
pub fn build_coordinator(
    password: &str,
    history_capacity: usize,
) -> (Arc<ChatCoordinator>, mpsc::UnboundedReceiver<RelayCommand>) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Repository（インメモリ）
    let room = Arc::new(Mutex::new(Room::new(
        Timestamp::new(clock.now_millis()),
        history_capacity,
    )));
    let repository = Arc::new(InMemoryRoomRepository::new(room));

    // 2. MessagePusher（WebSocket）
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Coordinator
    let (outbox, relay_rx) = mpsc::unbounded_channel();
    let gate = AdmissionGate::new(SharedSecret::new(password));
    let coordinator = Arc::new(ChatCoordinator::new(
        repository,
        message_pusher,
        gate,
        outbox,
        clock,
    ));

    (coordinator, relay_rx)
}

/// Select the bridge adapter. `None` token means the bridge is disabled.
fn build_bridge(config: &ServerConfig) -> Result<Option<Arc<dyn BridgeAdapter>>, BridgeError> {
    let Some(token) = &config.telegram_token else {
        return Ok(None);
    };
    if config.telegram_chat_id.is_none() {
        tracing::warn!("TELEGRAM_CHAT_ID is not set; room notices will not be mirrored");
    }
    let bridge = TelegramBridge::new(TelegramConfig::new(
        token.clone(),
        config.telegram_chat_id.clone(),
        config.telegram_poll_timeout(),
    ))?;
    Ok(Some(Arc::new(bridge)))
}

/// Start the bridge tasks and serve until shutdown.
pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (coordinator, relay_rx) = build_coordinator(&config.password, config.history_capacity);
    tracing::info!(
        "Room created (history capacity {})",
        config.history_capacity
    );

    match build_bridge(&config)? {
        Some(bridge) => {
            tracing::info!("Bridge '{}' enabled", bridge.name());
            spawn_outbound_worker(bridge.clone(), relay_rx);

            let (sink, mut inbound_rx) = mpsc::unbounded_channel();
            spawn_inbound_listener(bridge, sink, DEFAULT_POLL_BACKOFF);
            let relay_coordinator = coordinator.clone();
            tokio::spawn(async move {
                while let Some(inbound) = inbound_rx.recv().await {
                    relay_coordinator.relay(inbound).await;
                }
            });
        }
        None => {
            tracing::info!("TELEGRAM_TOKEN is not set; bridge disabled");
            spawn_outbound_worker(Arc::new(DisabledBridge), relay_rx);
        }
    }

    Server::new(coordinator)
        .run(&config.host, config.port)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_bridge_disabled_without_token() {
        // テスト項目: トークン未設定ならブリッジは無効
        // given (前提条件):
        let mut config = ServerConfig::parse_from(["hiroba-server"]);
        config.telegram_token = None;

        // when (操作):
        let bridge = build_bridge(&config).unwrap();

        // then (期待する結果):
        assert!(bridge.is_none());
    }

    #[test]
    fn test_bridge_enabled_with_token() {
        // テスト項目: トークンがあれば Telegram アダプタが選ばれる
        // given (前提条件):
        let mut config = ServerConfig::parse_from(["hiroba-server"]);
        config.telegram_token = Some("token".to_string());
        config.telegram_chat_id = Some("-100".to_string());

        // when (操作):
        let bridge = build_bridge(&config).unwrap();

        // then (期待する結果):
        assert_eq!(bridge.map(|b| b.name()), Some("telegram"));
    }
}
