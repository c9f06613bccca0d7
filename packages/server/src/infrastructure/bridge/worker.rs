//! Background tasks that connect a `BridgeAdapter` to the room.
//!
//! The outbound worker drains the relay outbox. The inbound listener polls the
//! adapter and hands each message to a sink. Neither task ever blocks the
//! coordinator; failures are logged and dropped.

use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};

use crate::domain::{BridgeAdapter, RelayCommand, RelayInbound};

/// Delay before polling again after a failed poll.
pub const DEFAULT_POLL_BACKOFF: Duration = Duration::from_secs(5);

/// Drain outbound relay commands until every outbox sender is dropped.
pub fn spawn_outbound_worker(
    adapter: Arc<dyn BridgeAdapter>,
    mut commands: mpsc::UnboundedReceiver<RelayCommand>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(command) = commands.recv().await {
            let result = match &command {
                RelayCommand::Post(text) => adapter.send_outbound(text).await,
                RelayCommand::Reply { chat, text } => adapter.reply(chat, text).await,
            };
            if let Err(e) = result {
                tracing::warn!("Bridge '{}' failed to deliver {:?}: {}", adapter.name(), command, e);
            }
        }
        tracing::debug!("Relay outbox closed, outbound worker stopped");
    })
}

/// Poll the adapter and forward inbound messages until the sink is closed.
pub fn spawn_inbound_listener(
    adapter: Arc<dyn BridgeAdapter>,
    sink: mpsc::UnboundedSender<RelayInbound>,
    backoff: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!("Bridge '{}' inbound listener started", adapter.name());
        while !sink.is_closed() {
            match adapter.poll_inbound().await {
                Ok(batch) => {
                    for inbound in batch {
                        tracing::debug!("Relay message from chat '{}'", inbound.chat);
                        if sink.send(inbound).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Bridge '{}' poll failed, retrying in {:?}: {}",
                        adapter.name(),
                        backoff,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }
        tracing::debug!("Bridge '{}' inbound listener stopped", adapter.name());
    })
}
