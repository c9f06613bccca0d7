//! WebSocket connection handler.
//!
//! Each socket gets two tasks: one reads client frames and feeds them to the
//! coordinator, the other drains the connection's pusher channel into the
//! socket. When the coordinator asks to close (rejected join, leave) the read
//! side stops, the connection is unregistered, and the write side flushes
//! whatever is still queued before closing the socket.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{ConnectionId, InboundEvent},
    infrastructure::dto::websocket::ClientFrame,
    ui::state::AppState,
    usecase::Flow,
};

/// Upper bound on the time spent flushing queued frames after the read side ends.
const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that drains the pusher channel into the WebSocket sink.
///
/// The task ends once the channel is closed (the connection was unregistered)
/// and every queued frame has been written, or when the socket fails.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = sender.close().await;
    })
}

/// Decode a text frame into an inbound event. Malformed frames are dropped.
fn parse_frame(connection_id: &ConnectionId, text: &str) -> Option<InboundEvent> {
    let frame = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Malformed frame from '{}': {}", connection_id, e);
            return None;
        }
    };
    match InboundEvent::try_from(frame) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Invalid frame from '{}': {}", connection_id, e);
            None
        }
    }
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Connecting → Unauthenticated
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = match state.coordinator.connect(tx).await {
        Ok(id) => id,
        Err(e) => {
            tracing::error!("Failed to open connection: {}", e);
            return;
        }
    };

    let mut send_task = pusher_loop(rx, sender);

    let coordinator = state.coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Frame from '{}': {}", connection_id, text.as_str());
                    let Some(event) = parse_frame(&connection_id, text.as_str()) else {
                        continue;
                    };
                    if coordinator.dispatch(connection_id, event).await == Flow::Close {
                        break;
                    }
                }
                Message::Binary(_) => {
                    tracing::debug!("Ignoring binary frame from '{}'", connection_id);
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                _ => {}
            }
        }
    });

    let send_finished = tokio::select! {
        _ = &mut recv_task => false,
        _ = &mut send_task => {
            // Events already dispatched run to completion in their own task.
            recv_task.abort();
            true
        }
    };

    // Active → Closed (no-op if the coordinator already closed it)
    state.coordinator.disconnect(&connection_id).await;

    if !send_finished && tokio::time::timeout(FLUSH_TIMEOUT, &mut send_task).await.is_err() {
        tracing::warn!("Timed out flushing frames to '{}'", connection_id);
        send_task.abort();
    }
    tracing::info!("Connection '{}' closed", connection_id);
}
