//! WebSocket client session management.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use hiroba_server::{
    domain::DEFAULT_HISTORY_CAPACITY,
    infrastructure::dto::websocket::{ClientFrame, ServerFrame},
};
use tokio::{
    net::TcpStream,
    sync::{Mutex, mpsc},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async, tungstenite::protocol::Message,
};

use crate::{
    domain::{UserCommand, parse_input, resolve_message_id},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Ids of recently seen messages, used to resolve `/react` prefixes
type KnownIds = Arc<Mutex<Vec<String>>>;

async fn remember_ids(known_ids: &KnownIds, ids: impl IntoIterator<Item = String>) {
    let mut known = known_ids.lock().await;
    known.extend(ids);
    let overflow = known.len().saturating_sub(DEFAULT_HISTORY_CAPACITY);
    known.drain(..overflow);
}

async fn send_frame(write: &mut WsSink, frame: &ClientFrame) -> Result<(), ClientError> {
    let json =
        serde_json::to_string(frame).map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    write
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ClientError::ConnectionLost)
}

/// Render one server frame. Returns the rejection reason for an `error` frame.
async fn render_frame(frame: ServerFrame, nickname: &str, known_ids: &KnownIds) -> Option<String> {
    let output = match frame {
        ServerFrame::History { messages } => {
            remember_ids(known_ids, messages.iter().map(|m| m.id.clone())).await;
            MessageFormatter::format_history(&messages)
        }
        ServerFrame::Presence { identities } => {
            MessageFormatter::format_presence(&identities, nickname)
        }
        ServerFrame::Message { message } => {
            remember_ids(known_ids, [message.id.clone()]).await;
            MessageFormatter::format_message(&message)
        }
        ServerFrame::ReactionUpdate {
            message_id,
            symbol,
            count,
        } => MessageFormatter::format_reaction(&message_id, &symbol, count),
        ServerFrame::Error { reason, .. } => {
            print!("{}", MessageFormatter::format_rejection(&reason));
            return Some(reason);
        }
    };
    print!("{}", output);
    redisplay_prompt(nickname);
    None
}

/// Run one session: connect, join, then relay input and render frames until
/// the user quits or the connection ends.
///
/// `input` outlives the session so that a reconnect keeps the same reader.
pub async fn run_client_session(
    url: &str,
    nickname: &str,
    password: &str,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _) = connect_async(url)
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    tracing::info!("Connected to chat server!");

    let (mut write, mut read) = ws_stream.split();
    send_frame(
        &mut write,
        &ClientFrame::Join {
            nickname: nickname.to_string(),
            password: password.to_string(),
        },
    )
    .await?;

    println!(
        "\nYou are '{}'. Type a message and press Enter. /image|/video|/audio|/gif <url>, /react <id> <symbol>, /quit.\n",
        nickname
    );

    let known_ids: KnownIds = Arc::new(Mutex::new(Vec::new()));

    // Spawn a task to handle incoming frames
    let nickname_for_read = nickname.to_string();
    let known_ids_for_read = known_ids.clone();
    let mut read_task = tokio::spawn(async move {
        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => match serde_json::from_str::<ServerFrame>(text.as_str()) {
                    Ok(frame) => {
                        if let Some(reason) =
                            render_frame(frame, &nickname_for_read, &known_ids_for_read).await
                        {
                            return ClientError::Rejected(reason);
                        }
                    }
                    Err(e) => tracing::warn!("Unrecognized frame: {}", e),
                },
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        ClientError::ConnectionLost
    });

    loop {
        tokio::select! {
            read_result = &mut read_task => {
                return Err(read_result.unwrap_or(ClientError::ConnectionLost));
            }
            line = input.recv() => {
                let command = match line {
                    Some(line) => parse_input(&line),
                    // stdin closed (Ctrl+C / Ctrl+D)
                    None => UserCommand::Quit,
                };

                let frame = match command {
                    UserCommand::Send { kind, payload } => ClientFrame::Message {
                        kind: kind.as_str().to_string(),
                        payload,
                    },
                    UserCommand::React { id_prefix, symbol } => {
                        let known = known_ids.lock().await;
                        match resolve_message_id(&id_prefix, &known) {
                            Some(message_id) => ClientFrame::Reaction {
                                message_id: message_id.to_string(),
                                symbol,
                            },
                            None => {
                                print!(
                                    "{}",
                                    MessageFormatter::format_notice(&format!(
                                        "No single message matches '{}'",
                                        id_prefix
                                    ))
                                );
                                redisplay_prompt(nickname);
                                continue;
                            }
                        }
                    }
                    UserCommand::Invalid(notice) => {
                        print!("{}", MessageFormatter::format_notice(&notice));
                        redisplay_prompt(nickname);
                        continue;
                    }
                    UserCommand::Quit => {
                        let _ = send_frame(&mut write, &ClientFrame::Leave).await;
                        let _ = write.close().await;
                        read_task.abort();
                        return Ok(());
                    }
                };

                if let Err(e) = send_frame(&mut write, &frame).await {
                    read_task.abort();
                    return Err(e);
                }
            }
        }
    }
}
