//! End-to-end tests: serve the router on an ephemeral port and drive it over
//! real WebSocket connections.

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use hiroba_server::{app::build_coordinator, domain::RelayCommand, ui::Server};
use serde_json::{Value, json};
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

const SECRET: &str = "secret";
const RECV_TIMEOUT: Duration = Duration::from_secs(3);

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Helper struct to manage an in-process server
struct TestServer {
    addr: SocketAddr,
    relay_rx: mpsc::UnboundedReceiver<RelayCommand>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    async fn start(history_capacity: usize) -> Self {
        let (coordinator, relay_rx) = build_coordinator(SECRET, history_capacity);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            Server::new(coordinator)
                .serve(listener, async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            relay_rx,
            shutdown: Some(shutdown),
        }
    }

    fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn connect(&self) -> Client {
        let (client, _) = connect_async(self.ws_url()).await.unwrap();
        client
    }

    /// Connect, join and consume the frames produced by the join itself.
    async fn join(&self, nickname: &str) -> Client {
        let mut client = self.connect().await;
        send(&mut client, join_frame(nickname, SECRET)).await;
        assert_eq!(recv(&mut client).await["type"], "history");
        assert_eq!(recv(&mut client).await["type"], "presence");
        assert_eq!(recv(&mut client).await["type"], "message");
        client
    }

    async fn next_relay(&mut self) -> RelayCommand {
        tokio::time::timeout(RECV_TIMEOUT, self.relay_rx.recv())
            .await
            .expect("timed out waiting for relay command")
            .expect("relay outbox closed")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

fn join_frame(nickname: &str, password: &str) -> Value {
    json!({"type": "join", "nickname": nickname, "password": password})
}

fn text_frame(payload: &str) -> Value {
    json!({"type": "message", "kind": "text", "payload": payload})
}

async fn send(client: &mut Client, frame: Value) {
    client
        .send(Message::Text(frame.to_string().into()))
        .await
        .unwrap();
}

/// Next text frame as JSON.
async fn recv(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Wait until the server closes the connection.
async fn expect_closed(client: &mut Client) {
    loop {
        let next = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .expect("timed out waiting for close");
        match next {
            None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
            Some(Ok(Message::Text(text))) => panic!("unexpected frame: {}", text.as_str()),
            Some(Ok(_)) => {}
        }
    }
}

#[tokio::test]
async fn test_join_receives_history_and_presence() {
    // テスト項目: 入室で履歴、Presence、入室メッセージの順に届き、既存の参加者にも通知される
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut alice = server.join("alice").await;

    // when (操作):
    let mut bob = server.connect().await;
    send(&mut bob, join_frame("bob", SECRET)).await;

    // then (期待する結果):
    let history = recv(&mut bob).await;
    assert_eq!(history["type"], "history");
    assert_eq!(history["messages"].as_array().unwrap().len(), 1);
    assert_eq!(
        history["messages"][0]["payload"],
        "alice has joined the chat."
    );
    assert_eq!(history["messages"][0]["origin"], "system");

    let presence = recv(&mut bob).await;
    assert_eq!(presence, json!({"type": "presence", "identities": ["alice", "bob"]}));

    let joined = recv(&mut bob).await;
    assert_eq!(joined["message"]["payload"], "bob has joined the chat.");

    assert_eq!(recv(&mut alice).await, presence);
    assert_eq!(recv(&mut alice).await["message"]["payload"], "bob has joined the chat.");
}

#[tokio::test]
async fn test_message_and_reaction_are_broadcast() {
    // テスト項目: メッセージとリアクションの更新が全員に同じ順序で届く
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut alice = server.join("alice").await;
    let mut bob = server.join("bob").await;
    recv(&mut alice).await; // bob の presence
    recv(&mut alice).await; // bob の入室メッセージ

    // when (操作):
    send(&mut alice, text_frame("hello")).await;
    let message = recv(&mut bob).await;
    assert_eq!(recv(&mut alice).await, message);
    let message_id = message["message"]["id"].as_str().unwrap().to_string();
    send(
        &mut bob,
        json!({"type": "reaction", "message_id": message_id, "symbol": "👍"}),
    )
    .await;

    // then (期待する結果):
    assert_eq!(message["message"]["sender"], "alice");
    assert_eq!(message["message"]["origin"], "participant");
    assert_eq!(message["message"]["kind"], "text");
    let expected = json!({
        "type": "reaction-update",
        "message_id": message_id,
        "symbol": "👍",
        "count": 1
    });
    assert_eq!(recv(&mut alice).await, expected);
    assert_eq!(recv(&mut bob).await, expected);
}

#[tokio::test]
async fn test_bad_credential_is_rejected_and_closed() {
    // テスト項目: 誤った資格情報では error フレームだけが届き、接続が閉じられる
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut client = server.connect().await;

    // when (操作):
    send(&mut client, join_frame("alice", "wrong")).await;

    // then (期待する結果):
    let error = recv(&mut client).await;
    assert_eq!(error["type"], "error");
    assert_eq!(error["reason"], "bad-credential");
    expect_closed(&mut client).await;
}

#[tokio::test]
async fn test_join_without_nickname_is_rejected() {
    // テスト項目: nickname のない join は missing-identity で拒否され、接続が閉じられる
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut without_field = server.connect().await;
    let mut null_field = server.connect().await;

    // when (操作):
    send(&mut without_field, json!({"type": "join", "password": SECRET})).await;
    send(
        &mut null_field,
        json!({"type": "join", "nickname": null, "password": SECRET}),
    )
    .await;

    // then (期待する結果):
    for client in [&mut without_field, &mut null_field] {
        let error = recv(client).await;
        assert_eq!(error["type"], "error");
        assert_eq!(error["reason"], "missing-identity");
        expect_closed(client).await;
    }
}

#[tokio::test]
async fn test_identity_taken_is_rejected() {
    // テスト項目: 在室中の名前での入室は identity-taken で拒否される
    // given (前提条件):
    let server = TestServer::start(100).await;
    let _alice = server.join("alice").await;
    let mut impostor = server.connect().await;

    // when (操作):
    send(&mut impostor, join_frame("alice", SECRET)).await;

    // then (期待する結果):
    assert_eq!(recv(&mut impostor).await["reason"], "identity-taken");
    expect_closed(&mut impostor).await;
}

#[tokio::test]
async fn test_leave_notifies_others_and_frees_identity() {
    // テスト項目: leave で接続が閉じ、残りの参加者に通知され、名前が再利用できる
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut alice = server.join("alice").await;
    let mut bob = server.join("bob").await;
    recv(&mut alice).await;
    recv(&mut alice).await;

    // when (操作):
    send(&mut alice, json!({"type": "leave"})).await;

    // then (期待する結果):
    expect_closed(&mut alice).await;
    assert_eq!(
        recv(&mut bob).await,
        json!({"type": "presence", "identities": ["bob"]})
    );
    assert_eq!(
        recv(&mut bob).await["message"]["payload"],
        "alice has left the chat."
    );
    let _alice_again = server.join("alice").await;
}

#[tokio::test]
async fn test_dropped_connection_counts_as_disconnect() {
    // テスト項目: トランスポートの切断でも退室として扱われる
    // given (前提条件):
    let server = TestServer::start(100).await;
    let alice = server.join("alice").await;
    let mut bob = server.join("bob").await;

    // when (操作):
    drop(alice);

    // then (期待する結果):
    assert_eq!(
        recv(&mut bob).await,
        json!({"type": "presence", "identities": ["bob"]})
    );
    assert_eq!(
        recv(&mut bob).await["message"]["payload"],
        "alice has left the chat."
    );
}

#[tokio::test]
async fn test_history_is_bounded() {
    // テスト項目: 容量 2 の履歴は最新の 2 件だけを新しい参加者に渡す
    // given (前提条件):
    let server = TestServer::start(2).await;
    let mut alice = server.join("alice").await;
    for text in ["a", "b", "c"] {
        send(&mut alice, text_frame(text)).await;
        recv(&mut alice).await;
    }

    // when (操作):
    let mut bob = server.connect().await;
    send(&mut bob, join_frame("bob", SECRET)).await;

    // then (期待する結果):
    let history = recv(&mut bob).await;
    let payloads: Vec<&str> = history["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["payload"].as_str().unwrap())
        .collect();
    assert_eq!(payloads, vec!["b", "c"]);
}

#[tokio::test]
async fn test_whitespace_and_malformed_frames_are_ignored() {
    // テスト項目: 空白のみのメッセージや不正なフレームは配信されず、接続も維持される
    // given (前提条件):
    let server = TestServer::start(100).await;
    let mut alice = server.join("alice").await;

    // when (操作):
    send(&mut alice, text_frame("   ")).await;
    send(&mut alice, json!({"type": "message", "kind": "sticker", "payload": "x"})).await;
    alice
        .send(Message::Text("not json".to_string().into()))
        .await
        .unwrap();
    send(&mut alice, text_frame("still here")).await;

    // then (期待する結果):
    let next = recv(&mut alice).await;
    assert_eq!(next["message"]["payload"], "still here");
}

#[tokio::test]
async fn test_bridge_receives_notices() {
    // テスト項目: 入室・発言・退室がブリッジ向けの通知としてキューに積まれる
    // given (前提条件):
    let mut server = TestServer::start(100).await;
    let mut alice = server.join("alice").await;

    // when (操作):
    send(
        &mut alice,
        json!({"type": "message", "kind": "video", "payload": "https://example.com/v.mp4"}),
    )
    .await;
    recv(&mut alice).await;
    send(&mut alice, json!({"type": "leave"})).await;
    expect_closed(&mut alice).await;

    // then (期待する結果):
    assert_eq!(
        server.next_relay().await,
        RelayCommand::Post("alice joined the chat.".to_string())
    );
    assert_eq!(
        server.next_relay().await,
        RelayCommand::Post("alice shared a video: https://example.com/v.mp4".to_string())
    );
    assert_eq!(
        server.next_relay().await,
        RelayCommand::Post("alice left the chat.".to_string())
    );
}

#[tokio::test]
async fn test_http_endpoints() {
    // テスト項目: ヘルスチェック、Room の概要、履歴の API が応答する
    // given (前提条件):
    let server = TestServer::start(10).await;
    let mut alice = server.join("alice").await;
    send(&mut alice, text_frame("hello")).await;
    recv(&mut alice).await;

    // when (操作):
    let health: Value = reqwest::get(server.http_url("/api/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room: Value = reqwest::get(server.http_url("/api/room"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let history: Value = reqwest::get(server.http_url("/api/room/messages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let debug = reqwest::get(server.http_url("/debug/room")).await.unwrap();

    // then (期待する結果):
    assert_eq!(health, json!({"status": "ok"}));
    assert_eq!(room["participants"], json!(["alice"]));
    assert_eq!(room["history_len"], 2);
    assert_eq!(room["history_capacity"], 10);
    assert_eq!(history["messages"][1]["payload"], "hello");
    assert!(debug.status().is_success());
}
