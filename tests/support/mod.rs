// Shared helpers for booting a relay and driving it with WebSocket clients.
#![allow(dead_code)]

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

// Long enough for a relayed frame to arrive on a loaded CI box.
const RECV_TIMEOUT: Duration = Duration::from_secs(2);
// How long a client must stay quiet to count as "received nothing".
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

// Start a relay on an ephemeral port inside the current test runtime.
// Each test gets its own server so broadcasts never leak between tests.
pub async fn start_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");
    tokio::spawn(async move {
        duel_relay::run(listener).await.expect("server failed");
    });
    format!("ws://{addr}")
}

// A connected player: its socket plus the id the relay assigned to it.
pub struct Player {
    pub id: String,
    pub socket: Socket,
}

impl Player {
    pub async fn connect(base_url: &str) -> Self {
        let (mut socket, _response) = connect_async(base_url)
            .await
            .expect("websocket handshake should succeed");
        let init = recv_json(&mut socket).await;
        assert_eq!(init["type"], "init", "first frame must be init: {init}");
        let id = init["id"]
            .as_str()
            .expect("init id should be a string")
            .to_string();
        Self { id, socket }
    }

    pub async fn send_json(&mut self, value: Value) {
        self.send_text(value.to_string()).await;
    }

    pub async fn send_text(&mut self, text: impl Into<String>) {
        self.socket
            .send(Message::text(text.into()))
            .await
            .expect("send should succeed");
    }

    pub async fn send_binary(&mut self, bytes: impl Into<Vec<u8>>) {
        self.socket
            .send(Message::binary(bytes.into()))
            .await
            .expect("send should succeed");
    }

    pub async fn recv_json(&mut self) -> Value {
        recv_json(&mut self.socket).await
    }

    pub async fn expect_silence(&mut self) {
        let next = tokio::time::timeout(SILENCE_WINDOW, next_text(&mut self.socket)).await;
        if let Ok(Some(text)) = next {
            panic!("expected no message, got {text}");
        }
    }

    pub async fn close(mut self) {
        self.socket.close(None).await.expect("close should succeed");
    }
}

async fn next_text(socket: &mut Socket) -> Option<String> {
    while let Some(message) = socket.next().await {
        match message.expect("websocket read should succeed") {
            Message::Text(text) => return Some(text.as_str().to_string()),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
    None
}

pub async fn recv_json(socket: &mut Socket) -> Value {
    let text = tokio::time::timeout(RECV_TIMEOUT, next_text(socket))
        .await
        .expect("timed out waiting for a message")
        .expect("socket closed while waiting for a message");
    serde_json::from_str(&text).expect("relay frames should be json")
}
