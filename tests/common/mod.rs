#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use gameday::messages::{ClientMessage, ServerMessage};
use gameday::{Config, RelayServer};
use gameday::game::core::{Board, Outcome, Symbol};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

pub struct TestServer {
    pub server: RelayServer,
    socket_path: String,
}

impl TestServer {
    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.server.local_addr(), self.socket_path)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.server.local_addr(), path)
    }
}

pub async fn spawn_test_server() -> TestServer {
    spawn_test_server_with_config(Config::default()).await
}

pub async fn spawn_test_server_with_config(config: Config) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let socket_path = config.socket_path.clone();
    let server = RelayServer::start_on(listener, config).unwrap();

    TestServer {
        server,
        socket_path,
    }
}

pub async fn connect(server: &TestServer) -> WsStream {
    let (ws, _) = connect_async(&server.ws_url()).await.expect("Failed to connect");
    ws
}

fn to_frame(msg: &ClientMessage) -> Message {
    let json = serde_json::to_string(msg).unwrap();
    Message::Text(json.into())
}

pub fn join_msg(game_id: &str) -> Message {
    to_frame(&ClientMessage::JoinGame {
        game_id: game_id.to_string(),
    })
}

pub fn leave_msg(game_id: &str) -> Message {
    to_frame(&ClientMessage::LeaveGame {
        game_id: game_id.to_string(),
    })
}

pub fn bet_msg(game_id: &str, bet_amount: f64) -> Message {
    to_frame(&ClientMessage::SetBet {
        game_id: game_id.to_string(),
        bet_amount,
    })
}

pub fn move_msg(game_id: &str, board: Board, current_turn: Symbol, winner: Option<Outcome>) -> Message {
    to_frame(&ClientMessage::MakeMove {
        game_id: game_id.to_string(),
        board_state: board,
        current_turn,
        winner,
    })
}

pub async fn send(ws: &mut WsStream, msg: Message) {
    ws.send(msg).await.unwrap();
}

pub async fn recv(ws: &mut WsStream) -> ServerMessage {
    let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("Timed out waiting for message")
        .unwrap()
        .unwrap();
    serde_json::from_str(msg.to_text().unwrap()).unwrap()
}

/// Assert nothing arrives within a short window
pub async fn assert_silent(ws: &mut WsStream) {
    let next = tokio::time::timeout(Duration::from_millis(100), ws.next()).await;
    assert!(next.is_err(), "Expected no message, got {:?}", next);
}

/// Join and consume the `player-assigned` reply
pub async fn join(ws: &mut WsStream, game_id: &str) -> Symbol {
    send(ws, join_msg(game_id)).await;
    match recv(ws).await {
        ServerMessage::PlayerAssigned { symbol, .. } => symbol,
        other => panic!("Expected PlayerAssigned, got {:?}", other),
    }
}

/// Read until the relay closes the socket. Fails on any `update-board`
/// seen on the way.
pub async fn assert_closed(ws: &mut WsStream) {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("Socket was not closed");
        match next {
            Some(Ok(Message::Text(text))) => {
                let msg: ServerMessage = serde_json::from_str(text.as_str()).unwrap();
                assert!(
                    !matches!(msg, ServerMessage::UpdateBoard(_)),
                    "Board relayed while closing: {:?}",
                    msg
                );
            }
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
            Some(Ok(_)) => continue,
        }
    }
}
