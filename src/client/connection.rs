use super::session::ClientSession;
use crate::game::core::messages::{ClientMessage, ErrorCode, ServerMessage};
use crate::game::core::Symbol;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// How long `join` waits for the relay to assign a symbol
const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("malformed relay message: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("timed out waiting for the relay")]
    Timeout,

    #[error("relay closed the connection")]
    Closed,

    #[error("relay rejected the request ({code:?}): {message}")]
    Rejected { code: ErrorCode, message: String },
}

/// A player connected to the relay over WebSocket, with its local
/// [`ClientSession`] kept in step with every event received.
pub struct RelayClient {
    ws: WsStream,
    session: ClientSession,
}

impl RelayClient {
    pub async fn connect(url: &str, game_id: impl Into<String>) -> Result<Self, ClientError> {
        let (ws, _response) = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(url))
            .await
            .map_err(|_| {
                warn!(url, "Relay connect timed out");
                ClientError::Timeout
            })??;
        debug!(url, "Connected to relay");

        Ok(Self {
            ws,
            session: ClientSession::new(game_id),
        })
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    /// Ask for a seat and wait until the relay assigns one or refuses.
    /// Other events that arrive first are applied to the session.
    pub async fn join(&mut self) -> Result<Symbol, ClientError> {
        let msg = self.session.join_message();
        self.send(&msg).await?;

        tokio::time::timeout(JOIN_TIMEOUT, self.await_assignment())
            .await
            .map_err(|_| ClientError::Timeout)?
    }

    async fn await_assignment(&mut self) -> Result<Symbol, ClientError> {
        loop {
            match self.next_event().await? {
                ServerMessage::PlayerAssigned { symbol, .. } => {
                    info!(game_id = self.session.game_id(), %symbol, "Joined game");
                    return Ok(symbol);
                }
                ServerMessage::Error { code, message } => {
                    return Err(ClientError::Rejected { code, message });
                }
                _ => continue,
            }
        }
    }

    /// Play at (row, col). Returns `false` without sending anything when the
    /// move is not allowed from the local point of view.
    pub async fn submit_move(&mut self, row: usize, col: usize) -> Result<bool, ClientError> {
        match self.session.submit_move(row, col) {
            Some(msg) => {
                self.send(&msg).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn set_bet(&mut self, amount: f64) -> Result<bool, ClientError> {
        match self.session.set_bet(amount) {
            Some(msg) => {
                self.send(&msg).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn leave(&mut self) -> Result<(), ClientError> {
        let msg = self.session.leave_message();
        self.send(&msg).await
    }

    /// Wait for the next relay event and apply it to the session
    pub async fn next_event(&mut self) -> Result<ServerMessage, ClientError> {
        loop {
            let frame = match self.ws.next().await {
                Some(frame) => frame?,
                None => return Err(ClientError::Closed),
            };
            let text = match frame {
                Message::Text(text) => text,
                Message::Close(_) => return Err(ClientError::Closed),
                _ => continue,
            };
            let msg: ServerMessage = serde_json::from_str(text.as_str())?;
            debug!(?msg, "Relay event");
            self.session.apply(&msg);
            return Ok(msg);
        }
    }

    pub async fn close(mut self) -> Result<(), ClientError> {
        self.ws.close(None).await?;
        Ok(())
    }

    async fn send(&mut self, msg: &ClientMessage) -> Result<(), ClientError> {
        let json = serde_json::to_string(msg)?;
        self.ws.send(Message::Text(json.into())).await?;
        Ok(())
    }
}
