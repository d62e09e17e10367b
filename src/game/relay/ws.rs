use crate::error::RelayError;
use crate::game::core::messages::{ClientMessage, ServerMessage};
use crate::game::rooms::Outbox;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const OUTBOX_CAPACITY: usize = 32;

/// Per-connection bookkeeping
pub struct ConnectionContext {
    pub conn_id: String,
    /// Rooms this connection has joined and not yet left
    pub rooms: HashSet<String>,
}

impl ConnectionContext {
    pub fn new() -> Self {
        Self {
            conn_id: uuid::Uuid::new_v4().to_string(),
            rooms: HashSet::new(),
        }
    }
}

impl Default for ConnectionContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Reacts to client events on one socket
pub trait ConnectionHandler: Send + Sync + 'static {
    fn handle_message(&self, msg: ClientMessage, tx: &Outbox, ctx: &mut ConnectionContext);

    fn handle_disconnect(&self, ctx: &ConnectionContext);

    /// Messages that bring a connection back in step after its outbox
    /// overflowed
    fn resync(&self, conn_id: &str) -> Vec<ServerMessage>;

    /// Name for logging purposes
    fn name(&self) -> &'static str;
}

/// Drive one WebSocket until either side goes away or `shutdown` flips.
///
/// Outbound traffic goes through a broadcast channel so rooms can hold a
/// sender per member; a writer task drains it into the socket.
pub async fn run_connection<H: ConnectionHandler>(
    socket: WebSocket,
    handler: Arc<H>,
    mut shutdown: watch::Receiver<bool>,
) {
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = broadcast::channel::<ServerMessage>(OUTBOX_CAPACITY);
    let mut ctx = ConnectionContext::new();
    let conn_id = ctx.conn_id.clone();
    info!(conn_id, "New {} connection", handler.name());

    let writer = handler.clone();
    let writer_conn_id = conn_id.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                received = rx.recv() => match received {
                    Ok(msg) => msg,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(conn_id = writer_conn_id, skipped, "Client fell behind, resending room state");
                        for msg in writer.resync(&writer_conn_id) {
                            if send_json(&mut sender, &msg).await.is_err() {
                                return;
                            }
                        }
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = async { let _ = shutdown.wait_for(|stopping| *stopping).await; } => {
                    debug!(conn_id = writer_conn_id, "Relay stopping, closing socket");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };
            debug!(conn_id = writer_conn_id, ?msg, "Sending message to client");
            if send_json(&mut sender, &msg).await.is_err() {
                break;
            }
        }
    });

    // Either direction failing ends the connection
    tokio::select! {
        _ = receive_loop(receiver, &tx, handler.as_ref(), &mut ctx) => {}
        _ = &mut send_task => {}
    }
    send_task.abort();
    handler.handle_disconnect(&ctx);

    info!(conn_id, "{} connection closed", handler.name());
}

async fn send_json(
    sender: &mut SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(msg) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to encode server message");
            return Ok(());
        }
    };
    sender.send(Message::Text(json)).await
}

async fn receive_loop<H: ConnectionHandler>(
    mut receiver: SplitStream<WebSocket>,
    tx: &Outbox,
    handler: &H,
    ctx: &mut ConnectionContext,
) {
    while let Some(Ok(msg)) = receiver.next().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => {
                debug!("Received non-text message, ignoring");
                continue;
            }
        };

        debug!(conn_id = ctx.conn_id, raw = %text, "Received message");

        let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(conn_id = ctx.conn_id, raw = %text, error = %e, "Failed to parse client message");
                let _ = tx.send(RelayError::BadRequest(e.to_string()).to_message());
                continue;
            }
        };

        handler.handle_message(client_msg, tx, ctx);
    }
}
