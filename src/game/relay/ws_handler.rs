use super::state::RelayState;
use super::ws::{ConnectionContext, ConnectionHandler, run_connection};
use crate::error::RelayError;
use crate::game::core::messages::{BoardUpdate, ClientMessage, ServerMessage};
use crate::game::rooms::Outbox;
use axum::extract::ws::WebSocket;
use std::sync::Arc;
use tracing::{debug, info, warn};

impl ConnectionHandler for RelayState {
    fn handle_message(&self, msg: ClientMessage, tx: &Outbox, ctx: &mut ConnectionContext) {
        if self.is_stopping() {
            debug!(conn_id = ctx.conn_id, "Relay stopping, dropping message");
            return;
        }
        match msg {
            ClientMessage::JoinGame { game_id } => {
                match self.rooms.join(&game_id, &ctx.conn_id, tx.clone()) {
                    Ok(_) => {
                        ctx.rooms.insert(game_id);
                    }
                    Err(e) => {
                        warn!(game_id, conn_id = ctx.conn_id, error = %e, "Join rejected");
                        reply_error(tx, RelayError::from(e));
                    }
                }
            }
            ClientMessage::MakeMove {
                game_id,
                board_state,
                current_turn,
                winner,
            } => {
                let proposed = BoardUpdate {
                    board_state,
                    current_turn,
                    winner,
                };
                let result = self.rooms.submit_move(
                    &game_id,
                    &ctx.conn_id,
                    proposed,
                    self.settings.move_validation,
                    self.settings.bet_policy,
                );
                if let Err(e) = result {
                    warn!(game_id, conn_id = ctx.conn_id, error = %e, "Move rejected");
                    let is_move_error = matches!(e, RelayError::Move(_));
                    reply_error(tx, e);
                    // Roll back the sender's optimistic board
                    if is_move_error && let Some(current) = self.rooms.snapshot(&game_id) {
                        let _ = tx.send(ServerMessage::UpdateBoard(current));
                    }
                }
            }
            ClientMessage::SetBet {
                game_id,
                bet_amount,
            } => {
                let result = self.rooms.set_bet(
                    &game_id,
                    &ctx.conn_id,
                    bet_amount,
                    self.settings.move_validation,
                );
                if let Err(e) = result {
                    warn!(game_id, conn_id = ctx.conn_id, error = %e, "Bet rejected");
                    reply_error(tx, e);
                }
            }
            ClientMessage::LeaveGame { game_id } => {
                match self.rooms.leave(&game_id, &ctx.conn_id) {
                    Ok(_) => {
                        ctx.rooms.remove(&game_id);
                    }
                    Err(e) => reply_error(tx, RelayError::from(e)),
                }
            }
        }
    }

    fn handle_disconnect(&self, ctx: &ConnectionContext) {
        info!(conn_id = ctx.conn_id, rooms = ?ctx.rooms, "Player disconnected");
        if !self.settings.release_on_disconnect {
            return;
        }
        for game_id in &ctx.rooms {
            let _ = self.rooms.leave(game_id, &ctx.conn_id);
        }
    }

    fn resync(&self, conn_id: &str) -> Vec<ServerMessage> {
        self.rooms.resync_for(conn_id)
    }

    fn name(&self) -> &'static str {
        "relay"
    }
}

fn reply_error(tx: &Outbox, error: RelayError) {
    let _ = tx.send(error.to_message());
}

pub async fn handle_connection(socket: WebSocket, state: Arc<RelayState>) {
    let shutdown = state.subscribe_shutdown();
    run_connection(socket, state, shutdown).await;
}
