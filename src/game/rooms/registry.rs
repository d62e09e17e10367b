use super::game_id::{is_valid_game_id, new_game_id};
use super::lobby::LobbyRoom;
use crate::error::{RelayError, RoomError};
use crate::game::core::messages::{BoardUpdate, ServerMessage};
use crate::game::core::{BetPolicy, GameSession, MoveValidation, Symbol};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info};

pub const MAX_PLAYERS: usize = 2;

/// Per-connection outbound channel
pub type Outbox = broadcast::Sender<ServerMessage>;

pub struct Member {
    pub conn_id: String,
    pub symbol: Symbol,
    tx: Outbox,
}

/// One game room: up to two members plus the game they share
pub struct Room {
    members: Vec<Member>,
    pub game: GameSession,
    last_activity: Instant,
}

impl Room {
    fn new() -> Self {
        Self {
            members: Vec::with_capacity(MAX_PLAYERS),
            game: GameSession::new(),
            last_activity: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    pub fn occupancy(&self) -> usize {
        self.members.len()
    }

    fn symbol_of(&self, conn_id: &str) -> Option<Symbol> {
        self.members
            .iter()
            .find(|m| m.conn_id == conn_id)
            .map(|m| m.symbol)
    }

    /// First free symbol, X before O
    fn free_symbol(&self) -> Symbol {
        if self.members.iter().any(|m| m.symbol == Symbol::X) {
            Symbol::O
        } else {
            Symbol::X
        }
    }

    fn broadcast(&self, msg: &ServerMessage) {
        for member in &self.members {
            let _ = member.tx.send(msg.clone());
        }
    }

    fn idle_for(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_activity)
    }
}

/// Result of a member leaving a room
#[derive(Debug, PartialEq, Eq)]
pub struct Departure {
    pub symbol: Symbol,
    pub room_closed: bool,
}

/// All rooms of this relay process, keyed by game id.
///
/// Every mutation of a room happens while its map entry is held, so joins,
/// leaves and moves on the same room are applied one at a time and the
/// messages they emit go out in that same order.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Room>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupancy(&self, game_id: &str) -> usize {
        self.rooms.get(game_id).map_or(0, |room| room.occupancy())
    }

    pub fn contains(&self, game_id: &str) -> bool {
        self.rooms.contains_key(game_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn symbol_of(&self, game_id: &str, conn_id: &str) -> Option<Symbol> {
        self.rooms.get(game_id)?.symbol_of(conn_id)
    }

    pub fn snapshot(&self, game_id: &str) -> Option<BoardUpdate> {
        self.rooms.get(game_id).map(|room| room.game.snapshot())
    }

    /// A game id that no room currently uses
    pub fn unused_game_id(&self) -> String {
        new_game_id(|id| self.contains(id))
    }

    /// Seat `conn_id` in the room, creating the room on first join.
    ///
    /// The joiner receives `player-assigned` (plus the board and bet if a
    /// game is already under way) and the other member gets `player-joined`.
    /// A full room is left untouched.
    pub fn join(&self, game_id: &str, conn_id: &str, tx: Outbox) -> Result<Symbol, RoomError> {
        if !is_valid_game_id(game_id) {
            return Err(RoomError::InvalidGameId {
                game_id: game_id.to_string(),
            });
        }

        let mut room = self
            .rooms
            .entry(game_id.to_string())
            .or_insert_with(Room::new);

        if let Some(symbol) = room.symbol_of(conn_id) {
            debug!(game_id, conn_id, %symbol, "Connection already seated");
            let _ = tx.send(ServerMessage::PlayerAssigned {
                game_id: game_id.to_string(),
                symbol,
            });
            return Ok(symbol);
        }

        if room.occupancy() >= MAX_PLAYERS {
            return Err(RoomError::RoomFull {
                game_id: game_id.to_string(),
            });
        }

        let symbol = room.free_symbol();
        room.broadcast(&ServerMessage::PlayerJoined { symbol });
        room.members.push(Member {
            conn_id: conn_id.to_string(),
            symbol,
            tx: tx.clone(),
        });
        room.touch();

        let _ = tx.send(ServerMessage::PlayerAssigned {
            game_id: game_id.to_string(),
            symbol,
        });
        if let Some(amount) = room.game.bet() {
            let _ = tx.send(ServerMessage::BetSet { amount });
        }
        if room.game.has_started() {
            let _ = tx.send(ServerMessage::UpdateBoard(room.game.snapshot()));
        }

        info!(
            game_id,
            conn_id,
            %symbol,
            occupancy = room.occupancy(),
            "Player joined room"
        );
        Ok(symbol)
    }

    /// Remove `conn_id` from the room and tell whoever is left.
    /// Empty rooms are dropped.
    pub fn leave(&self, game_id: &str, conn_id: &str) -> Result<Departure, RoomError> {
        let missing = || RoomError::NotInRoom {
            game_id: game_id.to_string(),
        };

        let symbol = {
            let mut room = self.rooms.get_mut(game_id).ok_or_else(missing)?;
            let index = room
                .members
                .iter()
                .position(|m| m.conn_id == conn_id)
                .ok_or_else(missing)?;
            let member = room.members.remove(index);
            room.touch();
            room.broadcast(&ServerMessage::PlayerLeft {
                symbol: member.symbol,
            });
            member.symbol
        };

        let room_closed = self
            .rooms
            .remove_if(game_id, |_, room| room.members.is_empty())
            .is_some();

        info!(game_id, conn_id, %symbol, room_closed, "Player left room");
        Ok(Departure {
            symbol,
            room_closed,
        })
    }

    /// Apply a `make-move` from `conn_id` and broadcast the resulting board
    /// to every member, sender included.
    pub fn submit_move(
        &self,
        game_id: &str,
        conn_id: &str,
        proposed: BoardUpdate,
        validation: MoveValidation,
        bet_policy: BetPolicy,
    ) -> Result<BoardUpdate, RelayError> {
        let mut room = self.member_room(game_id, conn_id)?;
        let Some(mover) = room.symbol_of(conn_id) else {
            return Err(not_in_room(game_id));
        };

        let update = match validation {
            MoveValidation::Enforced => {
                room.game
                    .apply_move(mover, &proposed.board_state, bet_policy)?
            }
            MoveValidation::Trusted => room.game.accept_verbatim(proposed, bet_policy)?,
        };

        if update.current_turn != proposed.current_turn || update.winner != proposed.winner {
            debug!(
                game_id,
                conn_id,
                claimed_turn = %proposed.current_turn,
                turn = %update.current_turn,
                "Client turn or winner disagreed with server"
            );
        }

        room.touch();
        room.broadcast(&ServerMessage::UpdateBoard(update));
        debug!(game_id, conn_id, %mover, winner = ?update.winner, "Move relayed");
        Ok(update)
    }

    /// Record the bet and broadcast `bet-set` to all members
    pub fn set_bet(
        &self,
        game_id: &str,
        conn_id: &str,
        amount: f64,
        validation: MoveValidation,
    ) -> Result<f64, RelayError> {
        let mut room = self.member_room(game_id, conn_id)?;
        let Some(by) = room.symbol_of(conn_id) else {
            return Err(not_in_room(game_id));
        };

        let amount = room.game.set_bet(by, amount, validation)?;
        room.touch();
        room.broadcast(&ServerMessage::BetSet { amount });
        info!(game_id, conn_id, amount, "Bet set");
        Ok(amount)
    }

    /// Drop rooms with no activity for at least `max_idle`. Returns their ids.
    pub fn evict_idle(&self, max_idle: Duration) -> Vec<String> {
        self.evict_idle_at(Instant::now(), max_idle)
    }

    pub fn evict_idle_at(&self, now: Instant, max_idle: Duration) -> Vec<String> {
        let mut evicted = Vec::new();
        self.rooms.retain(|game_id, room| {
            let keep = room.idle_for(now) < max_idle;
            if !keep {
                room.broadcast(&ServerMessage::RoomClosed {
                    game_id: game_id.clone(),
                });
                evicted.push(game_id.clone());
            }
            keep
        });
        if !evicted.is_empty() {
            info!(count = evicted.len(), rooms = ?evicted, "Evicted idle rooms");
        }
        evicted
    }

    /// Current bet and board of every room `conn_id` sits in, for a member
    /// whose outbox dropped messages
    pub fn resync_for(&self, conn_id: &str) -> Vec<ServerMessage> {
        let mut messages = Vec::new();
        for room in self.rooms.iter() {
            if room.symbol_of(conn_id).is_none() {
                continue;
            }
            if let Some(amount) = room.game.bet() {
                messages.push(ServerMessage::BetSet { amount });
            }
            messages.push(ServerMessage::UpdateBoard(room.game.snapshot()));
        }
        messages
    }

    /// Rooms with a free seat, for the lobby listing
    pub fn open_rooms(&self) -> Vec<LobbyRoom> {
        let now = Instant::now();
        let mut rooms: Vec<LobbyRoom> = self
            .rooms
            .iter()
            .filter(|entry| entry.occupancy() < MAX_PLAYERS)
            .map(|entry| LobbyRoom {
                game_id: entry.key().clone(),
                occupancy: entry.occupancy(),
                bet_amount: entry.game.bet(),
                idle_secs: entry.idle_for(now).as_secs(),
            })
            .collect();
        rooms.sort_by_key(|room| room.idle_secs);
        rooms
    }

    fn member_room(
        &self,
        game_id: &str,
        conn_id: &str,
    ) -> Result<dashmap::mapref::one::RefMut<'_, String, Room>, RelayError> {
        let room = self
            .rooms
            .get_mut(game_id)
            .ok_or_else(|| not_in_room(game_id))?;
        if room.symbol_of(conn_id).is_none() {
            return Err(not_in_room(game_id));
        }
        Ok(room)
    }
}

fn not_in_room(game_id: &str) -> RelayError {
    RoomError::NotInRoom {
        game_id: game_id.to_string(),
    }
    .into()
}
