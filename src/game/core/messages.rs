use super::board::{Board, Outcome, Symbol};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinGame {
        #[serde(alias = "roomId")]
        game_id: String,
    },
    #[serde(rename_all = "camelCase")]
    MakeMove {
        #[serde(alias = "roomId")]
        game_id: String,
        board_state: Board,
        current_turn: Symbol,
        winner: Option<Outcome>,
    },
    #[serde(rename_all = "camelCase")]
    SetBet {
        #[serde(alias = "roomId")]
        game_id: String,
        bet_amount: f64,
    },
    #[serde(rename_all = "camelCase")]
    LeaveGame {
        #[serde(alias = "roomId")]
        game_id: String,
    },
}

impl ClientMessage {
    pub fn game_id(&self) -> &str {
        match self {
            ClientMessage::JoinGame { game_id }
            | ClientMessage::MakeMove { game_id, .. }
            | ClientMessage::SetBet { game_id, .. }
            | ClientMessage::LeaveGame { game_id } => game_id,
        }
    }
}

/// Board state as broadcast after every accepted move
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoardUpdate {
    pub board_state: Board,
    pub current_turn: Symbol,
    pub winner: Option<Outcome>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    RoomFull,
    InvalidGameId,
    NotInRoom,
    InvalidMove,
    BetRejected,
    BetRequired,
    BadRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    #[serde(rename_all = "camelCase")]
    PlayerAssigned {
        game_id: String,
        symbol: Symbol,
    },
    PlayerJoined {
        symbol: Symbol,
    },
    PlayerLeft {
        symbol: Symbol,
    },
    UpdateBoard(BoardUpdate),
    BetSet {
        amount: f64,
    },
    /// The room was dropped for inactivity; its seats are gone
    #[serde(rename_all = "camelCase")]
    RoomClosed {
        game_id: String,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}
