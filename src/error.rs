use crate::game::core::board::Symbol;
use crate::game::core::messages::{ErrorCode, ServerMessage};

/// Room membership failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {game_id} is full")]
    RoomFull { game_id: String },
    #[error("invalid game id {game_id:?}")]
    InvalidGameId { game_id: String },
    #[error("not a member of room {game_id}")]
    NotInRoom { game_id: String },
}

/// Reasons a submitted board is refused by the relay
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is already over")]
    GameOver,
    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Symbol },
    #[error("board did not change")]
    NoChange,
    #[error("a move may change exactly one cell, {changed} changed")]
    TooManyCells { changed: usize },
    #[error("cell ({row}, {col}) is already taken")]
    CellOccupied { row: usize, col: usize },
    #[error("placed {placed} but you play {expected}")]
    WrongSymbol { placed: Symbol, expected: Symbol },
    #[error("a bet must be set before moves are accepted")]
    BetRequired,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BetError {
    #[error("bet is already set to {current}")]
    AlreadySet { current: f64 },
    #[error("only the room creator can set the bet")]
    NotCreator,
    #[error("bet amount must be a positive number, got {amount}")]
    InvalidAmount { amount: f64 },
}

/// Anything the relay reports back to a client
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RelayError {
    #[error(transparent)]
    Room(#[from] RoomError),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Bet(#[from] BetError),
    #[error("could not parse message: {0}")]
    BadRequest(String),
}

impl RelayError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RelayError::Room(RoomError::RoomFull { .. }) => ErrorCode::RoomFull,
            RelayError::Room(RoomError::InvalidGameId { .. }) => ErrorCode::InvalidGameId,
            RelayError::Room(RoomError::NotInRoom { .. }) => ErrorCode::NotInRoom,
            RelayError::Move(MoveError::BetRequired) => ErrorCode::BetRequired,
            RelayError::Move(_) => ErrorCode::InvalidMove,
            RelayError::Bet(_) => ErrorCode::BetRejected,
            RelayError::BadRequest(_) => ErrorCode::BadRequest,
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Error {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_full_maps_to_room_full_code() {
        let err = RelayError::from(RoomError::RoomFull {
            game_id: "ab12".to_string(),
        });
        assert_eq!(err.code(), ErrorCode::RoomFull);
        assert_eq!(err.to_string(), "room ab12 is full");
    }

    #[test]
    fn bet_required_has_its_own_code() {
        assert_eq!(
            RelayError::from(MoveError::BetRequired).code(),
            ErrorCode::BetRequired
        );
        assert_eq!(
            RelayError::from(MoveError::GameOver).code(),
            ErrorCode::InvalidMove
        );
    }

    #[test]
    fn error_message_carries_display_text() {
        let msg = RelayError::from(BetError::NotCreator).to_message();
        assert_eq!(
            msg,
            ServerMessage::Error {
                code: ErrorCode::BetRejected,
                message: "only the room creator can set the bet".to_string(),
            }
        );
    }
}
