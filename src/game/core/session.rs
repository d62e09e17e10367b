use super::board::{Board, Outcome, Symbol, evaluate};
use super::messages::BoardUpdate;
use crate::error::{BetError, MoveError};
use std::str::FromStr;

/// Whether the relay checks submitted boards or rebroadcasts them as-is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoveValidation {
    #[default]
    Enforced,
    Trusted,
}

impl FromStr for MoveValidation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enforced" => Ok(Self::Enforced),
            "trusted" => Ok(Self::Trusted),
            other => Err(format!("unknown move validation mode {other:?}")),
        }
    }
}

/// Whether a bet has to be on the table before the first move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BetPolicy {
    #[default]
    Optional,
    Required,
}

impl FromStr for BetPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "optional" => Ok(Self::Optional),
            "required" => Ok(Self::Required),
            other => Err(format!("unknown bet policy {other:?}")),
        }
    }
}

/// Authoritative state of one room's game (pure logic, no I/O)
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    current_turn: Symbol,
    winner: Option<Outcome>,
    bet: Option<f64>,
    moves: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            current_turn: Symbol::X,
            winner: None,
            bet: None,
            moves: 0,
        }
    }

    pub fn snapshot(&self) -> BoardUpdate {
        BoardUpdate {
            board_state: self.board,
            current_turn: self.current_turn,
            winner: self.winner,
        }
    }

    pub fn bet(&self) -> Option<f64> {
        self.bet
    }

    pub fn moves(&self) -> u32 {
        self.moves
    }

    /// A late joiner needs a catch-up snapshot once anything has been played
    pub fn has_started(&self) -> bool {
        self.moves > 0
    }

    /// Check `proposed` against the current board and, if it is a legal
    /// single move by `mover`, make it the new board. Turn and winner are
    /// recomputed here; whatever the client claimed is ignored.
    pub fn apply_move(
        &mut self,
        mover: Symbol,
        proposed: &Board,
        bet_policy: BetPolicy,
    ) -> Result<BoardUpdate, MoveError> {
        if self.winner.is_some() {
            return Err(MoveError::GameOver);
        }
        if bet_policy == BetPolicy::Required && self.bet.is_none() {
            return Err(MoveError::BetRequired);
        }
        if mover != self.current_turn {
            return Err(MoveError::NotYourTurn {
                expected: self.current_turn,
            });
        }

        let (row, col) = match self.board.diff(proposed).as_slice() {
            [] => return Err(MoveError::NoChange),
            [cell] => *cell,
            cells => return Err(MoveError::TooManyCells {
                changed: cells.len(),
            }),
        };

        if self.board.get(row, col).is_some() {
            return Err(MoveError::CellOccupied { row, col });
        }
        // Non-empty because the cell differs from an empty one
        let placed = proposed.get(row, col).ok_or(MoveError::NoChange)?;
        if placed != mover {
            return Err(MoveError::WrongSymbol {
                placed,
                expected: mover,
            });
        }

        self.board = self.board.with_placed(row, col, mover);
        self.current_turn = mover.opponent();
        self.winner = evaluate(&self.board);
        self.moves += 1;
        Ok(self.snapshot())
    }

    /// Take a client-submitted update verbatim. Only the bet gate applies.
    pub fn accept_verbatim(
        &mut self,
        update: BoardUpdate,
        bet_policy: BetPolicy,
    ) -> Result<BoardUpdate, MoveError> {
        if bet_policy == BetPolicy::Required && self.bet.is_none() {
            return Err(MoveError::BetRequired);
        }
        self.board = update.board_state;
        self.current_turn = update.current_turn;
        self.winner = update.winner;
        self.moves += 1;
        Ok(update)
    }

    /// Record the room's bet. Under enforced validation only `X` (the room
    /// creator) may set it, once, to a positive amount.
    pub fn set_bet(
        &mut self,
        by: Symbol,
        amount: f64,
        validation: MoveValidation,
    ) -> Result<f64, BetError> {
        if validation == MoveValidation::Enforced {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(BetError::InvalidAmount { amount });
            }
            if by != Symbol::X {
                return Err(BetError::NotCreator);
            }
            if let Some(current) = self.bet {
                return Err(BetError::AlreadySet { current });
            }
        }
        self.bet = Some(amount);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(session: &mut GameSession, mover: Symbol, row: usize, col: usize) -> BoardUpdate {
        let proposed = session.snapshot().board_state.with_placed(row, col, mover);
        session
            .apply_move(mover, &proposed, BetPolicy::Optional)
            .unwrap()
    }

    #[test]
    fn first_move_belongs_to_x() {
        let mut session = GameSession::new();
        let proposed = Board::new().with_placed(0, 0, Symbol::O);

        let result = session.apply_move(Symbol::O, &proposed, BetPolicy::Optional);

        assert_eq!(
            result,
            Err(MoveError::NotYourTurn {
                expected: Symbol::X
            })
        );
        assert_eq!(session.moves(), 0);
    }

    #[test]
    fn accepted_move_alternates_turn() {
        let mut session = GameSession::new();

        let update = play(&mut session, Symbol::X, 0, 0);

        assert_eq!(update.board_state.get(0, 0), Some(Symbol::X));
        assert_eq!(update.current_turn, Symbol::O);
        assert_eq!(update.winner, None);
        assert!(session.has_started());
    }

    #[test]
    fn occupied_cell_is_rejected() {
        let mut session = GameSession::new();
        play(&mut session, Symbol::X, 1, 1);

        let proposed = Board::new().with_placed(1, 1, Symbol::O);
        let result = session.apply_move(Symbol::O, &proposed, BetPolicy::Optional);

        // Overwriting X's cell shows up as a single changed, occupied cell
        assert_eq!(result, Err(MoveError::CellOccupied { row: 1, col: 1 }));
    }

    #[test]
    fn multi_cell_and_unchanged_boards_are_rejected() {
        let mut session = GameSession::new();

        let unchanged = session.apply_move(Symbol::X, &Board::new(), BetPolicy::Optional);
        assert_eq!(unchanged, Err(MoveError::NoChange));

        let two = Board::new()
            .with_placed(0, 0, Symbol::X)
            .with_placed(0, 1, Symbol::X);
        let result = session.apply_move(Symbol::X, &two, BetPolicy::Optional);
        assert_eq!(result, Err(MoveError::TooManyCells { changed: 2 }));
    }

    #[test]
    fn placing_opponent_symbol_is_rejected() {
        let mut session = GameSession::new();
        let proposed = Board::new().with_placed(2, 2, Symbol::O);

        let result = session.apply_move(Symbol::X, &proposed, BetPolicy::Optional);

        assert_eq!(
            result,
            Err(MoveError::WrongSymbol {
                placed: Symbol::O,
                expected: Symbol::X
            })
        );
    }

    #[test]
    fn winning_move_ends_game() {
        let mut session = GameSession::new();
        play(&mut session, Symbol::X, 0, 0);
        play(&mut session, Symbol::O, 1, 0);
        play(&mut session, Symbol::X, 0, 1);
        play(&mut session, Symbol::O, 1, 1);
        let update = play(&mut session, Symbol::X, 0, 2);

        assert_eq!(update.winner, Some(Outcome::Win(Symbol::X)));

        let proposed = update.board_state.with_placed(2, 2, Symbol::O);
        assert_eq!(
            session.apply_move(Symbol::O, &proposed, BetPolicy::Optional),
            Err(MoveError::GameOver)
        );
    }

    #[test]
    fn required_bet_gates_moves() {
        let mut session = GameSession::new();
        let proposed = Board::new().with_placed(0, 0, Symbol::X);

        assert_eq!(
            session.apply_move(Symbol::X, &proposed, BetPolicy::Required),
            Err(MoveError::BetRequired)
        );

        session
            .set_bet(Symbol::X, 0.1, MoveValidation::Enforced)
            .unwrap();
        assert!(
            session
                .apply_move(Symbol::X, &proposed, BetPolicy::Required)
                .is_ok()
        );
    }

    #[test]
    fn bet_is_set_once_by_creator() {
        let mut session = GameSession::new();

        assert_eq!(
            session.set_bet(Symbol::O, 1.0, MoveValidation::Enforced),
            Err(BetError::NotCreator)
        );
        assert_eq!(
            session.set_bet(Symbol::X, -1.0, MoveValidation::Enforced),
            Err(BetError::InvalidAmount { amount: -1.0 })
        );
        assert_eq!(
            session.set_bet(Symbol::X, 1.0, MoveValidation::Enforced),
            Ok(1.0)
        );
        assert_eq!(
            session.set_bet(Symbol::X, 2.0, MoveValidation::Enforced),
            Err(BetError::AlreadySet { current: 1.0 })
        );
        assert_eq!(session.bet(), Some(1.0));
    }

    #[test]
    fn trusted_mode_takes_anything() {
        let mut session = GameSession::new();
        let bogus = BoardUpdate {
            board_state: Board::new()
                .with_placed(0, 0, Symbol::O)
                .with_placed(2, 2, Symbol::O),
            current_turn: Symbol::O,
            winner: None,
        };

        let accepted = session
            .accept_verbatim(bogus, BetPolicy::Optional)
            .unwrap();

        assert_eq!(accepted, bogus);
        assert_eq!(session.snapshot(), bogus);
        assert_eq!(
            session.set_bet(Symbol::O, 3.0, MoveValidation::Trusted),
            Ok(3.0)
        );
    }

    #[test]
    fn policies_parse_from_strings() {
        assert_eq!(
            "Trusted".parse::<MoveValidation>(),
            Ok(MoveValidation::Trusted)
        );
        assert_eq!(" required ".parse::<BetPolicy>(), Ok(BetPolicy::Required));
        assert!("sometimes".parse::<BetPolicy>().is_err());
    }
}
