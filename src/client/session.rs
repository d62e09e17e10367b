use crate::game::core::messages::{BoardUpdate, ClientMessage, ErrorCode, ServerMessage};
use crate::game::core::{Board, Outcome, Symbol, evaluate};

/// Last error the relay reported to this player
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayNotice {
    pub code: ErrorCode,
    pub message: String,
}

/// One player's view of a room.
///
/// Moves are applied locally before the relay confirms them; every
/// `update-board` from the relay then overwrites the local board, so the
/// server's copy always wins.
#[derive(Debug, Clone)]
pub struct ClientSession {
    game_id: String,
    symbol: Option<Symbol>,
    board: Board,
    current_turn: Symbol,
    winner: Option<Outcome>,
    bet: Option<f64>,
    opponent_present: bool,
    last_error: Option<RelayNotice>,
}

impl ClientSession {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            symbol: None,
            board: Board::new(),
            current_turn: Symbol::X,
            winner: None,
            bet: None,
            opponent_present: false,
            last_error: None,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.symbol
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_turn(&self) -> Symbol {
        self.current_turn
    }

    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn bet(&self) -> Option<f64> {
        self.bet
    }

    pub fn opponent_present(&self) -> bool {
        self.opponent_present
    }

    pub fn last_error(&self) -> Option<&RelayNotice> {
        self.last_error.as_ref()
    }

    pub fn is_my_turn(&self) -> bool {
        self.symbol == Some(self.current_turn)
    }

    pub fn join_message(&self) -> ClientMessage {
        ClientMessage::JoinGame {
            game_id: self.game_id.clone(),
        }
    }

    pub fn leave_message(&self) -> ClientMessage {
        ClientMessage::LeaveGame {
            game_id: self.game_id.clone(),
        }
    }

    /// Place our symbol at (row, col) and return the move to send.
    ///
    /// Returns `None` and leaves the session untouched when the cell is out
    /// of range or taken, the game is over, or it is not our turn.
    pub fn submit_move(&mut self, row: usize, col: usize) -> Option<ClientMessage> {
        let symbol = self.symbol?;
        if !Board::in_bounds(row, col)
            || self.board.get(row, col).is_some()
            || self.winner.is_some()
            || self.current_turn != symbol
        {
            return None;
        }

        self.board = self.board.with_placed(row, col, symbol);
        self.current_turn = symbol.opponent();
        self.winner = evaluate(&self.board);

        Some(ClientMessage::MakeMove {
            game_id: self.game_id.clone(),
            board_state: self.board,
            current_turn: self.current_turn,
            winner: self.winner,
        })
    }

    /// Only the room creator sets the bet, and only once
    pub fn set_bet(&self, amount: f64) -> Option<ClientMessage> {
        if self.symbol != Some(Symbol::X)
            || self.bet.is_some()
            || !amount.is_finite()
            || amount <= 0.0
        {
            return None;
        }
        Some(ClientMessage::SetBet {
            game_id: self.game_id.clone(),
            bet_amount: amount,
        })
    }

    pub fn apply(&mut self, msg: &ServerMessage) {
        match msg {
            ServerMessage::PlayerAssigned { symbol, .. } => {
                self.symbol = Some(*symbol);
                // X is handed out first, so being O means X is already seated
                self.opponent_present = *symbol == Symbol::O;
                self.last_error = None;
            }
            ServerMessage::PlayerJoined { .. } => self.opponent_present = true,
            ServerMessage::PlayerLeft { .. } => self.opponent_present = false,
            ServerMessage::UpdateBoard(update) => self.overwrite(update),
            ServerMessage::BetSet { amount } => self.bet = Some(*amount),
            ServerMessage::RoomClosed { .. } => {
                self.symbol = None;
                self.opponent_present = false;
            }
            ServerMessage::Error { code, message } => {
                self.last_error = Some(RelayNotice {
                    code: *code,
                    message: message.clone(),
                });
            }
        }
    }

    fn overwrite(&mut self, update: &BoardUpdate) {
        self.board = update.board_state;
        self.current_turn = update.current_turn;
        self.winner = update.winner;
    }
}
