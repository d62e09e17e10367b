pub mod board;
pub mod messages;
pub mod session;

pub use board::{Board, Outcome, Symbol, evaluate};
pub use session::{BetPolicy, GameSession, MoveValidation};
