//! Player side of the relay: local game state, the WebSocket client that
//! keeps it in sync, and the hook into the wager contract.

mod connection;
pub mod contract;
mod session;

pub use connection::{ClientError, RelayClient};
pub use contract::{ContractError, ContractHooks, GameContract, GameRecord, parse_ether};
pub use session::{ClientSession, RelayNotice};
