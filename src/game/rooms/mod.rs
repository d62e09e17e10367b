mod game_id;
pub mod lobby;
pub mod registry;

pub use game_id::is_valid_game_id;
pub use lobby::{LobbyList, LobbyRoom, NewGame};
pub use registry::{Departure, MAX_PLAYERS, Outbox, RoomRegistry};
