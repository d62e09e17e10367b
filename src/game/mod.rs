pub mod core;
pub mod relay;
pub mod rooms;

pub use self::core::messages;
pub use relay::{RelaySettings, RelayState, handle_connection};
pub use rooms::RoomRegistry;
