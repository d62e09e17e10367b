mod state;
mod ws;
mod ws_handler;

pub use state::{RelaySettings, RelayState};
pub use ws::{ConnectionContext, ConnectionHandler};
pub use ws_handler::handle_connection;
