pub mod client;
pub mod config;
pub mod error;
pub mod game;
pub mod server;

pub use config::Config;
pub use game::messages;
pub use server::RelayServer;

use axum::{
    Json, Router,
    extract::{State, WebSocketUpgrade},
    http::{HeaderValue, Method},
    response::Response,
    routing::get,
};
use game::RelayState;
use game::rooms::{LobbyList, NewGame};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

async fn health() -> &'static str {
    "ok"
}

#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayState>,
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(|socket| game::handle_connection(socket, state.relay))
}

async fn list_rooms(State(state): State<AppState>) -> Json<LobbyList> {
    Json(LobbyList {
        rooms: state.relay.rooms.open_rooms(),
    })
}

async fn new_game(State(state): State<AppState>) -> Json<NewGame> {
    Json(NewGame {
        game_id: state.relay.rooms.unused_game_id(),
    })
}

pub fn app(config: &Config) -> Router {
    let relay = Arc::new(RelayState::new(config.into()));
    app_with_state(config, relay)
}

pub fn app_with_state(config: &Config, relay: Arc<RelayState>) -> Router {
    let state = AppState { relay };

    Router::new()
        .route("/health", get(health))
        .route("/rooms", get(list_rooms))
        .route("/games/new", get(new_game))
        .route(&config.socket_path, get(ws_handler))
        .layer(cors_layer(&config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "Ignoring malformed CORS origin");
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_credentials(true)
}
