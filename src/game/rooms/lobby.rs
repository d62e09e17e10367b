use serde::Serialize;

/// A room with a free seat
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyRoom {
    pub game_id: String,
    pub occupancy: usize,
    pub bet_amount: Option<f64>,
    /// Seconds since anything happened in the room
    pub idle_secs: u64,
}

/// Rooms that can still be joined
#[derive(Debug, Serialize)]
pub struct LobbyList {
    pub rooms: Vec<LobbyRoom>,
}

/// A fresh, unused game id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGame {
    pub game_id: String,
}
