use crate::game::core::{BetPolicy, MoveValidation};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Shortest period the idle room sweeper runs at
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Route the WebSocket is served on
    pub socket_path: String,
    /// Browser origins allowed to open the socket with credentials
    pub cors_origins: Vec<String>,
    pub move_validation: MoveValidation,
    pub bet_policy: BetPolicy,
    pub release_on_disconnect: bool,
    pub room_idle_timeout: Duration,
    pub sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            socket_path: "/api/socket".to_string(),
            cors_origins: vec!["http://localhost:3000".to_string()],
            move_validation: MoveValidation::Enforced,
            bet_policy: BetPolicy::Optional,
            release_on_disconnect: true,
            room_idle_timeout: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl Config {
    /// Read `.env` if present, then the process environment
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve every setting through `lookup`, falling back to defaults for
    /// missing or unparseable values
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let socket_path = lookup("SOCKET_PATH")
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .map(|p| if p.starts_with('/') { p } else { format!("/{p}") })
            .unwrap_or(defaults.socket_path);

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|list| {
                list.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.cors_origins);

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            socket_path,
            cors_origins,
            move_validation: parsed(&lookup, "MOVE_VALIDATION").unwrap_or(defaults.move_validation),
            bet_policy: parsed(&lookup, "BET_POLICY").unwrap_or(defaults.bet_policy),
            release_on_disconnect: parsed(&lookup, "RELEASE_ON_DISCONNECT")
                .unwrap_or(defaults.release_on_disconnect),
            room_idle_timeout: parsed(&lookup, "ROOM_IDLE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.room_idle_timeout),
            sweep_interval: parsed(&lookup, "ROOM_SWEEP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.sweep_interval)
                .max(MIN_SWEEP_INTERVAL),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}
