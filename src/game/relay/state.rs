use crate::config::Config;
use crate::game::core::{BetPolicy, MoveValidation};
use crate::game::rooms::RoomRegistry;
use std::sync::Arc;
use tokio::sync::watch;

/// Knobs that change how client events are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaySettings {
    pub move_validation: MoveValidation,
    pub bet_policy: BetPolicy,
    /// Leave every joined room when a socket drops instead of waiting for
    /// an explicit `leave-game` or idle eviction
    pub release_on_disconnect: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            move_validation: MoveValidation::Enforced,
            bet_policy: BetPolicy::Optional,
            release_on_disconnect: true,
        }
    }
}

impl From<&Config> for RelaySettings {
    fn from(config: &Config) -> Self {
        Self {
            move_validation: config.move_validation,
            bet_policy: config.bet_policy,
            release_on_disconnect: config.release_on_disconnect,
        }
    }
}

/// Everything a relay instance owns. Built once per server and handed to
/// each connection.
pub struct RelayState {
    pub rooms: Arc<RoomRegistry>,
    pub settings: RelaySettings,
    /// Flips to `true` once the relay is stopping; every open socket holds
    /// a receiver
    shutdown: watch::Sender<bool>,
}

impl RelayState {
    pub fn new(settings: RelaySettings) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            rooms: Arc::new(RoomRegistry::new()),
            settings,
            shutdown,
        }
    }

    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    pub fn is_stopping(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Tell every open socket to close and wait until all of them have
    pub async fn close_connections(&self) {
        self.shutdown.send_replace(true);
        self.shutdown.closed().await;
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new(RelaySettings::default())
    }
}
