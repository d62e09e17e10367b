use crate::config::{Config, MIN_SWEEP_INTERVAL};
use crate::game::{RelayState, RoomRegistry};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long `stop` waits for open sockets to close
const CONNECTION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// A running relay: the HTTP/WebSocket server plus the idle room sweeper.
///
/// Each instance owns its own [`RelayState`], so several can run side by
/// side in one process.
pub struct RelayServer {
    local_addr: SocketAddr,
    relay: Arc<RelayState>,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<io::Result<()>>,
    sweeper: JoinHandle<()>,
}

impl RelayServer {
    /// Bind `config.addr()` and start serving
    pub async fn start(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.addr()).await?;
        Self::start_on(listener, config)
    }

    pub fn start_on(listener: TcpListener, config: Config) -> io::Result<Self> {
        let local_addr = listener.local_addr()?;
        let relay = Arc::new(RelayState::new((&config).into()));
        let app = crate::app_with_state(&config, relay.clone());

        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .inspect_err(|e| error!(error = %e, "Server error"))
        });

        let sweeper = spawn_room_sweeper(
            relay.rooms.clone(),
            config.sweep_interval,
            config.room_idle_timeout,
        );

        info!(
            %local_addr,
            socket_path = config.socket_path,
            move_validation = ?config.move_validation,
            bet_policy = ?config.bet_policy,
            "Relay server started"
        );

        Ok(Self {
            local_addr,
            relay,
            shutdown,
            server,
            sweeper,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn relay(&self) -> &Arc<RelayState> {
        &self.relay
    }

    /// Stop accepting connections, close every open socket and wait for
    /// the server task to finish
    pub async fn stop(self) -> io::Result<()> {
        self.sweeper.abort();
        let _ = self.shutdown.send(());
        if tokio::time::timeout(CONNECTION_DRAIN_TIMEOUT, self.relay.close_connections())
            .await
            .is_err()
        {
            warn!(local_addr = %self.local_addr, "Sockets still open after shutdown timeout");
        }
        let result = match self.server.await {
            Ok(result) => result,
            Err(e) => Err(io::Error::other(e)),
        };
        info!(local_addr = %self.local_addr, "Relay server stopped");
        result
    }
}

/// Periodically drop rooms nobody has touched for `max_idle`.
/// `every` is raised to [`MIN_SWEEP_INTERVAL`] if shorter.
pub fn spawn_room_sweeper(
    rooms: Arc<RoomRegistry>,
    every: Duration,
    max_idle: Duration,
) -> JoinHandle<()> {
    let every = every.max(MIN_SWEEP_INTERVAL);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            rooms.evict_idle(max_idle);
        }
    })
}
