//! Lifecycle coordinator.
//!
//! # Responsibilities
//! - Register routes and bind the listener (Starting → Running)
//! - Run the accept loop on its own task
//! - Wait for the first of: shutdown trigger, accept loop failure
//! - Drain in-flight requests within a deadline (ShuttingDown → Stopped)
//!
//! # Design Decisions
//! - The coordinator is the only writer of [`ServerState`]
//! - Handlers never tear anything down; they fire the [`Shutdown`] trigger
//! - Drain outcome (clean, failed, timed out) is returned to the caller

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::http::{build_router, AppState};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::state::{ServerState, StateCell, StateWatch};
use crate::listing::ListingHandler;
use crate::net::listener;
use crate::net::tracker::ActivityTracker;

/// A server that has not been started yet.
pub struct LifecycleServer {
    config: ServerConfig,
    served_root: PathBuf,
    shutdown: Shutdown,
    state: StateCell,
    activity: ActivityTracker,
}

impl LifecycleServer {
    /// Create a server for `served_root`, which should already be canonical.
    pub fn new(config: ServerConfig, served_root: PathBuf) -> Self {
        Self {
            config,
            served_root,
            shutdown: Shutdown::new(),
            state: StateCell::new(),
            activity: ActivityTracker::new(),
        }
    }

    /// Trigger that stops this server, usable before and after start.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn state(&self) -> StateWatch {
        self.state.watch()
    }

    /// Register routes, bind, and start accepting connections.
    pub async fn start(self) -> Result<RunningServer, ServerError> {
        let app_state = AppState {
            listing: ListingHandler::new(
                self.served_root.clone(),
                self.config.listing.channel_capacity,
                self.activity.clone(),
            ),
            shutdown: self.shutdown.clone(),
            server_state: self.state.watch(),
        };
        let app = build_router(app_state);

        let bound = listener::bind(&self.config.listener)
            .await
            .map_err(ServerError::from)
            .and_then(|l| l.local_addr().map(|addr| (l, addr)).map_err(ServerError::Serve));
        let (tcp_listener, local_addr) = match bound {
            Ok(bound) => bound,
            Err(e) => {
                tracing::error!(error = %e, "Server failed to start");
                self.state.transition(ServerState::Stopped);
                return Err(e);
            }
        };

        tracing::info!(
            served_dir = %self.served_root.display(),
            address = %local_addr,
            "Serving directory"
        );

        self.state.transition(ServerState::Running);

        let signal = self.shutdown.subscribe();
        let serve = tokio::spawn(async move {
            axum::serve(tcp_listener, app.into_make_service())
                .with_graceful_shutdown(signal)
                .await
        });

        Ok(RunningServer {
            local_addr,
            shutdown: self.shutdown,
            state: self.state,
            activity: self.activity,
            drain_timeout: Duration::from_secs(self.config.shutdown.drain_timeout_secs),
            serve,
        })
    }

    /// Start, then block until the server has stopped.
    pub async fn run(self) -> Result<(), ServerError> {
        self.start().await?.wait().await
    }
}

/// A server whose accept loop is running.
pub struct RunningServer {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    state: StateCell,
    activity: ActivityTracker,
    drain_timeout: Duration,
    serve: JoinHandle<io::Result<()>>,
}

impl RunningServer {
    /// The address actually bound (resolves port 0).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn state(&self) -> StateWatch {
        self.state.watch()
    }

    /// Block until shutdown is requested or the accept loop dies, then drain.
    pub async fn wait(self) -> Result<(), ServerError> {
        let RunningServer {
            shutdown,
            state,
            activity,
            drain_timeout,
            mut serve,
            ..
        } = self;

        let early_exit = tokio::select! {
            _ = shutdown.triggered() => None,
            joined = &mut serve => Some(joined),
        };

        state.transition(ServerState::ShuttingDown);

        let result = match early_exit {
            None => {
                tracing::info!(
                    active_listings = activity.active_count(),
                    drain_timeout_secs = drain_timeout.as_secs(),
                    "Draining in-flight requests"
                );
                drain(&mut serve, drain_timeout).await
            }
            Some(joined) => {
                // Release anything else waiting on the trigger.
                shutdown.trigger();
                let result = flatten(joined);
                match &result {
                    Ok(()) => tracing::warn!("Listener closed without a shutdown request"),
                    Err(e) => tracing::error!(error = %e, "Listener failed, shutting down"),
                }
                result
            }
        };

        state.transition(ServerState::Stopped);
        match &result {
            Ok(()) => tracing::info!("Server stopped"),
            Err(e) => tracing::error!(error = %e, "Server stopped with error"),
        }
        result
    }
}

async fn drain(
    serve: &mut JoinHandle<io::Result<()>>,
    timeout: Duration,
) -> Result<(), ServerError> {
    match tokio::time::timeout(timeout, &mut *serve).await {
        Ok(joined) => flatten(joined),
        Err(_) => {
            serve.abort();
            Err(ServerError::DrainTimeout(timeout))
        }
    }
}

fn flatten(joined: Result<io::Result<()>, JoinError>) -> Result<(), ServerError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(ServerError::Serve(e)),
        Err(e) => Err(ServerError::Task(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local_config() -> ServerConfig {
        let mut config = ServerConfig::default();
        config.listener.address = "127.0.0.1".into();
        config.listener.port = 0;
        config
    }

    #[tokio::test]
    async fn start_then_shutdown_walks_every_state() {
        let dir = TempDir::new().unwrap();
        let server = LifecycleServer::new(local_config(), dir.path().to_path_buf());
        let watch = server.state();
        assert_eq!(watch.current(), ServerState::Starting);

        let running = server.start().await.unwrap();
        assert_eq!(watch.current(), ServerState::Running);
        assert_ne!(running.local_addr().port(), 0);

        running.shutdown_handle().trigger();
        running.wait().await.unwrap();
        assert_eq!(watch.current(), ServerState::Stopped);
    }

    #[tokio::test]
    async fn shutdown_before_wait_is_not_lost() {
        let dir = TempDir::new().unwrap();
        let server = LifecycleServer::new(local_config(), dir.path().to_path_buf());
        let shutdown = server.shutdown_handle();

        let running = server.start().await.unwrap();
        shutdown.trigger();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_secs(5), running.wait())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn bind_failure_stops_without_running() {
        let dir = TempDir::new().unwrap();
        let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = local_config();
        config.listener.port = occupied.local_addr().unwrap().port();

        let server = LifecycleServer::new(config, dir.path().to_path_buf());
        let watch = server.state();

        let result = server.start().await;
        assert!(matches!(result, Err(ServerError::Listener(_))));
        assert_eq!(watch.current(), ServerState::Stopped);
    }

    fn fake_running(serve: JoinHandle<io::Result<()>>, drain_timeout: Duration) -> RunningServer {
        let state = StateCell::new();
        state.transition(ServerState::Running);
        RunningServer {
            local_addr: "127.0.0.1:0".parse().unwrap(),
            shutdown: Shutdown::new(),
            state,
            activity: ActivityTracker::new(),
            drain_timeout,
            serve,
        }
    }

    #[tokio::test]
    async fn fatal_listener_error_shuts_down() {
        let serve = tokio::spawn(async {
            Err(io::Error::new(io::ErrorKind::Other, "accept exploded"))
        });
        let running = fake_running(serve, Duration::from_secs(1));
        let watch = running.state();
        let shutdown = running.shutdown_handle();

        let result = running.wait().await;
        assert!(matches!(result, Err(ServerError::Serve(_))));
        assert_eq!(watch.current(), ServerState::Stopped);
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn slow_drain_times_out() {
        let serve = tokio::spawn(async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        });
        let running = fake_running(serve, Duration::from_millis(50));
        let watch = running.state();
        running.shutdown_handle().trigger();

        let result = running.wait().await;
        assert!(matches!(result, Err(ServerError::DrainTimeout(_))));
        assert_eq!(watch.current(), ServerState::Stopped);
    }
}
