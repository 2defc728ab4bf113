//! Top-level server errors.

use std::time::Duration;

use thiserror::Error;

use crate::net::listener::ListenerError;

/// Why the server failed to start, failed while running, or failed to stop cleanly.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Listener(#[from] ListenerError),

    /// The accept loop ended with an error other than a requested close.
    #[error("Listener failed: {0}")]
    Serve(#[source] std::io::Error),

    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// In-flight requests did not finish within the drain timeout.
    #[error("Graceful shutdown did not finish within {0:?}")]
    DrainTimeout(Duration),
}
