//! Shutdown coordination for the server.

use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

/// Trigger for graceful shutdown.
///
/// Any holder (the `/shutdown` handler, an OS signal task, a test) can fire
/// it. Triggering never blocks and firing twice is harmless.
#[derive(Debug, Clone, Default)]
pub struct Shutdown {
    token: CancellationToken,
}

impl Shutdown {
    /// Create a new shutdown trigger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown.
    pub fn trigger(&self) {
        if !self.token.is_cancelled() {
            tracing::info!("Shutdown requested");
        }
        self.token.cancel();
    }

    pub fn is_triggered(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once shutdown has been requested.
    pub async fn triggered(&self) {
        self.token.cancelled().await
    }

    /// Owned future for APIs that need a `'static` shutdown signal.
    pub fn subscribe(&self) -> WaitForCancellationFutureOwned {
        self.token.clone().cancelled_owned()
    }
}
