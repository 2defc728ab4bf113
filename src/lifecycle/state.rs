//! Server state machine.
//!
//! # States
//! - Starting: routes not yet registered, nothing bound
//! - Running: listener accepting connections
//! - ShuttingDown: no new connections, in-flight requests draining
//! - Stopped: terminal
//!
//! # State Transitions
//! ```text
//! Starting → Running:       listener bound, accept loop spawned
//! Starting → Stopped:       bind failed
//! Running → ShuttingDown:   shutdown signal or fatal listener error
//! ShuttingDown → Stopped:   drain finished or timed out
//! ```
//!
//! Only the lifecycle coordinator owns a [`StateCell`]; everybody else sees
//! the state through a read-only [`StateWatch`].

use std::fmt;

use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Running,
    ShuttingDown,
    Stopped,
}

impl ServerState {
    pub fn can_transition_to(self, next: ServerState) -> bool {
        use ServerState::*;
        matches!(
            (self, next),
            (Starting, Running) | (Starting, Stopped) | (Running, ShuttingDown) | (ShuttingDown, Stopped)
        )
    }
}

impl fmt::Display for ServerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServerState::Starting => "starting",
            ServerState::Running => "running",
            ServerState::ShuttingDown => "shutting_down",
            ServerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Writable state, held by the lifecycle coordinator only.
#[derive(Debug)]
pub(crate) struct StateCell {
    tx: watch::Sender<ServerState>,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Starting);
        Self { tx }
    }

    pub(crate) fn get(&self) -> ServerState {
        *self.tx.borrow()
    }

    /// Move to `next` if the transition is legal. Returns whether it happened.
    pub(crate) fn transition(&self, next: ServerState) -> bool {
        let current = self.get();
        if !current.can_transition_to(next) {
            tracing::warn!(from = %current, to = %next, "Refusing illegal server state transition");
            return false;
        }
        self.tx.send_replace(next);
        tracing::info!(from = %current, to = %next, "Server state changed");
        true
    }

    pub(crate) fn watch(&self) -> StateWatch {
        StateWatch {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the server state.
#[derive(Debug, Clone)]
pub struct StateWatch {
    rx: watch::Receiver<ServerState>,
}

impl StateWatch {
    pub fn current(&self) -> ServerState {
        *self.rx.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.current() == ServerState::Running
    }

    /// Wait until the state satisfies `pred`.
    ///
    /// Returns the matching state, or the last seen state if the coordinator
    /// went away first.
    pub async fn wait_for(&mut self, pred: impl FnMut(&ServerState) -> bool) -> ServerState {
        let seen = self.rx.wait_for(pred).await.map(|state| *state);
        seen.unwrap_or_else(|_| *self.rx.borrow())
    }
}
