//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (server.rs):
//!     Build router → Bind listener → Spawn accept loop → Running
//!
//! Shutdown (shutdown.rs, server.rs):
//!     /shutdown, SIGINT/SIGTERM, or test → Shutdown::trigger
//!     → coordinator wakes → ShuttingDown
//!     → stop accepting → drain in-flight requests → Stopped
//!
//! Fatal listener error (server.rs):
//!     accept loop returns Err → ShuttingDown → Stopped → error to caller
//! ```
//!
//! # Design Decisions
//! - Ordered startup: routes, then bind, then accept
//! - Ordered shutdown: stop accept, drain, close
//! - Shutdown has timeout: the drain is abandoned after the deadline

pub mod server;
pub mod shutdown;
pub mod signals;
pub mod state;

pub use server::{LifecycleServer, RunningServer};
pub use shutdown::Shutdown;
pub use state::{ServerState, StateWatch};
