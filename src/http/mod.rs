//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (accepted by axum::serve)
//!     → server.rs (request ID, trace span, metrics)
//!     → /files/*     → files.rs (ServeDir under the served root)
//!     → /filelist    → listing::handler (streamed listing)
//!     → /health      → handlers.rs
//!     → /shutdown    → handlers.rs (fires the shutdown trigger)
//! ```

pub mod files;
pub mod handlers;
pub mod server;

pub use server::{build_router, AppState};
