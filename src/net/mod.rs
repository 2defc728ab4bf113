//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (resolve address, bind)
//!     → axum::serve accept loop (one task per connection)
//!
//! Listing streams:
//!     tracker.rs counts producers still writing
//!     → lifecycle coordinator logs them when the drain starts
//! ```
//!
//! # Design Decisions
//! - Binding happens before the server reports Running
//! - Each streaming listing is tracked until its producer exits

pub mod listener;
pub mod tracker;
