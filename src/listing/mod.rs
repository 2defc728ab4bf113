//! Directory listing subsystem.
//!
//! # Data Flow
//! ```text
//! GET /filelist?type=&recursive=&startswith=
//!     → handler.rs (defaults, spawn blocking work, stream body)
//!     → request.rs (validate query, resolve start dir under served root)
//!     → walker.rs (flat read_dir or recursive walkdir, skip bad entries)
//!     → filter.rs (keep files, dirs, or both)
//!     → one `/relative/path` line per entry into the response
//! ```
//!
//! # Design Decisions
//! - Everything that can change the status code happens before the first byte
//! - Partial success: an unreadable entry is logged, not fatal
//! - Output is streamed line by line; nothing is collected in memory
//! - Requests share no mutable state

pub mod error;
pub mod filter;
pub mod handler;
pub mod request;
pub mod walker;

pub use error::ListingError;
pub use filter::FileType;
pub use handler::{filelist, ListingHandler, ListingParams};
pub use request::{Listing, ListingQuery, ListingRequest};
pub use walker::{Entry, WalkError, Walker};
