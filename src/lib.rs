//! Directory-exposing HTTP file server library.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod listing;
pub mod net;
pub mod observability;

pub use config::schema::ServerConfig;
pub use error::ServerError;
pub use lifecycle::{LifecycleServer, Shutdown};
