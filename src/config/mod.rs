//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional) + CLI flags
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → loader.rs resolves the served root once
//!     → passed by value into LifecycleServer
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - No ambient globals: handlers receive the served root at construction

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_served_root, ConfigError};
pub use schema::ListenerConfig;
pub use schema::ListingConfig;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
pub use schema::ShutdownConfig;
