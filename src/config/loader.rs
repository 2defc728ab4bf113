//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::ServerConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Served directory {path:?} is unusable: {reason}")]
    ServedDir { path: PathBuf, reason: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ServerConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Resolve the served directory to a canonical absolute path.
///
/// Falls back to the current working directory when none is configured.
pub fn resolve_served_root(config: &ServerConfig) -> Result<PathBuf, ConfigError> {
    let requested = match &config.served_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };

    let root = requested.canonicalize().map_err(|e| ConfigError::ServedDir {
        path: requested.clone(),
        reason: e.to_string(),
    })?;

    if !root.is_dir() {
        return Err(ConfigError::ServedDir {
            path: requested,
            reason: "not a directory".to_string(),
        });
    }

    Ok(root)
}
