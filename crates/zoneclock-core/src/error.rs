//! Core error types for zoneclock-core.
//!
//! Expected-state violations are ordinary values here: every session
//! operation returns a [`Result`] and callers decide what to do with the
//! failure.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for zoneclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Operation attempted from a state or status that forbids it.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Settings or arguments failed range/consistency checks.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Queried entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence read/write failure.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration file failure.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Aggregated validation failure, one message per violated rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", .errors.join("; "))]
pub struct ValidationError {
    pub errors: Vec<String>,
}

impl ValidationError {
    pub fn new(errors: Vec<String>) -> Self {
        Self { errors }
    }

    pub fn single(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite query or connection failure
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Stored blob could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure (data directory, database file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A store lock was poisoned by a panicking writer
    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value could not be parsed for the key's type
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Failure reported by a notification or audio collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{port} failed: {message}")]
pub struct PortError {
    pub port: &'static str,
    pub message: String,
}

impl PortError {
    pub fn new(port: &'static str, message: impl Into<String>) -> Self {
        Self {
            port,
            message: message.into(),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
