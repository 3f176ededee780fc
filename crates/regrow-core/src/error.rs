//! Core error types for regrow-core.
//!
//! Every fallible operation in the library reports through this hierarchy.
//! Static-table misconfiguration is the one condition that is also fatal:
//! [`crate::progress::ProgressTables::new`] panics with the [`TableError`] text.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for regrow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Event or settings store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Static table validation errors
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by an [`crate::store::EventStore`] or
/// [`crate::store::SettingsStore`] implementation.
///
/// The core never swallows these; they reach the caller unmodified.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No relapse event with this id
    #[error("Relapse event '{id}' not found")]
    NotFound { id: String },

    /// Store could not be reached or refused the write
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Stored tag list could not be decoded
    #[error("Corrupt tag list for '{id}': {message}")]
    CorruptTags { id: String, message: String },
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be determined or created
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Static table validation errors.
///
/// These indicate a build-time defect in a checkpoint, achievement or
/// growth-stage table, never bad user data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// Table has no rows but needs at least one
    #[error("{table} table must not be empty")]
    Empty { table: &'static str },

    /// Threshold below zero
    #[error("{table} table: '{id}' has negative threshold {threshold_ms}ms")]
    NegativeThreshold {
        table: &'static str,
        id: String,
        threshold_ms: i64,
    },

    /// Thresholds out of order or repeated
    #[error(
        "{table} table: '{id}' ({threshold_ms}ms) does not strictly follow '{previous_id}' ({previous_ms}ms)"
    )]
    NotAscending {
        table: &'static str,
        id: String,
        threshold_ms: i64,
        previous_id: String,
        previous_ms: i64,
    },

    /// Two rows share an id
    #[error("{table} table: duplicate id '{id}'")]
    DuplicateId { table: &'static str, id: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Unavailable(err.to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
