//! Error types for the slotbook engine.

use thiserror::Error;

/// Main error type for slotbook operations.
#[derive(Error, Debug)]
pub enum SlotbookError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration-related errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Persistence-layer errors.
///
/// `Unavailable` models a transient network/backend failure. It is surfaced
/// to the operator as a recoverable "could not save/load" condition and is
/// never retried automatically.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

/// Result type alias for slotbook operations.
pub type Result<T> = std::result::Result<T, SlotbookError>;

impl SlotbookError {
    /// Whether the operator may simply retry the same action.
    pub fn is_transient(&self) -> bool {
        matches!(self, SlotbookError::Store(StoreError::Unavailable(_)))
    }
}
