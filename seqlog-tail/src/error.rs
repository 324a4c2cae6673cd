//! Error types for the tailing consumer.

use seqlog_core::{ConfigError, LogError};

/// Errors produced by the tailing consumer and its collaborators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TailError {
    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Sink error: {0}")]
    Sink(String),

    #[error("Event log error: {0}")]
    Log(#[from] LogError),

    #[error("Invalid tail configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Result type for tailing operations.
pub type Result<T> = std::result::Result<T, TailError>;
