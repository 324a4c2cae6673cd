//! Error types for the event log.

use crate::event::Sequence;

/// Errors returned by the event log engine and its handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LogError {
    /// The engine task has exited and its mailboxes are gone.
    #[error("event log engine is not running")]
    Closed,

    /// A fetch asked for a sequence further ahead than the next one.
    ///
    /// This is a caller bug, not a transient fault. The engine stops when it
    /// sees one.
    #[error("fetch from sequence {requested} is ahead of the next sequence {next}")]
    FetchAhead { requested: Sequence, next: Sequence },
}

impl LogError {
    /// Whether this error reports a broken caller contract rather than an
    /// operational condition.
    #[must_use]
    pub fn is_defect(&self) -> bool {
        matches!(self, Self::FetchAhead { .. })
    }
}

/// Errors produced while validating a [`LogConfig`](crate::LogConfig).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    ZeroSize { field: &'static str },
}

/// Result type alias for event log operations.
pub type Result<T> = std::result::Result<T, LogError>;
