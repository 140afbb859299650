//! Error types for the grid engine.

use std::any::Any;

use thiserror::Error;

/// Errors raised while normalizing column declarations.
///
/// These are configuration mistakes of the hosting page and are fatal to the
/// normalization call that found them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColumnError {
    /// Two leaf columns resolved to the same id.
    #[error("duplicate column id '{id}'")]
    DuplicateId { id: String },
}

/// Errors raised by the cell edit controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    /// The row under edit has no business identifier, so the change cannot be
    /// addressed to the commit collaborator. The pending value was discarded.
    #[error("row {row_index} has no identifier; edit discarded")]
    MissingRowIdentifier { row_index: usize },

    /// Another commit is still outstanding for this grid.
    #[error("a cell commit is already in flight")]
    CommitInFlight,
}

/// Failure reported by the external commit collaborator.
///
/// The grid recovers from it locally by rolling the optimistic value back.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("commit rejected: {message}")]
pub struct CommitRejected {
    /// Error message
    pub message: String,
}

impl CommitRejected {
    /// Create a new rejection
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for CommitRejected {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for CommitRejected {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Umbrella error for callers that want a single type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error(transparent)]
    Column(#[from] ColumnError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Commit(#[from] CommitRejected),
}

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. Anything else falls
/// back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
