//! Console error types

use thiserror::Error;

use datagrid::GridError;

/// Errors that stop the console or reject a command line.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("{0}")]
    Usage(String),
}

impl ConsoleError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }
}
