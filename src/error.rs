//! Error types for the evader crate

use thiserror::Error;

/// Main error type for the evader crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action index {action} is out of range (table has {num_actions} actions)")]
    ActionOutOfRange { action: usize, num_actions: usize },

    #[error("state index {state} is out of range (table has {num_states} states)")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("invalid action index {index} (expected 0-3)")]
    InvalidAction { index: usize },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid map at line {line}: {message}")]
    InvalidMap { line: usize, message: String },

    #[error("table dimensions {got_actions}x{got_states} do not match expected {expected_actions}x{expected_states}")]
    DimensionMismatch {
        expected_actions: usize,
        expected_states: usize,
        got_actions: usize,
        got_states: usize,
    },

    #[error("world has no walkable cells")]
    NoWalkableCells,

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
