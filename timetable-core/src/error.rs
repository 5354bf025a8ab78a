//! Error types for timetable sync.

use thiserror::Error;

/// Errors that can occur while fetching, normalizing or materializing a timetable.
#[derive(Error, Debug)]
pub enum TimetableError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The remote payload no longer matches the modeled schema.
    #[error("Unexpected timetable payload: {0}")]
    SchemaDrift(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Another sync holds the lock on the same notes folder.
    #[error("Another sync is already writing to this notes folder (lock: {0})")]
    Locked(String),

    #[error("Date out of range: {0}")]
    DateOutOfRange(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl TimetableError {
    /// Whether the timetable could not be fetched or decoded. Nothing has
    /// been written when this is true.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            TimetableError::Transport(_) | TimetableError::Auth(_) | TimetableError::SchemaDrift(_)
        )
    }
}

/// Result type alias for timetable operations.
pub type TimetableResult<T> = Result<T, TimetableError>;
