//! Error types for dbdrive.

use thiserror::Error;

/// Common error type for drive operations.
#[derive(Error, Debug)]
pub enum DriveError {
    /// Lookup by id, path or parent/name found nothing.
    #[error("{0} not found")]
    NotFound(String),

    /// Metadata store failure.
    ///
    /// Covers connectivity problems, constraint violations and malformed
    /// queries. Errors from sqlx are converted automatically.
    #[error("store error: {0}")]
    Store(String),

    /// Blob open/read/write failure.
    #[error("content error: {0}")]
    Content(#[from] std::io::Error),

    /// Invalid input: bad names, structural misuse of an operation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for DriveError {
    fn from(e: sqlx::Error) -> Self {
        DriveError::Store(e.to_string())
    }
}

/// Result type alias for drive operations.
pub type Result<T> = std::result::Result<T, DriveError>;
