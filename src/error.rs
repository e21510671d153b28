//! Error types for rssy.

use thiserror::Error;

/// Common error type for rssy.
#[derive(Error, Debug)]
pub enum RssyError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Feed fetch or parse error.
    #[error("feed error: {0}")]
    Feed(String),

    /// Language model completion error.
    #[error("completion error: {0}")]
    Completion(String),

    /// Notification webhook error.
    #[error("notify error: {0}")]
    Notify(String),

    /// Validation error for input values.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for RssyError {
    fn from(e: sqlx::Error) -> Self {
        RssyError::Database(e.to_string())
    }
}

/// Result type alias for rssy operations.
pub type Result<T> = std::result::Result<T, RssyError>;
