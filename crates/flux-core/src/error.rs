use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for every core operation. The `Display` string is the
/// human-readable message the UI layer shows verbatim.
#[derive(Debug, Error)]
pub enum Error {
    /// No session at all.
    #[error("Unauthorized")]
    Unauthorized,

    /// Session present, role insufficient.
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Duplicate slug, duplicate pending request, and similar.
    #[error("{0}")]
    Conflict(String),

    /// Missing or blank required field.
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

impl Error {
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// Fold a unique-constraint violation into `Conflict` so a racing insert
/// surfaces exactly like the pre-checked path.
pub fn conflict_on_unique(err: DbErr, message: &str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::Conflict(message.to_string()),
        _ => Error::Database(err),
    }
}
