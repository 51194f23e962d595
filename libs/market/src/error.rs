//! Error types for the marketplace domain

use thiserror::Error;

/// Errors raised by a [`crate::store::MarketStore`] backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the constraint name
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),

    /// A stored value could not be decoded
    #[error("Corrupt stored data: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string());
            }
        }
        StoreError::Database(e)
    }
}

/// Type alias for store results
pub type StoreResult<T> = Result<T, StoreError>;

/// Outcome of a rejected marketplace operation
#[derive(Error, Debug)]
pub enum MarketError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error("Internal failure: {0}")]
    Internal(String),
}

impl MarketError {
    pub fn invalid(message: impl Into<String>) -> Self {
        MarketError::InvalidInput(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        MarketError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        MarketError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        MarketError::Conflict(message.into())
    }

    /// Whether this error hides an unexpected failure
    pub fn is_internal(&self) -> bool {
        matches!(self, MarketError::Store(_) | MarketError::Internal(_))
    }
}

/// Type alias for operation results
pub type MarketResult<T> = Result<T, MarketError>;
