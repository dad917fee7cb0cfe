//! Error types for the Atheneum lending engine

use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("No copies available")]
    OutOfStock,

    #[error("Member already holds an active loan for this book")]
    AlreadyBorrowed,

    #[error("Record is already returned")]
    AlreadyReturned,

    #[error("Category still owns {0} book(s)")]
    HasBooks(i64),

    #[error("No other category exists to receive the books")]
    NoFallbackAvailable,

    #[error("Inventory corruption: {0}")]
    InventoryCorruption(String),

    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Expected business-rule outcomes callers are meant to branch on,
    /// as opposed to failures escaping to a generic handler.
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            AppError::OutOfStock
                | AppError::AlreadyBorrowed
                | AppError::AlreadyReturned
                | AppError::HasBooks(_)
                | AppError::NoFallbackAvailable
        )
    }

    /// A violated engine invariant. Must never fire in a correct
    /// implementation; logged loudly instead of auto-corrected.
    pub fn inventory_corruption(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        tracing::error!("inventory corruption detected: {}", msg);
        AppError::InventoryCorruption(msg)
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
