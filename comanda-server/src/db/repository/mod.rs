//! Repository Module
//!
//! Module-level async functions over `&SqlitePool`; every query that acts on
//! behalf of a caller is scoped by `restaurant_id` (access scoping happens in
//! SQL, not after the fact).

// Auth
pub mod account;

// Tenant
pub mod restaurant;

// Menu catalog
pub mod category;
pub mod item;

// Location
pub mod dining_table;

// Orders
pub mod order;
pub mod order_history;

// Statistics
pub mod statistic;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
