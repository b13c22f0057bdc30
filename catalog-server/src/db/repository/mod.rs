//! Repository Module
//!
//! Function-style repositories over the SCD2 version tables, one module per
//! catalog family. Current-state reads filter on `valid_to IS NULL`; writes
//! go through `db::temporal` so the close/open transition stays atomic.

pub mod category;
pub mod modifier_option;
pub mod modifier_type;
pub mod printer_group;
pub mod product;
pub mod product_instance;

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
