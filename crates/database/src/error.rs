//! Database error types.

use thiserror::Error;

/// Errors from the cache tables.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Every cache row needs a non-blank key.
    #[error("{table} cache key must not be empty")]
    EmptyKey { table: &'static str },
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Reject blank cache keys before they reach an upsert.
pub(crate) fn check_key(table: &'static str, key: &str) -> Result<()> {
    if key.trim().is_empty() {
        return Err(DatabaseError::EmptyKey { table });
    }
    Ok(())
}
