//! Storage error types

use thiserror::Error;

/// Errors that can occur in the storage layer
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O operation failed (creating the database directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite rejected a statement
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Requested record does not exist or belongs to another user
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: i64 },

    /// Caller supplied an unusable value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Sign-in identity does not own the account it asked for
    #[error("identity does not match the account")]
    IdentityMismatch,

    /// Lock acquisition failed
    #[error("Lock error: {0}")]
    Lock(String),
}

impl StorageError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        StorageError::NotFound { kind, id }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("Meal", 42);
        assert_eq!(err.to_string(), "Meal not found: 42");

        let err = StorageError::InvalidInput("empty name".into());
        assert_eq!(err.to_string(), "Invalid input: empty name");
    }

    #[test]
    fn test_sqlite_error_conversion() {
        let err: StorageError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, StorageError::Database(_)));
    }
}
