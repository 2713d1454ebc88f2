//! # Error Types
//!
//! Errors raised by persistent storage backends.

use thiserror::Error;

/// Errors that can occur while talking to the persistent block store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    DatabaseError(String),
}
