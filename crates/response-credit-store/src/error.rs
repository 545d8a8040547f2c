//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during world-state operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Key rejected by the store.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Read from a cursor after it was closed.
    #[error("range cursor already closed")]
    CursorClosed,

    /// A lock guarding store state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    Poisoned(String),

    /// A blocking store task failed to complete.
    #[error("store task failed: {0}")]
    Task(String),

    /// The backend could not service the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
