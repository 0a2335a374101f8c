//! Store error handling
//!
//! Typed errors for document-store operations with descriptive messages.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create the store's data directory
    #[error("Failed to create store directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A stored document could not be parsed as JSON
    #[error("Corrupt document at '{path}': {source}")]
    CorruptDocument {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A path was empty or otherwise unusable as a store key
    #[error("Invalid store path: '{0}'")]
    InvalidPath(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
