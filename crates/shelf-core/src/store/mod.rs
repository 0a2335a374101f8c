//! Per-user document store
//!
//! A minimal key-value/document interface over slash-delimited paths,
//! mirroring the tree layout a remote document store would use:
//!
//! - `get`/`set`/`delete` address one document by exact path
//! - `list` returns the direct children of a collection path
//! - `delete` removes the document at the path and everything under it
//! - `generate_key` hands out store-assigned opaque keys (history entries)
//!
//! The store is the sole writer of durable state; the sync services layered
//! on top hold nothing but the in-memory projections they expose.

pub mod error;
pub mod paths;
pub mod schema;
pub mod sqlite;

pub use error::{StoreError, StoreResult};
pub use sqlite::SqliteStore;

use serde_json::Value;
use uuid::Uuid;

/// Document store scoped by slash-delimited paths.
///
/// Implementations must treat paths as opaque except for the `/` separator.
/// Values are JSON documents; interpretation is left to callers.
pub trait UserStore {
    /// Read the document at `path`, if any.
    fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    /// Create or overwrite the document at `path`.
    fn set(&self, path: &str, value: &Value) -> StoreResult<()>;

    /// Delete the document at `path` and any documents beneath it.
    ///
    /// Deleting a path with no documents is not an error.
    fn delete(&self, path: &str) -> StoreResult<()>;

    /// List direct children of `path` as `(child_name, value)` pairs,
    /// ordered by child name. Documents nested deeper than one level are
    /// not included.
    fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>>;

    /// Produce a new store-assigned key, unique per call.
    fn generate_key(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
