//! SQLite-backed document store
//!
//! Implements [`UserStore`] over a single path-keyed table. Values are
//! stored as JSON text; `list` and subtree `delete` use escaped LIKE
//! prefix queries so that `%`, `_`, and `\` occurring in paths cannot
//! widen a match.
//!
//! The connection sits behind a mutex so one store can be shared between
//! the books and profile services.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::{params, Connection};
use serde_json::Value;
use tracing::info;

use crate::config::Config;
use crate::store::error::{StoreError, StoreResult};
use crate::store::schema::{init_schema, needs_init};
use crate::store::UserStore;

/// Document store over a local SQLite database
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create the database at the configured location
    pub fn open(config: &Config) -> StoreResult<Self> {
        let path = config.db_path();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(&path)?;
        if needs_init(&conn) {
            init_schema(&conn)?;
        }

        info!("opened document store at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_path(path: &str) -> StoreResult<()> {
        if path.is_empty() {
            return Err(StoreError::InvalidPath(path.to_string()));
        }
        Ok(())
    }
}

impl UserStore for SqliteStore {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        Self::check_path(path)?;
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT value FROM documents WHERE path = ?1")?;
        let result: rusqlite::Result<String> =
            stmt.query_row(params![path], |row| row.get(0));

        match result {
            Ok(text) => {
                let value = serde_json::from_str(&text).map_err(|source| {
                    StoreError::CorruptDocument {
                        path: path.to_string(),
                        source,
                    }
                })?;
                Ok(Some(value))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, path: &str, value: &Value) -> StoreResult<()> {
        Self::check_path(path)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO documents (path, value, updated_at) VALUES (?1, ?2, ?3)",
            params![path, value.to_string(), Utc::now().timestamp_millis()],
        )?;
        Ok(())
    }

    fn delete(&self, path: &str) -> StoreResult<()> {
        Self::check_path(path)?;
        let subtree = format!("{}/%", escape_like(path));
        self.conn().execute(
            "DELETE FROM documents WHERE path = ?1 OR path LIKE ?2 ESCAPE '\\'",
            params![path, subtree],
        )?;
        Ok(())
    }

    fn list(&self, path: &str) -> StoreResult<Vec<(String, Value)>> {
        Self::check_path(path)?;
        let prefix = format!("{}/", path);
        let pattern = format!("{}/%", escape_like(path));

        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT path, value FROM documents WHERE path LIKE ?1 ESCAPE '\\' ORDER BY path",
        )?;
        let rows = stmt.query_map(params![pattern], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut children = Vec::new();
        for row in rows {
            let (full_path, text) = row?;
            let child = &full_path[prefix.len()..];
            // Only direct children; deeper documents belong to nested collections
            if child.contains('/') {
                continue;
            }
            let value = serde_json::from_str(&text).map_err(|source| {
                StoreError::CorruptDocument {
                    path: full_path.clone(),
                    source,
                }
            })?;
            children.push((child.to_string(), value));
        }

        Ok(children)
    }
}

/// Escape LIKE wildcards in a literal prefix
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            data_dir: dir.path().to_path_buf(),
            ..Config::default()
        }
    }

    #[test]
    fn test_set_get_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        let value = json!({"query": "dune", "timestamp": 42});

        store.set("users/u1/search_history/a", &value).unwrap();
        let loaded = store.get("users/u1/search_history/a").unwrap();

        assert_eq!(loaded, Some(value));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert_eq!(store.get("users/u1/profile").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("users/u1/book_notes/k", &json!("first")).unwrap();
        store.set("users/u1/book_notes/k", &json!("second")).unwrap();

        assert_eq!(
            store.get("users/u1/book_notes/k").unwrap(),
            Some(json!("second"))
        );
    }

    #[test]
    fn test_delete_exact_path() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("users/u1/profile", &json!({"uid": "u1"})).unwrap();

        store.delete("users/u1/profile").unwrap();
        assert_eq!(store.get("users/u1/profile").unwrap(), None);
    }

    #[test]
    fn test_delete_removes_subtree() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("users/u1/search_history/a", &json!(1)).unwrap();
        store.set("users/u1/search_history/b", &json!(2)).unwrap();
        store.set("users/u1/profile", &json!({"uid": "u1"})).unwrap();

        store.delete("users/u1/search_history").unwrap();

        assert!(store.list("users/u1/search_history").unwrap().is_empty());
        // Sibling documents untouched
        assert!(store.get("users/u1/profile").unwrap().is_some());
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.delete("users/u1/favorites/x").unwrap();
    }

    #[test]
    fn test_list_returns_direct_children_in_order() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("users/u1/favorites/b", &json!(2)).unwrap();
        store.set("users/u1/favorites/a", &json!(1)).unwrap();
        // A deeper document must not appear as a child of favorites
        store.set("users/u1/favorites/a/extra", &json!(3)).unwrap();

        let children = store.list("users/u1/favorites").unwrap();
        let names: Vec<&str> = children.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_list_empty_collection() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.list("users/u1/favorites").unwrap().is_empty());
    }

    #[test]
    fn test_like_wildcards_do_not_leak() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.set("users/u1/favorites/_works_OL1W", &json!(1)).unwrap();
        // `u_` would match `u1` if the prefix were not escaped
        store.set("users/u_/favorites/other", &json!(2)).unwrap();

        let children = store.list("users/u_/favorites").unwrap();
        let names: Vec<&str> = children.iter().map(|(name, _)| name.as_str()).collect();

        assert_eq!(names, vec!["other"]);
    }

    #[test]
    fn test_empty_path_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.get(""),
            Err(StoreError::InvalidPath(_))
        ));
        assert!(matches!(
            store.set("", &json!(1)),
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_generate_key_is_unique() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.generate_key();
        let b = store.generate_key();

        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);

        {
            let store = SqliteStore::open(&config).unwrap();
            store.set("users/u1/profile", &json!({"uid": "u1"})).unwrap();
        }

        let store = SqliteStore::open(&config).unwrap();
        assert_eq!(
            store.get("users/u1/profile").unwrap(),
            Some(json!({"uid": "u1"}))
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("a%b"), "a\\%b");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
