// 🗄️ Key-Value Storage - the persisted medium behind the expense store
// One SQLite table, one row per key, value is an opaque JSON document

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Failures of the storage medium itself. There is no recovery path for these.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Minimal key-value contract the expense store persists through
pub trait KeyValueStore {
    /// Raw value stored under `key`, `None` if the key was never written
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// ============================================================================
// SQLITE BACKEND
// ============================================================================

pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Open (or create) the database file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path.as_ref())?;
        debug!("Opened key-value database at {:?}", path.as_ref());
        Self::from_connection(conn)
    }

    /// Throwaway database, used by tests and dry runs
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        setup_database(&conn)?;
        Ok(SqliteKeyValueStore { conn })
    }

    /// Number of keys currently stored
    pub fn key_count(&self) -> Result<i64, StorageError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, CURRENT_TIMESTAMP)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value],
        )?;
        debug!("Wrote {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}

fn setup_database(conn: &Connection) -> Result<(), StorageError> {
    // Enable WAL mode for crash recovery (in-memory databases stay "memory")
    let mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    debug!("journal_mode = {}", mode);

    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = SqliteKeyValueStore::open_in_memory().unwrap();
        assert_eq!(store.get("expenses").unwrap(), None);
    }

    #[test]
    fn test_set_then_get() {
        let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
        store.set("expenses", "[]").unwrap();

        assert_eq!(store.get("expenses").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
        store.set("expenses", "[1]").unwrap();
        store.set("expenses", "[1,2]").unwrap();

        assert_eq!(store.get("expenses").unwrap().as_deref(), Some("[1,2]"));
        assert_eq!(store.key_count().unwrap(), 1);
    }

    #[test]
    fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");

        {
            let mut store = SqliteKeyValueStore::open(&path).unwrap();
            store.set("expenses", "[\"kept\"]").unwrap();
        }

        let reopened = SqliteKeyValueStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("expenses").unwrap().as_deref(),
            Some("[\"kept\"]")
        );
    }
}
