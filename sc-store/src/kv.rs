//! App-local key-value storage.
//!
//! `KeyValueStore` is the seam between the ledger and wherever the host keeps
//! small persisted values. Writes replace the whole value for a key in one
//! statement, so a reader never sees a half-written value.

use std::collections::HashMap;
use std::sync::Mutex;

use rusqlite::params;
use tracing::debug;

use sc_core::error::{ScError, ScResult};

use crate::db::Database;

/// String-keyed, string-valued persistent storage.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> ScResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> ScResult<()>;

    /// Remove `key`. Returns whether a value was present.
    fn remove_item(&self, key: &str) -> ScResult<bool>;

    /// All keys currently stored, sorted.
    fn keys(&self) -> ScResult<Vec<String>>;
}

/// Key-value store backed by the `kv_store` SQLite table.
#[derive(Clone)]
pub struct SqliteKvStore {
    database: Database,
}

impl SqliteKvStore {
    /// Wrap an initialized database.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get_item(&self, key: &str) -> ScResult<Option<String>> {
        let conn = self.database.conn()?;
        match conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            [key],
            |row| row.get::<_, String>(0),
        ) {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(ScError::Database(e.to_string())),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> ScResult<()> {
        let conn = self.database.conn()?;
        let now = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )
        .map_err(|e| ScError::Database(e.to_string()))?;
        debug!("kv_store: wrote {} bytes to {key}", value.len());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ScResult<bool> {
        let conn = self.database.conn()?;
        let changed = conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .map_err(|e| ScError::Database(e.to_string()))?;
        Ok(changed > 0)
    }

    fn keys(&self) -> ScResult<Vec<String>> {
        let conn = self.database.conn()?;
        let mut stmt = conn
            .prepare("SELECT key FROM kv_store ORDER BY key")
            .map_err(|e| ScError::Database(e.to_string()))?;

        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| ScError::Database(e.to_string()))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ScError::Database(e.to_string()))?;

        Ok(keys)
    }
}

/// In-process key-value store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> ScResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ScError::Storage("memory store lock poisoned".into()))
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get_item(&self, key: &str) -> ScResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> ScResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ScResult<bool> {
        Ok(self.lock()?.remove(key).is_some())
    }

    fn keys(&self) -> ScResult<Vec<String>> {
        let mut keys: Vec<String> = self.lock()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sc_core::config::StorageConfig;
    use tempfile::TempDir;

    fn sqlite_store() -> (SqliteKvStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = Database::init(&dir.path().join("kv.db"), &StorageConfig::default()).unwrap();
        (SqliteKvStore::new(db), dir)
    }

    fn exercise(store: &dyn KeyValueStore) {
        assert_eq!(store.get_item("missing").unwrap(), None);

        store.set_item("b", "1").unwrap();
        store.set_item("a", "2").unwrap();
        store.set_item("b", "3").unwrap();

        assert_eq!(store.get_item("b").unwrap().as_deref(), Some("3"));
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        assert!(store.remove_item("a").unwrap());
        assert!(!store.remove_item("a").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["b".to_string()]);
    }

    #[test]
    fn test_sqlite_store() {
        let (store, _dir) = sqlite_store();
        exercise(&store);
        assert_eq!(store.database().entry_count().unwrap(), 1);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryKvStore::new());
    }

    #[test]
    fn test_sqlite_overwrite_is_single_row() {
        let (store, _dir) = sqlite_store();
        for i in 0..5 {
            store.set_item("ledger", &format!("[{i}]")).unwrap();
        }
        assert_eq!(store.database().entry_count().unwrap(), 1);
        assert_eq!(store.get_item("ledger").unwrap().as_deref(), Some("[4]"));
    }
}
