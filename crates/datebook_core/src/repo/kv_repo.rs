//! Key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Provide the browser-storage-like `get`/`put` surface used by event
//!   persistence.
//! - Keep SQL details inside the core persistence boundary.

use super::{RepoError, RepoResult};
use crate::db::{open_db, open_db_in_memory};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

/// Minimal string key-value store.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` when absent.
    fn get(&self, key: &str) -> RepoResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn put(&mut self, key: &str, value: &str) -> RepoResult<()>;
}

/// SQLite-backed key-value store owning its connection.
pub struct SqliteKeyValueStore {
    conn: Connection,
}

impl SqliteKeyValueStore {
    /// Wraps a connection that already went through `open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    /// Opens a private in-memory database and wraps it.
    pub fn open_in_memory() -> RepoResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    /// Borrows the underlying connection, mainly for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

/// In-process key-value store.
///
/// Clones share the same entries, so a test can hand one clone to a store
/// and inspect or reload through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following `put` fail until switched off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    /// Returns the raw stored value, bypassing failure simulation.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.state.borrow().entries.get(key).cloned()
    }

    /// Seeds a raw value, bypassing failure simulation.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.state
            .borrow_mut()
            .entries
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.raw(key))
    }

    fn put(&mut self, key: &str, value: &str) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(RepoError::Unavailable(format!(
                "write to `{key}` rejected: quota exceeded"
            )));
        }
        state.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
    use crate::repo::RepoError;

    #[test]
    fn sqlite_store_returns_none_for_missing_key_and_overwrites() {
        let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
        assert_eq!(store.get("events").unwrap(), None);

        store.put("events", "[]").unwrap();
        store.put("events", "[1]").unwrap();
        assert_eq!(store.get("events").unwrap().as_deref(), Some("[1]"));

        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn memory_store_clones_share_entries_and_simulate_failures() {
        let mut store = MemoryKeyValueStore::new();
        let observer = store.clone();

        store.put("k", "v").unwrap();
        assert_eq!(observer.raw("k").as_deref(), Some("v"));

        observer.set_fail_writes(true);
        let err = store.put("k", "w").unwrap_err();
        assert!(matches!(err, RepoError::Unavailable(_)));
        assert_eq!(observer.raw("k").as_deref(), Some("v"));
    }
}
