use datebook_core::db::{open_db, open_db_in_memory, schema_version, KV_SCHEMA_VERSION};
use datebook_core::{KeyValueStore, RepoError, SqliteKeyValueStore};
use rusqlite::Connection;

fn updated_at(conn: &Connection, key: &str) -> i64 {
    conn.query_row(
        "SELECT updated_at FROM kv_entries WHERE key = ?1;",
        [key],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn fresh_database_gets_kv_schema_with_updated_at_default() {
    let conn = open_db_in_memory().unwrap();
    assert_eq!(schema_version(&conn).unwrap(), KV_SCHEMA_VERSION);

    conn.execute(
        "INSERT INTO kv_entries (key, value) VALUES ('events', '[]');",
        [],
    )
    .unwrap();
    assert!(updated_at(&conn, "events") > 1_600_000_000_000);
}

#[test]
fn put_upserts_one_row_per_key_and_refreshes_updated_at() {
    let mut store = SqliteKeyValueStore::open_in_memory().unwrap();
    store.put("events", "[]").unwrap();
    store
        .connection()
        .execute("UPDATE kv_entries SET updated_at = 0 WHERE key = 'events';", [])
        .unwrap();

    store.put("events", "[1]").unwrap();
    store.put("other", "x").unwrap();

    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 2);
    assert_eq!(store.get("events").unwrap().as_deref(), Some("[1]"));
    assert!(updated_at(store.connection(), "events") > 0);
}

#[test]
fn reopening_file_keeps_stored_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datebook.db");

    let mut first = SqliteKeyValueStore::open(&path).unwrap();
    first.put("events", "[]").unwrap();
    drop(first);

    let second = SqliteKeyValueStore::open(&path).unwrap();
    assert_eq!(schema_version(second.connection()).unwrap(), KV_SCHEMA_VERSION);
    assert_eq!(second.get("events").unwrap().as_deref(), Some("[]"));
}

#[test]
fn newer_schema_version_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        RepoError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, KV_SCHEMA_VERSION);
        }
        other => panic!("unexpected error: {other}"),
    }
}
