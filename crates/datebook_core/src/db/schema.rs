//! `kv_entries` schema for the key-value slot.
//!
//! One row per key; writes upsert and refresh `updated_at` (epoch ms).

use crate::repo::{RepoError, RepoResult};
use log::info;
use rusqlite::Connection;

/// Schema version written to `PRAGMA user_version`.
pub const KV_SCHEMA_VERSION: u32 = 1;

const KV_SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS kv_entries (
    key TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL,
    updated_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
);";

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> RepoResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Creates `kv_entries` on a fresh database and stamps the version.
///
/// Already current databases are left untouched.
pub(crate) fn ensure_kv_schema(conn: &mut Connection) -> RepoResult<()> {
    let found = schema_version(conn)?;
    if found > KV_SCHEMA_VERSION {
        return Err(RepoError::UnsupportedSchemaVersion {
            db_version: found,
            latest_supported: KV_SCHEMA_VERSION,
        });
    }
    if found == KV_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    tx.execute_batch(KV_SCHEMA_SQL)?;
    tx.pragma_update(None, "user_version", KV_SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=kv_schema module=db status=ok from_version={} to_version={}",
        found, KV_SCHEMA_VERSION
    );
    Ok(())
}
