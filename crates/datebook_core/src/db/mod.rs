//! SQLite connections backing the key-value slot.
//!
//! # Responsibility
//! - Open file or in-memory databases with the `kv_entries` schema in place.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Databases written by a newer schema are refused, never downgraded.

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory};
pub use schema::{schema_version, KV_SCHEMA_VERSION};
