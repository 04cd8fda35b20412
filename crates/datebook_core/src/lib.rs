//! Core logic for the Datebook calendar.
//! This crate owns event state, persistence and view derivation; UI shells
//! only raise intents and render snapshots.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod shell;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status, LogLevel};
pub use model::event::{Category, EventFields, EventId, EventRecord, EventValidationError};
pub use repo::event_repo::{EventRepository, KvEventRepository, EVENTS_STORAGE_KEY};
pub use repo::kv_repo::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
pub use repo::{RepoError, RepoResult};
pub use service::event_store::{EventStore, StoreError, StoreResult};
pub use service::form::{
    validate, EventDraft, FormController, FormField, SubmitOutcome, ValidationErrors,
};
pub use shell::{CalendarShell, ModalState, ShellView};
pub use view::{
    filter_by_category, is_past_date, list_view, local_today, paginate, total_pages,
    CategoryFilter, ListView, DEFAULT_PAGE_SIZE,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
