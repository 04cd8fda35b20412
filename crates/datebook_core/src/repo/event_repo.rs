//! Event collection persistence over a key-value slot.
//!
//! # Responsibility
//! - Serialize the whole event collection as one JSON array.
//! - Reconstruct calendar dates on load.
//!
//! # Invariants
//! - The collection lives under `EVENTS_STORAGE_KEY` only.
//! - An absent key is an empty collection, not an error.
//! - Loaded collections have unique ids and valid records.

use super::kv_repo::KeyValueStore;
use super::{RepoError, RepoResult};
use crate::model::event::EventRecord;
use log::{error, info, warn};
use std::collections::HashSet;

/// Fixed key holding the serialized event collection.
pub const EVENTS_STORAGE_KEY: &str = "events";

/// Load/save contract for the full event collection.
pub trait EventRepository {
    /// Loads the stored collection, reporting every failure.
    fn try_load(&self) -> RepoResult<Vec<EventRecord>>;

    /// Replaces the stored collection.
    fn save(&mut self, events: &[EventRecord]) -> RepoResult<()>;

    /// Loads the stored collection, falling back to empty on failure.
    ///
    /// Failures are logged and otherwise dropped so startup always yields a
    /// renderable state.
    fn load(&self) -> Vec<EventRecord> {
        match self.try_load() {
            Ok(events) => events,
            Err(err) => {
                warn!(
                    "event=events_load module=repo status=error fallback=empty error={}",
                    err
                );
                Vec::new()
            }
        }
    }
}

/// `EventRepository` writing JSON into a `KeyValueStore`.
pub struct KvEventRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvEventRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the backing store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: KeyValueStore> EventRepository for KvEventRepository<S> {
    fn try_load(&self) -> RepoResult<Vec<EventRecord>> {
        let Some(raw) = self.store.get(EVENTS_STORAGE_KEY)? else {
            info!("event=events_load module=repo status=ok count=0 source=absent");
            return Ok(Vec::new());
        };

        let events = decode_events(&raw)?;
        info!(
            "event=events_load module=repo status=ok count={}",
            events.len()
        );
        Ok(events)
    }

    fn save(&mut self, events: &[EventRecord]) -> RepoResult<()> {
        let encoded = serde_json::to_string(events)?;
        match self.store.put(EVENTS_STORAGE_KEY, &encoded) {
            Ok(()) => {
                info!(
                    "event=events_save module=repo status=ok count={} bytes={}",
                    events.len(),
                    encoded.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=events_save module=repo status=error count={} error={}",
                    events.len(),
                    err
                );
                Err(err)
            }
        }
    }
}

/// Decodes and checks a serialized event collection.
pub fn decode_events(raw: &str) -> RepoResult<Vec<EventRecord>> {
    let events: Vec<EventRecord> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(events.len());
    for event in &events {
        event.validate()?;
        if !seen.insert(event.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate event id {}",
                event.id
            )));
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::{decode_events, EventRepository, KvEventRepository, EVENTS_STORAGE_KEY};
    use crate::model::event::{Category, EventRecord};
    use crate::repo::kv_repo::MemoryKeyValueStore;
    use crate::repo::RepoError;
    use chrono::{Local, NaiveDate, TimeZone, Utc};

    fn record(id: i64, title: &str) -> EventRecord {
        EventRecord {
            id,
            title: title.to_string(),
            category: Category::Work,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        }
    }

    #[test]
    fn save_writes_expected_wire_shape() {
        let kv = MemoryKeyValueStore::new();
        let mut repo = KvEventRepository::new(kv.clone());
        repo.save(&[record(7, "Standup")]).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&kv.raw(EVENTS_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"id": 7, "title": "Standup", "category": "Work", "date": "2024-06-03"}
            ])
        );
    }

    #[test]
    fn decode_accepts_timestamp_dates_written_by_browser_storage() {
        let raw = r#"[{"id":1717372800000,"title":"Standup","category":"Work","date":"2024-06-02T22:00:00.000Z"}]"#;
        let events = decode_events(raw).unwrap();
        let expected = Utc
            .with_ymd_and_hms(2024, 6, 2, 22, 0, 0)
            .unwrap()
            .with_timezone(&Local)
            .date_naive();
        assert_eq!(events[0].date, expected);
    }

    #[test]
    fn decode_rejects_duplicate_ids_and_empty_titles() {
        let duplicate = r#"[
            {"id":1,"title":"a","category":"Work","date":"2024-06-03"},
            {"id":1,"title":"b","category":"Work","date":"2024-06-04"}
        ]"#;
        assert!(matches!(
            decode_events(duplicate).unwrap_err(),
            RepoError::InvalidData(_)
        ));

        let blank = r#"[{"id":1,"title":"  ","category":"Work","date":"2024-06-03"}]"#;
        assert!(matches!(
            decode_events(blank).unwrap_err(),
            RepoError::Validation(_)
        ));
    }

    #[test]
    fn load_falls_back_to_empty_on_corrupt_state() {
        let kv = MemoryKeyValueStore::new();
        kv.insert_raw(EVENTS_STORAGE_KEY, "{not json");
        let repo = KvEventRepository::new(kv);

        assert!(repo.try_load().is_err());
        assert!(repo.load().is_empty());
    }
}
