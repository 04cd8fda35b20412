use chrono::NaiveDate;
use datebook_core::{
    Category, EventFields, EventRepository, EventStore, KvEventRepository, MemoryKeyValueStore,
    SqliteKeyValueStore, StoreError, EVENTS_STORAGE_KEY,
};
use std::collections::HashSet;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fields(title: &str, category: Category, day: NaiveDate) -> EventFields {
    EventFields {
        title: title.to_string(),
        category,
        date: day,
    }
}

fn memory_store() -> (
    EventStore<KvEventRepository<MemoryKeyValueStore>>,
    MemoryKeyValueStore,
) {
    let kv = MemoryKeyValueStore::new();
    let store = EventStore::open(KvEventRepository::new(kv.clone()));
    (store, kv)
}

fn reload(kv: &MemoryKeyValueStore) -> Vec<datebook_core::EventRecord> {
    KvEventRepository::new(kv.clone()).load()
}

#[test]
fn store_starts_empty_without_prior_state() {
    let (store, kv) = memory_store();
    assert!(store.is_empty());
    assert_eq!(kv.raw(EVENTS_STORAGE_KEY), None);
}

#[test]
fn add_assigns_unique_ids_and_persists_in_insertion_order() {
    let (mut store, kv) = memory_store();
    let mut ids = HashSet::new();
    for index in 0..20 {
        let id = store
            .add(fields(&format!("event {index}"), Category::Work, date(2024, 6, 3)))
            .unwrap();
        assert!(ids.insert(id), "duplicate id {id}");
    }

    let loaded = reload(&kv);
    assert_eq!(loaded.len(), 20);
    assert_eq!(loaded, store.events());
    assert!(loaded.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert_eq!(loaded[0].title, "event 0");
}

#[test]
fn update_patches_fields_and_keeps_id() {
    let (mut store, kv) = memory_store();
    let id = store
        .add(fields("Standup", Category::Work, date(2024, 6, 3)))
        .unwrap();

    let applied = store
        .update(id, fields("Lunch", Category::Personal, date(2024, 6, 4)))
        .unwrap();
    assert!(applied);

    let loaded = reload(&kv);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, id);
    assert_eq!(loaded[0].title, "Lunch");
    assert_eq!(loaded[0].category, Category::Personal);
    assert_eq!(loaded[0].date, date(2024, 6, 4));
}

#[test]
fn update_unknown_id_leaves_stored_bytes_unchanged() {
    let (mut store, kv) = memory_store();
    let id = store
        .add(fields("Standup", Category::Work, date(2024, 6, 3)))
        .unwrap();
    let before = kv.raw(EVENTS_STORAGE_KEY).unwrap();

    let applied = store
        .update(id + 1_000, fields("Other", Category::Others, date(2024, 7, 1)))
        .unwrap();
    assert!(!applied);
    assert_eq!(kv.raw(EVENTS_STORAGE_KEY).unwrap(), before);
    assert_eq!(store.get(id).unwrap().title, "Standup");
}

#[test]
fn remove_deletes_and_persists_and_ignores_unknown_ids() {
    let (mut store, kv) = memory_store();
    let keep = store
        .add(fields("Keep", Category::Work, date(2024, 6, 3)))
        .unwrap();
    let drop_id = store
        .add(fields("Drop", Category::Others, date(2024, 6, 5)))
        .unwrap();

    assert!(store.remove(drop_id).unwrap());
    assert!(!store.remove(drop_id).unwrap());

    let loaded = reload(&kv);
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, keep);
}

#[test]
fn failed_save_keeps_memory_state_and_is_reported_until_retry() {
    let (mut store, kv) = memory_store();
    kv.set_fail_writes(true);

    let err = store
        .add(fields("Standup", Category::Work, date(2024, 6, 3)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Persist(_)));
    assert_eq!(store.len(), 1);
    assert!(store.last_persist_error().is_some());
    assert!(reload(&kv).is_empty());

    kv.set_fail_writes(false);
    store.retry_persist().unwrap();
    assert!(store.last_persist_error().is_none());
    assert_eq!(reload(&kv).len(), 1);
}

#[test]
fn save_then_load_roundtrips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("datebook.db");

    let id = {
        let repo = KvEventRepository::new(SqliteKeyValueStore::open(&path).unwrap());
        let mut store = EventStore::open(repo);
        store
            .add(fields("Dentist", Category::Personal, date(2025, 1, 31)))
            .unwrap()
    };

    let repo = KvEventRepository::new(SqliteKeyValueStore::open(&path).unwrap());
    let store = EventStore::open(repo);
    let loaded = store.get(id).unwrap();
    assert_eq!(loaded.title, "Dentist");
    assert_eq!(loaded.category, Category::Personal);
    assert_eq!(loaded.date, date(2025, 1, 31));
}

#[test]
fn store_opens_empty_over_corrupt_state() {
    let kv = MemoryKeyValueStore::new();
    kv.insert_raw(EVENTS_STORAGE_KEY, r#"[{"id":1,"title":"x"}]"#);
    let store = EventStore::open(KvEventRepository::new(kv));
    assert!(store.is_empty());
}

#[test]
fn add_after_maximum_id_keeps_collection_loadable() {
    let kv = MemoryKeyValueStore::new();
    kv.insert_raw(
        EVENTS_STORAGE_KEY,
        r#"[{"id":9223372036854775807,"title":"Last","category":"Work","date":"2024-06-03"}]"#,
    );
    let mut store = EventStore::open(KvEventRepository::new(kv.clone()));

    let id = store
        .add(fields("Next", Category::Others, date(2024, 6, 4)))
        .unwrap();
    assert_ne!(id, i64::MAX);

    let loaded = reload(&kv);
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[1].id, id);
}
