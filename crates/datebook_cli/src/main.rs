//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `datebook_core` linkage without the Flutter shell.
//! - Print a first-page summary of a calendar database when given a path.

use datebook_core::{
    list_view, CategoryFilter, EventStore, KvEventRepository, SqliteKeyValueStore,
    DEFAULT_PAGE_SIZE,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("datebook_core ping={}", datebook_core::ping());
    println!("datebook_core version={}", datebook_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    let kv = match SqliteKeyValueStore::open(&db_path) {
        Ok(kv) => kv,
        Err(err) => {
            eprintln!("failed to open `{db_path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    let store = EventStore::open(KvEventRepository::new(kv));
    let view = list_view(store.events(), &CategoryFilter::All, 1, DEFAULT_PAGE_SIZE);

    println!("events={} pages={}", view.filtered_count, view.total_pages);
    for event in view.items {
        println!(
            "{} {} [{}] {}",
            event.id,
            event.date.format("%Y-%m-%d"),
            event.category,
            event.title
        );
    }
    ExitCode::SUCCESS
}
