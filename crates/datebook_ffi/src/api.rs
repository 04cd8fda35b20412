//! FFI use-case API for the calendar screen.
//!
//! # Responsibility
//! - Expose calendar intents to Dart via FRB as sync calls.
//! - Return one flat snapshot envelope after every intent.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - One process-wide calendar shell backs every call; it is opened lazily
//!   from the SQLite file at `DATEBOOK_DB_PATH` (or a temp-dir default).

use datebook_core::model::event::parse_calendar_date;
use datebook_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, local_today,
    ping as ping_inner, CalendarShell, Category, EventRecord, EventStore, KvEventRepository,
    ModalState, ShellView, SqliteKeyValueStore, SubmitOutcome,
};
use log::info;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

const CALENDAR_DB_FILE_NAME: &str = "datebook.sqlite3";
static CALENDAR_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type SqliteShell = CalendarShell<KvEventRepository<SqliteKeyValueStore>>;

static CALENDAR_SHELL: Mutex<Option<SqliteShell>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Returns an empty string on success and the error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One event row as rendered by the list and details modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEventItem {
    pub id: i64,
    pub title: String,
    pub category: String,
    /// `YYYY-MM-DD`.
    pub date: String,
}

/// Inline validation message for one form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarFieldError {
    /// `title|category|date`.
    pub field: String,
    pub message: String,
}

/// Full render state returned by every calendar call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSnapshot {
    /// Whether the requested intent succeeded.
    pub ok: bool,
    /// Human-readable outcome for diagnostics/UI.
    pub message: String,
    pub today: String,
    pub selected_date: String,
    pub filter: String,
    pub current_page: u32,
    pub page_numbers: Vec<u32>,
    pub items: Vec<CalendarEventItem>,
    /// `closed|add|edit`.
    pub modal: String,
    pub editing_id: Option<i64>,
    pub draft_title: String,
    pub draft_category: String,
    pub draft_date: String,
    pub errors: Vec<CalendarFieldError>,
    pub details: Option<CalendarEventItem>,
    /// Set while the latest save failed; UI should offer `calendar_retry_persist`.
    pub persist_warning: Option<String>,
}

/// Returns the current render state without changing it.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_snapshot() -> CalendarSnapshot {
    with_calendar(|_| Ok("Ready.".to_string()))
}

/// Category labels offered by the form select, in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_categories() -> Vec<String> {
    Category::ALL
        .iter()
        .map(|category| category.as_str().to_string())
        .collect()
}

/// Whether the picker should disable `date` (`YYYY-MM-DD`).
///
/// Unparseable input is reported as disabled.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_is_date_disabled(date: String) -> bool {
    match parse_calendar_date(&date) {
        Some(date) => datebook_core::is_past_date(date, local_today()),
        None => true,
    }
}

/// Picks a calendar day and opens the add form when none is open.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_select_date(date: String) -> CalendarSnapshot {
    with_calendar(|shell| {
        let parsed = parse_calendar_date(&date).ok_or_else(|| format!("invalid date `{date}`"))?;
        if shell.select_date(parsed, local_today()) {
            Ok("Date selected.".to_string())
        } else {
            Err("Past dates cannot be selected.".to_string())
        }
    })
}

/// Opens a blank add form on the selected day.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open_add() -> CalendarSnapshot {
    with_calendar(|shell| {
        shell.open_add();
        Ok("Add form opened.".to_string())
    })
}

/// Opens the edit form for event `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_open_edit(id: i64) -> CalendarSnapshot {
    with_calendar(|shell| {
        if shell.open_edit(id) {
            Ok("Edit form opened.".to_string())
        } else {
            Err(format!("event not found: {id}"))
        }
    })
}

/// Replaces the staged draft with the form's current field values.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_update_draft(title: String, category: String, date: String) -> CalendarSnapshot {
    with_calendar(|shell| {
        shell.edit_title(title);
        shell.edit_category(category);
        shell.edit_date(date);
        Ok("Draft updated.".to_string())
    })
}

/// Validates and commits the staged draft.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_submit() -> CalendarSnapshot {
    with_calendar(|shell| match shell.submit() {
        Ok(SubmitOutcome::Rejected(_)) => Err("Please fix the highlighted fields.".to_string()),
        Ok(SubmitOutcome::Added(_)) => Ok("Event added.".to_string()),
        Ok(SubmitOutcome::Updated { applied: true, .. }) => Ok("Event updated.".to_string()),
        Ok(SubmitOutcome::Updated { applied: false, id }) => {
            Err(format!("event not found: {id}"))
        }
        Err(err) => Err(err.to_string()),
    })
}

/// Closes the form without saving.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_cancel() -> CalendarSnapshot {
    with_calendar(|shell| {
        shell.cancel();
        Ok("Form closed.".to_string())
    })
}

/// Deletes event `id` immediately.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_delete(id: i64) -> CalendarSnapshot {
    with_calendar(|shell| match shell.delete(id) {
        Ok(true) => Ok("Event deleted.".to_string()),
        Ok(false) => Ok("Event already removed.".to_string()),
        Err(err) => Err(err.to_string()),
    })
}

/// Opens the read-only details modal for event `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_show_details(id: i64) -> CalendarSnapshot {
    with_calendar(|shell| {
        if shell.show_details(id) {
            Ok("Details opened.".to_string())
        } else {
            Err(format!("event not found: {id}"))
        }
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn calendar_close_details() -> CalendarSnapshot {
    with_calendar(|shell| {
        shell.close_details();
        Ok("Details closed.".to_string())
    })
}

/// Applies a category filter (`All|Work|Personal|Others`).
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_set_filter(label: String) -> CalendarSnapshot {
    with_calendar(|shell| {
        shell.set_filter(label.trim());
        Ok("Filter applied.".to_string())
    })
}

/// Moves the list to 1-based `page`.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_go_to_page(page: u32) -> CalendarSnapshot {
    with_calendar(|shell| {
        if shell.go_to_page(page as usize) {
            Ok(format!("Page {page}."))
        } else {
            Err(format!("page out of range: {page}"))
        }
    })
}

/// Saves the collection again after a failed write.
#[flutter_rust_bridge::frb(sync)]
pub fn calendar_retry_persist() -> CalendarSnapshot {
    with_calendar(|shell| {
        shell
            .retry_persist()
            .map(|()| "Events saved.".to_string())
            .map_err(|err| err.to_string())
    })
}

fn resolve_calendar_db_path() -> PathBuf {
    CALENDAR_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("DATEBOOK_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(CALENDAR_DB_FILE_NAME)
        })
        .clone()
}

fn open_calendar_shell() -> Result<SqliteShell, String> {
    let db_path = resolve_calendar_db_path();
    let kv = SqliteKeyValueStore::open(&db_path)
        .map_err(|err| format!("calendar DB open failed: {err}"))?;
    let store = EventStore::open(KvEventRepository::new(kv));
    info!(
        "event=calendar_open module=ffi status=ok count={}",
        store.len()
    );
    Ok(CalendarShell::new(store, local_today()))
}

fn with_calendar(
    intent: impl FnOnce(&mut SqliteShell) -> Result<String, String>,
) -> CalendarSnapshot {
    let mut guard = match CALENDAR_SHELL.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if guard.is_none() {
        match open_calendar_shell() {
            Ok(shell) => *guard = Some(shell),
            Err(err) => return CalendarSnapshot::unavailable(err),
        }
    }
    let Some(shell) = guard.as_mut() else {
        return CalendarSnapshot::unavailable("calendar unavailable".to_string());
    };

    let outcome = intent(shell);
    let (ok, message) = match outcome {
        Ok(message) => (true, message),
        Err(message) => (false, message),
    };
    CalendarSnapshot::from_view(ok, message, &shell.view(), shell.current_page())
}

impl CalendarSnapshot {
    fn from_view(ok: bool, message: String, view: &ShellView<'_>, current_page: usize) -> Self {
        let (modal, editing_id) = match view.modal {
            ModalState::Closed => ("closed", None),
            ModalState::OpenForAdd => ("add", None),
            ModalState::OpenForEdit(id) => ("edit", Some(id)),
        };
        Self {
            ok,
            message,
            today: format_date(local_today()),
            selected_date: format_date(view.selected_date),
            filter: view.filter_label.to_string(),
            current_page: to_u32(current_page),
            page_numbers: view.page_numbers.iter().copied().map(to_u32).collect(),
            items: view.list.items.iter().copied().map(to_event_item).collect(),
            modal: modal.to_string(),
            editing_id,
            draft_title: view.draft.title.clone(),
            draft_category: view.draft.category.clone(),
            draft_date: view.draft.date.clone(),
            errors: view
                .errors
                .iter()
                .map(|(field, message)| CalendarFieldError {
                    field: field.as_str().to_string(),
                    message: (*message).to_string(),
                })
                .collect(),
            details: view.details.map(to_event_item),
            persist_warning: view.persist_warning.map(str::to_string),
        }
    }

    fn unavailable(message: String) -> Self {
        Self {
            ok: false,
            message,
            today: format_date(local_today()),
            selected_date: format_date(local_today()),
            filter: datebook_core::view::FILTER_ALL.to_string(),
            current_page: 1,
            page_numbers: Vec::new(),
            items: Vec::new(),
            modal: "closed".to_string(),
            editing_id: None,
            draft_title: String::new(),
            draft_category: String::new(),
            draft_date: String::new(),
            errors: Vec::new(),
            details: None,
            persist_warning: None,
        }
    }
}

fn to_event_item(event: &EventRecord) -> CalendarEventItem {
    CalendarEventItem {
        id: event.id,
        title: event.title.clone(),
        category: event.category.as_str().to_string(),
        date: format_date(event.date),
    }
}

fn format_date(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
