//! Toolkit-agnostic presentation state for the calendar screen.
//!
//! # Responsibility
//! - Turn user intents (pick date, add, edit, delete, filter, page) into
//!   form and store calls.
//! - Produce a render snapshot after every intent.
//!
//! # Invariants
//! - At most one of the form modal and the details modal is open.
//! - `current_page` never points past the last page after a mutation.
//! - Past dates cannot be picked; stored past events stay editable.

use crate::model::event::{EventId, EventRecord};
use crate::repo::event_repo::EventRepository;
use crate::service::event_store::{EventStore, StoreResult};
use crate::service::form::{EventDraft, FormController, SubmitOutcome, ValidationErrors};
use crate::view::{
    self, filter_by_category, is_past_date, list_view, CategoryFilter, ListView, DEFAULT_PAGE_SIZE,
};
use chrono::NaiveDate;
use log::{debug, warn};

/// Add/edit form modal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalState {
    Closed,
    OpenForAdd,
    OpenForEdit(EventId),
}

/// Render snapshot of the calendar screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellView<'a> {
    pub selected_date: NaiveDate,
    pub list: ListView<'a>,
    /// Page buttons to render, `1..=total_pages`.
    pub page_numbers: Vec<usize>,
    pub filter_label: &'a str,
    pub modal: ModalState,
    pub draft: &'a EventDraft,
    pub errors: &'a ValidationErrors,
    pub details: Option<&'a EventRecord>,
    /// Set while the latest save failed; the UI should offer a retry.
    pub persist_warning: Option<&'a str>,
}

/// Calendar screen state driven by user intents.
pub struct CalendarShell<R: EventRepository> {
    store: EventStore<R>,
    form: FormController,
    selected_date: NaiveDate,
    modal: ModalState,
    details: Option<EventId>,
    filter: CategoryFilter,
    current_page: usize,
    page_size: usize,
}

impl<R: EventRepository> CalendarShell<R> {
    /// Creates a shell over `store` with `today` preselected.
    pub fn new(store: EventStore<R>, today: NaiveDate) -> Self {
        Self::with_page_size(store, today, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: EventStore<R>, today: NaiveDate, page_size: usize) -> Self {
        Self {
            store,
            form: FormController::new(),
            selected_date: today,
            modal: ModalState::Closed,
            details: None,
            filter: CategoryFilter::All,
            current_page: 1,
            page_size,
        }
    }

    pub fn store(&self) -> &EventStore<R> {
        &self.store
    }

    pub fn form(&self) -> &FormController {
        &self.form
    }

    pub fn modal(&self) -> ModalState {
        self.modal
    }

    pub fn details_id(&self) -> Option<EventId> {
        self.details
    }

    pub fn filter(&self) -> &CategoryFilter {
        &self.filter
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    /// Picks a calendar day.
    ///
    /// Returns `false` and changes nothing for past days. Otherwise selects
    /// the day and opens the add form when no form is open yet.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> bool {
        if is_past_date(date, today) {
            debug!("event=shell_select_date module=shell status=rejected reason=past_date");
            return false;
        }
        self.selected_date = date;
        if self.modal == ModalState::Closed {
            self.open_add();
        }
        true
    }

    /// Opens a blank form dated on the selected day.
    pub fn open_add(&mut self) {
        self.form.open_for_add(self.selected_date);
        self.modal = ModalState::OpenForAdd;
        self.details = None;
    }

    /// Opens the form pre-filled with event `id`. Returns `false` if unknown.
    ///
    /// Bypasses the past-date check so old events stay editable.
    pub fn open_edit(&mut self, id: EventId) -> bool {
        let Some(record) = self.store.get(id) else {
            return false;
        };
        self.form.open_for_edit(record);
        self.modal = ModalState::OpenForEdit(id);
        self.details = None;
        true
    }

    pub fn edit_title(&mut self, title: impl Into<String>) {
        self.form.set_title(title);
    }

    pub fn edit_category(&mut self, category: impl Into<String>) {
        self.form.set_category(category);
    }

    pub fn edit_date(&mut self, date: impl Into<String>) {
        self.form.set_date(date);
    }

    /// Closes the form and discards the draft.
    pub fn cancel(&mut self) {
        self.form.reset();
        self.modal = ModalState::Closed;
    }

    /// Submits the staged draft.
    ///
    /// A rejected draft keeps the form open with errors. Any commit closes
    /// the form, including one whose save failed.
    pub fn submit(&mut self) -> StoreResult<SubmitOutcome> {
        let result = self.form.submit(&mut self.store);
        if !matches!(result, Ok(SubmitOutcome::Rejected(_))) {
            self.modal = ModalState::Closed;
            self.clamp_page();
        }
        if let Err(err) = &result {
            warn!("event=shell_submit module=shell status=error error={err}");
        }
        result
    }

    /// Deletes event `id` immediately.
    ///
    /// Closes the form, and the details modal when it shows that event.
    pub fn delete(&mut self, id: EventId) -> StoreResult<bool> {
        let result = self.store.remove(id);
        self.form.reset();
        self.modal = ModalState::Closed;
        if self.details == Some(id) {
            self.details = None;
        }
        self.clamp_page();
        if let Err(err) = &result {
            warn!("event=shell_delete module=shell status=error error={err}");
        }
        result
    }

    /// Opens the read-only details modal. Returns `false` if unknown.
    pub fn show_details(&mut self, id: EventId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.form.reset();
        self.modal = ModalState::Closed;
        self.details = Some(id);
        true
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    /// Applies a filter label and returns to the first page.
    pub fn set_filter(&mut self, label: &str) {
        self.filter = CategoryFilter::parse(label);
        self.current_page = 1;
    }

    /// Moves to `page` if it exists. Returns `false` otherwise.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// Saves the collection again after a failed write.
    pub fn retry_persist(&mut self) -> StoreResult<()> {
        self.store.retry_persist()
    }

    /// Whether the picker should disable `date`.
    pub fn is_date_disabled(&self, date: NaiveDate, today: NaiveDate) -> bool {
        is_past_date(date, today)
    }

    /// Builds the render snapshot from current state.
    pub fn view(&self) -> ShellView<'_> {
        let list = list_view(
            self.store.events(),
            &self.filter,
            self.current_page,
            self.page_size,
        );
        let page_numbers = (1..=list.total_pages).collect();
        ShellView {
            selected_date: self.selected_date,
            list,
            page_numbers,
            filter_label: self.filter.label(),
            modal: self.modal,
            draft: self.form.draft(),
            errors: self.form.errors(),
            details: self.details.and_then(|id| self.store.get(id)),
            persist_warning: self.store.last_persist_error(),
        }
    }

    fn total_pages(&self) -> usize {
        let filtered = filter_by_category(self.store.events(), &self.filter);
        view::total_pages(filtered.len(), self.page_size)
    }

    fn clamp_page(&mut self) {
        let last = self.total_pages().max(1);
        if self.current_page > last {
            self.current_page = last;
        }
    }
}
