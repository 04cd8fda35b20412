//! Form staging and validation for event drafts.
//!
//! # Responsibility
//! - Hold the draft edited by the add/edit form.
//! - Turn a draft into validated `EventFields`, or field-level messages.
//! - Commit through `EventStore` and clear staged state afterwards.
//!
//! # Invariants
//! - A draft with validation errors never reaches the store.
//! - `editing_id` is only set by `open_for_edit`.

use crate::model::event::{parse_calendar_date, Category, EventFields, EventId, EventRecord};
use crate::repo::event_repo::EventRepository;
use crate::service::event_store::{EventStore, StoreError};
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

pub const TITLE_REQUIRED: &str = "Title is required.";
pub const CATEGORY_REQUIRED: &str = "Category is required.";
pub const CATEGORY_UNKNOWN: &str = "Category must be Work, Personal or Others.";
pub const DATE_REQUIRED: &str = "Date is required.";

/// Form field keys used in validation results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Category,
    Date,
}

impl FormField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Category => "category",
            Self::Date => "date",
        }
    }
}

/// Field-to-message map; only failing fields are present.
pub type ValidationErrors = BTreeMap<FormField, &'static str>;

/// Raw form input, exactly as typed or selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDraft {
    pub title: String,
    /// Category label, empty when nothing is selected.
    pub category: String,
    /// `YYYY-MM-DD`, empty when cleared.
    pub date: String,
}

impl EventDraft {
    /// Blank draft dated on `date`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date: format_date(date),
            ..Self::default()
        }
    }

    /// Draft pre-populated from a stored record.
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            title: record.title.clone(),
            category: record.category.as_str().to_string(),
            date: format_date(record.date),
        }
    }
}

/// Validates a draft and returns messages for failing fields only.
pub fn validate(draft: &EventDraft) -> ValidationErrors {
    parse_draft(draft).err().unwrap_or_default()
}

/// Validates a draft and converts it into store-ready fields.
///
/// A whitespace-only title counts as empty; otherwise the title is kept as
/// typed. Category labels must match exactly.
pub fn parse_draft(draft: &EventDraft) -> Result<EventFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if draft.title.trim().is_empty() {
        errors.insert(FormField::Title, TITLE_REQUIRED);
    }

    let category = match draft.category.as_str() {
        "" => {
            errors.insert(FormField::Category, CATEGORY_REQUIRED);
            None
        }
        label => {
            let parsed = Category::parse(label);
            if parsed.is_none() {
                errors.insert(FormField::Category, CATEGORY_UNKNOWN);
            }
            parsed
        }
    };

    let date = parse_calendar_date(&draft.date);
    if date.is_none() {
        errors.insert(FormField::Date, DATE_REQUIRED);
    }

    match (category, date) {
        (Some(category), Some(date)) if errors.is_empty() => Ok(EventFields {
            title: draft.title.clone(),
            category,
            date,
        }),
        _ => Err(errors),
    }
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was written.
    Rejected(ValidationErrors),
    Added(EventId),
    /// `applied` is false when the edited event no longer exists.
    Updated { id: EventId, applied: bool },
}

/// Staged add/edit form state.
#[derive(Debug, Clone, Default)]
pub struct FormController {
    draft: EventDraft,
    editing_id: Option<EventId>,
    errors: ValidationErrors,
}

impl FormController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets the form for a new event on `selected_date`.
    pub fn open_for_add(&mut self, selected_date: NaiveDate) {
        self.draft = EventDraft::for_date(selected_date);
        self.editing_id = None;
        self.errors.clear();
    }

    /// Loads an existing event for editing.
    pub fn open_for_edit(&mut self, record: &EventRecord) {
        self.draft = EventDraft::from_record(record);
        self.editing_id = Some(record.id);
        self.errors.clear();
    }

    pub fn draft(&self) -> &EventDraft {
        &self.draft
    }

    pub fn editing_id(&self) -> Option<EventId> {
        self.editing_id
    }

    /// Errors from the last rejected submission.
    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.draft.category = category.into();
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.draft.date = date.into();
    }

    /// Clears draft, editing id and errors.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Validates the staged draft and commits it to `store`.
    ///
    /// Staged state is cleared once the store has applied the change, even
    /// if persisting it failed.
    pub fn submit<R: EventRepository>(
        &mut self,
        store: &mut EventStore<R>,
    ) -> Result<SubmitOutcome, StoreError> {
        let fields = match parse_draft(&self.draft) {
            Ok(fields) => fields,
            Err(errors) => {
                debug!(
                    "event=form_submit module=service status=rejected fields={}",
                    errors
                        .keys()
                        .map(|field| field.as_str())
                        .collect::<Vec<_>>()
                        .join(",")
                );
                self.errors = errors.clone();
                return Ok(SubmitOutcome::Rejected(errors));
            }
        };

        let editing_id = self.editing_id;
        self.reset();
        match editing_id {
            Some(id) => {
                let applied = store.update(id, fields)?;
                Ok(SubmitOutcome::Updated { id, applied })
            }
            None => {
                let id = store.add(fields)?;
                Ok(SubmitOutcome::Added(id))
            }
        }
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
