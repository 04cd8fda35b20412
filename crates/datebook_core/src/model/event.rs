//! Event domain model.
//!
//! # Responsibility
//! - Define the canonical record persisted for every calendar event.
//! - Provide validation used by both write and read paths.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reused.
//! - `title` is never empty or whitespace-only for a valid record.
//! - `date` is a calendar day with no time component.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for an event.
///
/// Assigned from the creation timestamp in epoch milliseconds, bumped when
/// needed to stay strictly increasing within one collection.
pub type EventId = i64;

/// Fixed set of event categories offered by the form and filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Others,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 3] = [Category::Work, Category::Personal, Category::Others];

    /// Stable string used in storage and UI option values.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "Work",
            Self::Personal => "Personal",
            Self::Others => "Others",
        }
    }

    /// Parses an exact category label. Matching is case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Work" => Some(Self::Work),
            "Personal" => Some(Self::Personal),
            "Others" => Some(Self::Others),
            _ => None,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable fields of an event, used for both creation and edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
}

/// Canonical persisted event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub title: String,
    pub category: Category,
    /// Written as `YYYY-MM-DD`; full ISO-8601 timestamps are accepted on read.
    #[serde(deserialize_with = "deserialize_calendar_date")]
    pub date: NaiveDate,
}

/// Validation failures for persisted event records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventValidationError {
    EmptyTitle(EventId),
}

impl Display for EventValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle(id) => write!(f, "event {id} has an empty title"),
        }
    }
}

impl Error for EventValidationError {}

impl EventRecord {
    /// Builds a record from validated fields and an already assigned id.
    pub fn from_fields(id: EventId, fields: EventFields) -> Self {
        Self {
            id,
            title: fields.title,
            category: fields.category,
            date: fields.date,
        }
    }

    /// Replaces title, category and date. `id` is left untouched.
    pub fn apply(&mut self, fields: EventFields) {
        self.title = fields.title;
        self.category = fields.category;
        self.date = fields.date;
    }

    /// Returns the editable fields of this record.
    pub fn fields(&self) -> EventFields {
        EventFields {
            title: self.title.clone(),
            category: self.category,
            date: self.date,
        }
    }

    /// Checks record-level invariants.
    ///
    /// Category and date are enforced by the type system.
    pub fn validate(&self) -> Result<(), EventValidationError> {
        if self.title.trim().is_empty() {
            return Err(EventValidationError::EmptyTitle(self.id));
        }
        Ok(())
    }
}

/// Parses a calendar date from `YYYY-MM-DD` or a longer ISO-8601 timestamp.
///
/// RFC 3339 timestamps with an offset (`2024-06-02T22:00:00.000Z`) name an
/// instant, typically local midnight serialized as UTC, and are mapped to
/// the local calendar day. Timestamps without an offset keep the day as
/// written.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(instant.with_timezone(&Local).date_naive());
    }
    let day = trimmed.get(..10)?;
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()?;
    match trimmed.as_bytes().get(10) {
        None | Some(b'T') | Some(b't') | Some(b' ') => Some(date),
        Some(_) => None,
    }
}

fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid calendar date `{raw}`")))
}
