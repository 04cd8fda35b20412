//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Abstract the local key-value slot behind `KeyValueStore`.
//! - Load and save the full event collection through `EventRepository`.
//!
//! # Invariants
//! - Writes always replace the whole collection under one fixed key.
//! - Read paths reject invalid persisted state instead of masking it; the
//!   lenient `load()` turns such failures into an empty collection.

pub mod event_repo;
pub mod kv_repo;

use crate::model::event::EventValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for key-value and event persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Sqlite(rusqlite::Error),
    /// Database was written by a newer schema than this build understands.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    Serialization(serde_json::Error),
    Validation(EventValidationError),
    InvalidData(String),
    /// Backing store refused the write (for example quota exceeded).
    Unavailable(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Serialization(err) => write!(f, "event serialization failed: {err}"),
            Self::Validation(err) => write!(f, "invalid persisted event: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted event data: {message}"),
            Self::Unavailable(message) => write!(f, "storage unavailable: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. }
            | Self::InvalidData(_)
            | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<EventValidationError> for RepoError {
    fn from(value: EventValidationError) -> Self {
        Self::Validation(value)
    }
}
