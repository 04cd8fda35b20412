//! In-memory event store with write-through persistence.
//!
//! # Responsibility
//! - Hold the ordered event collection for the session.
//! - Be the only writer of persisted event state.
//!
//! # Invariants
//! - Ids are unique and strictly increasing in assignment order.
//! - Every applied mutation is followed by a full-collection save.
//! - A failed save keeps the in-memory change; the failure is returned and
//!   remembered until a later save succeeds.
//! - Update/remove of an unknown id is a no-op returning `Ok(false)` and
//!   performs no write.

use crate::model::event::{EventFields, EventId, EventRecord};
use crate::repo::event_repo::EventRepository;
use crate::repo::RepoError;
use chrono::Utc;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Error returned by store mutations.
#[derive(Debug)]
pub enum StoreError {
    /// The mutation was applied in memory but could not be persisted.
    Persist(RepoError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persist(err) => write!(f, "change kept in memory but not saved: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persist(err) => Some(err),
        }
    }
}

/// Event collection owner.
pub struct EventStore<R: EventRepository> {
    repo: R,
    events: Vec<EventRecord>,
    last_persist_error: Option<String>,
}

impl<R: EventRepository> EventStore<R> {
    /// Creates a store seeded from `repo.load()`.
    pub fn open(repo: R) -> Self {
        let events = repo.load();
        info!(
            "event=store_open module=service status=ok count={}",
            events.len()
        );
        Self {
            repo,
            events,
            last_persist_error: None,
        }
    }

    /// Current collection in insertion order.
    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.events.iter().find(|event| event.id == id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Message of the latest failed save, cleared by the next successful one.
    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    /// Borrows the persistence adapter.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Appends a new event with a freshly assigned id.
    ///
    /// On `Err`, the event is still present in memory; the id can be
    /// recovered by re-reading `events()`.
    pub fn add(&mut self, fields: EventFields) -> StoreResult<EventId> {
        let id = next_event_id(&self.events, Utc::now().timestamp_millis());
        self.events.push(EventRecord::from_fields(id, fields));
        debug!("event=store_add module=service status=ok id={id}");
        self.persist()?;
        Ok(id)
    }

    /// Replaces title, category and date of the event with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no such event exists.
    pub fn update(&mut self, id: EventId, fields: EventFields) -> StoreResult<bool> {
        let Some(event) = self.events.iter_mut().find(|event| event.id == id) else {
            debug!("event=store_update module=service status=noop id={id}");
            return Ok(false);
        };
        event.apply(fields);
        debug!("event=store_update module=service status=ok id={id}");
        self.persist()?;
        Ok(true)
    }

    /// Removes the event with `id`.
    ///
    /// Returns `Ok(false)` without touching storage when no such event exists.
    pub fn remove(&mut self, id: EventId) -> StoreResult<bool> {
        let before = self.events.len();
        self.events.retain(|event| event.id != id);
        if self.events.len() == before {
            debug!("event=store_remove module=service status=noop id={id}");
            return Ok(false);
        }
        debug!("event=store_remove module=service status=ok id={id}");
        self.persist()?;
        Ok(true)
    }

    /// Saves the current collection again after an earlier failure.
    pub fn retry_persist(&mut self) -> StoreResult<()> {
        self.persist()
    }

    fn persist(&mut self) -> StoreResult<()> {
        match self.repo.save(&self.events) {
            Ok(()) => {
                self.last_persist_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(
                    "event=store_persist module=service status=error count={} error={}",
                    self.events.len(),
                    err
                );
                self.last_persist_error = Some(err.to_string());
                Err(StoreError::Persist(err))
            }
        }
    }
}

/// Picks the id for a new event created at `now_ms`.
///
/// Uses the creation timestamp unless that would not exceed every existing
/// id, in which case the next integer after the current maximum is used.
/// When the maximum is `i64::MAX`, the first unused id from `now_ms` upward
/// (wrapping once) is taken instead.
pub fn next_event_id(existing: &[EventRecord], now_ms: i64) -> EventId {
    let max_id = match existing.iter().map(|event| event.id).max() {
        Some(max_id) if max_id >= now_ms => max_id,
        _ => return now_ms,
    };
    if let Some(next) = max_id.checked_add(1) {
        return next;
    }

    let taken: HashSet<EventId> = existing.iter().map(|event| event.id).collect();
    (now_ms..=EventId::MAX)
        .chain(EventId::MIN..now_ms)
        .find(|id| !taken.contains(id))
        .unwrap_or(now_ms)
}
