//! Domain model for calendar events.
//!
//! # Responsibility
//! - Define the canonical event record shared by store, views and UI shells.
//! - Keep category and identity rules in one place.
//!
//! # Invariants
//! - Every stored event is identified by a unique, immutable `EventId`.
//! - Category values are closed to the `Category` enum at validation time.

pub mod event;
