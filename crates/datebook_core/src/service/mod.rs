//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory event collection and its write-through persistence.
//! - Stage and validate form drafts before they reach the store.

pub mod event_store;
pub mod form;
