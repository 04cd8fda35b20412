//! Flutter-facing bindings for the Datebook core.

pub mod api;
