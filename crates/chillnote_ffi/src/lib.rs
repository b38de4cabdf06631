//! Flutter-facing bindings for Chill Notes core.

pub mod api;
