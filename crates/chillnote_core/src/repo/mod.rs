//! Persistence collaborator contracts and implementations.
//!
//! # Responsibility
//! - Define the key-value store seam the note store writes through.
//! - Encode/decode the whole note collection as one blob under a fixed key.
//!
//! # Invariants
//! - Every write replaces the full blob; there are no partial updates.
//! - Decoding never masks a malformed blob as an empty collection.

pub mod kv_repo;
pub mod notes_blob;
