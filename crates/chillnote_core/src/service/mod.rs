//! Note screen use-cases.
//!
//! # Responsibility
//! - `note_store`: CRUD over the collection with write-through persistence.
//! - `editor`: selection/draft state machine as a pure reducer.
//! - `session`: screen actions combining both, plus the render projection.
//!
//! # Invariants
//! - Only `note_store` writes to the key-value store.
//! - Only `editor::reduce` changes editor state.

pub mod editor;
pub mod note_store;
pub mod session;
