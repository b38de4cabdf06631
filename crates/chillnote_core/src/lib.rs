//! Core logic for Chill Notes.
//! This crate owns the note collection, its persistence and the editor state
//! machine; UI shells only render `ScreenView` and forward user actions.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{Note, NoteCollection, NoteValidationError};
pub use repo::kv_repo::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use repo::notes_blob::{
    load_collection, persist_collection, LoadError, PersistError, NOTES_STORAGE_KEY,
};
pub use service::editor::{
    reduce, EditorEvent, EditorMode, EditorState, PrimaryAction, TransitionError,
};
pub use service::note_store::{NoteStore, NoteStoreError};
pub use service::session::{
    DeleteConfirmation, NoteListItem, NotesSession, ScreenView, SessionError, SubmitOutcome,
};

/// Minimal health-check API for shell integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
