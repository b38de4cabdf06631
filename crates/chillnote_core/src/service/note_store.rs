//! In-memory note collection mirrored to the key-value store.
//!
//! # Responsibility
//! - Own the loaded `NoteCollection` and every mutation of it.
//! - Rewrite the whole persisted blob after each successful mutation.
//!
//! # Invariants
//! - Validation failures never mutate the collection.
//! - Mutations are applied in memory before the write; a failed write leaves
//!   them applied and reports `NoteStoreError::Persist`.
//! - Diagnostics carry counts and sizes only, never titles or bodies.
//! - Load and write failures are returned, not logged; the caller that
//!   swallows them logs them.

use crate::model::note::{NoteCollection, NoteValidationError};
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::notes_blob::{load_collection, persist_collection, LoadError, PersistError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Mutation failures for note store operations.
#[derive(Debug)]
pub enum NoteStoreError {
    /// Title rule violated; nothing changed.
    Validation(NoteValidationError),
    /// Target note does not exist; nothing changed.
    NotFound(String),
    /// The in-memory change is applied but the blob write failed.
    Persist(PersistError),
}

impl NoteStoreError {
    /// Whether the in-memory collection reflects the attempted mutation.
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Persist(_))
    }
}

impl Display for NoteStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "note not found"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<NoteValidationError> for NoteStoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistError> for NoteStoreError {
    fn from(value: PersistError) -> Self {
        Self::Persist(value)
    }
}

/// Note collection plus the store it is persisted to.
pub struct NoteStore<S: KeyValueStore> {
    kv: S,
    notes: NoteCollection,
}

impl<S: KeyValueStore> NoteStore<S> {
    /// Creates an empty, not-yet-loaded store over `kv`.
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            notes: NoteCollection::new(),
        }
    }

    pub fn notes(&self) -> &NoteCollection {
        &self.notes
    }

    /// Replaces the in-memory collection with the persisted one.
    ///
    /// Returns the number of loaded notes. On error the current in-memory
    /// collection is kept as-is.
    pub fn load(&mut self) -> Result<usize, LoadError> {
        self.notes = load_collection(&self.kv)?;
        info!(
            "event=notes_load module=store status=ok count={}",
            self.notes.len()
        );
        Ok(self.notes.len())
    }

    /// Adds a new note and persists the collection.
    ///
    /// # Errors
    /// - `Validation` for a blank or already used title.
    /// - `Persist` when the note was added but the write failed.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), NoteStoreError> {
        if let Err(err) = self.notes.insert_new(title, content) {
            warn!("event=note_add module=store status=rejected reason=\"{err}\"");
            return Err(err.into());
        }
        self.write_through("note_add")
    }

    /// Replaces the content of an existing note and persists the collection.
    ///
    /// Titles are immutable here; there is no rename path.
    pub fn update(&mut self, title: &str, content: impl Into<String>) -> Result<(), NoteStoreError> {
        if self.notes.replace_content(title, content).is_none() {
            return Err(NoteStoreError::NotFound(title.to_string()));
        }
        self.write_through("note_update")
    }

    /// Removes a note and persists the collection.
    pub fn delete(&mut self, title: &str) -> Result<(), NoteStoreError> {
        if self.notes.remove(title).is_none() {
            return Err(NoteStoreError::NotFound(title.to_string()));
        }
        self.write_through("note_delete")
    }

    /// Writes the full in-memory collection to the store.
    pub fn persist(&self) -> Result<usize, PersistError> {
        persist_collection(&self.kv, &self.notes)
    }

    fn write_through(&self, event: &'static str) -> Result<(), NoteStoreError> {
        let bytes = self.persist()?;
        info!(
            "event={event} module=store status=ok count={} bytes={bytes}",
            self.notes.len()
        );
        Ok(())
    }
}
