//! Whole-collection blob codec over a `KeyValueStore`.
//!
//! # Responsibility
//! - Read the note collection stored under `NOTES_STORAGE_KEY`.
//! - Write the full collection back as one JSON object.
//!
//! # Invariants
//! - A missing blob decodes to an empty collection.
//! - Writes are last-writer-wins; no version or merge check happens.

use crate::model::note::NoteCollection;
use crate::repo::kv_repo::{KeyValueStore, StorageError};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed key the note collection lives under.
pub const NOTES_STORAGE_KEY: &str = "@my_notes";

/// Failure to read or decode the persisted collection.
#[derive(Debug)]
pub enum LoadError {
    Storage(StorageError),
    Malformed(serde_json::Error),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "failed to read notes: {err}"),
            Self::Malformed(err) => write!(f, "stored notes blob is malformed: {err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Malformed(err) => Some(err),
        }
    }
}

impl From<StorageError> for LoadError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Failure to encode or write the collection.
#[derive(Debug)]
pub enum PersistError {
    Encode(serde_json::Error),
    Storage(StorageError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode notes: {err}"),
            Self::Storage(err) => write!(f, "failed to write notes: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StorageError> for PersistError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Reads and decodes the stored collection.
pub fn load_collection(store: &impl KeyValueStore) -> Result<NoteCollection, LoadError> {
    match store.get(NOTES_STORAGE_KEY)? {
        Some(blob) => serde_json::from_str(&blob).map_err(LoadError::Malformed),
        None => Ok(NoteCollection::new()),
    }
}

/// Encodes `notes` and overwrites the stored blob with it.
///
/// Returns the number of bytes written.
pub fn persist_collection(
    store: &impl KeyValueStore,
    notes: &NoteCollection,
) -> Result<usize, PersistError> {
    let blob = serde_json::to_string(notes).map_err(PersistError::Encode)?;
    store.set(NOTES_STORAGE_KEY, &blob)?;
    Ok(blob.len())
}
