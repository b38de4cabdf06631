//! Note and note collection model.
//!
//! # Responsibility
//! - Keep the `title -> content` mapping with stable insertion order.
//! - Serialize the whole collection as a flat JSON object.
//!
//! # Invariants
//! - Titles are non-empty after trimming and unique inside one collection.
//! - Titles are stored exactly as typed; only the emptiness check trims.
//! - Decoding a blob drops blank-titled entries and keeps every other note.

use log::warn;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One note: a unique title and its plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub title: String,
    pub content: String,
}

impl Note {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Title rule violations surfaced to the user as a blocking notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    DuplicateTitle(String),
}

impl NoteValidationError {
    /// Heading of the blocking notice shown for every validation failure.
    pub const NOTICE_TITLE: &'static str = "Error";

    /// User-facing notice body.
    pub fn notice_message(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "Please enter a note title",
            Self::DuplicateTitle(_) => "Note with this title already exists",
        }
    }
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "empty title"),
            Self::DuplicateTitle(_) => write!(f, "duplicate title"),
        }
    }
}

impl Error for NoteValidationError {}

/// Rejects titles that are empty or whitespace-only.
pub fn validate_title(title: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    Ok(())
}

/// Full note set, keyed by title.
///
/// Backed by a vector so list order follows insertion order; lookups are
/// linear, which is fine for a hand-edited note list.
#[derive(Debug, Clone, Default)]
pub struct NoteCollection {
    notes: Vec<Note>,
}

impl NoteCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn contains(&self, title: &str) -> bool {
        self.position(title).is_some()
    }

    /// Returns the content stored under `title`.
    pub fn get(&self, title: &str) -> Option<&str> {
        self.position(title)
            .map(|index| self.notes[index].content.as_str())
    }

    /// Titles in display order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.notes.iter().map(|note| note.title.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Note> {
        self.notes.iter()
    }

    /// Appends a new note after validating its title.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is blank.
    /// - `DuplicateTitle` when `title` already exists (content is not
    ///   consulted, so an existing note with empty content still counts).
    pub fn insert_new(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<(), NoteValidationError> {
        let title = title.into();
        validate_title(&title)?;
        if self.contains(&title) {
            return Err(NoteValidationError::DuplicateTitle(title));
        }
        self.notes.push(Note::new(title, content));
        Ok(())
    }

    /// Replaces the content of an existing note, returning the previous body.
    ///
    /// Returns `None` and leaves the collection untouched when `title` is absent.
    pub fn replace_content(&mut self, title: &str, content: impl Into<String>) -> Option<String> {
        let index = self.position(title)?;
        Some(std::mem::replace(
            &mut self.notes[index].content,
            content.into(),
        ))
    }

    /// Removes one note, keeping the relative order of the rest.
    pub fn remove(&mut self, title: &str) -> Option<Note> {
        let index = self.position(title)?;
        Some(self.notes.remove(index))
    }

    fn position(&self, title: &str) -> Option<usize> {
        self.notes.iter().position(|note| note.title == title)
    }

    // Map semantics for decoding: a repeated key keeps its first position and
    // takes the last value.
    fn upsert(&mut self, title: String, content: String) {
        match self.position(&title) {
            Some(index) => self.notes[index].content = content,
            None => self.notes.push(Note { title, content }),
        }
    }
}

/// Equality is key-for-key and value-for-value; order does not matter.
impl PartialEq for NoteCollection {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .notes
                .iter()
                .all(|note| other.get(&note.title) == Some(note.content.as_str()))
    }
}

impl Eq for NoteCollection {}

impl<'a> IntoIterator for &'a NoteCollection {
    type Item = &'a Note;
    type IntoIter = std::slice::Iter<'a, Note>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for NoteCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.notes.len()))?;
        for note in &self.notes {
            map.serialize_entry(&note.title, &note.content)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NoteCollection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(NoteCollectionVisitor)
    }
}

struct NoteCollectionVisitor;

impl<'de> Visitor<'de> for NoteCollectionVisitor {
    type Value = NoteCollection;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a map of note titles to note contents")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut collection = NoteCollection {
            notes: Vec::with_capacity(access.size_hint().unwrap_or(0)),
        };
        let mut skipped = 0usize;
        while let Some((title, content)) = access.next_entry::<String, String>()? {
            if validate_title(&title).is_err() {
                skipped += 1;
                continue;
            }
            collection.upsert(title, content);
        }
        if skipped > 0 {
            warn!("event=notes_decode module=model status=partial skipped_blank_titles={skipped}");
        }
        Ok(collection)
    }
}
