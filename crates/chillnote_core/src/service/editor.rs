//! Editor state and its reducer.
//!
//! # Responsibility
//! - Track the selected note, the two drafts and a pending delete request.
//! - Apply user/lifecycle events as pure `(state, event) -> state` transitions.
//!
//! # Invariants
//! - `selection = Some(t)` implies `t` exists in the collection passed to `reduce`.
//! - Right after `Select(t)`, `content_draft` equals the stored content of `t`.
//! - The title draft is read-only while a note is selected.
//! - `reduce` never touches storage; callers issue persistence themselves.

use crate::model::note::NoteCollection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which of the two screen modes the editor is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// No selection; the primary action adds a note.
    New,
    /// A stored note is loaded; the primary action saves its content.
    Editing,
}

/// Primary button behavior, derived from the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    Add,
    Save,
}

impl PrimaryAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "Add Note",
            Self::Save => "Save Changes",
        }
    }
}

/// Transient editing state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    selection: Option<String>,
    title_draft: String,
    content_draft: String,
    pending_delete: Option<String>,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn title_draft(&self) -> &str {
        &self.title_draft
    }

    pub fn content_draft(&self) -> &str {
        &self.content_draft
    }

    /// Title awaiting delete confirmation, if any.
    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn mode(&self) -> EditorMode {
        if self.selection.is_some() {
            EditorMode::Editing
        } else {
            EditorMode::New
        }
    }

    pub fn title_editable(&self) -> bool {
        self.mode() == EditorMode::New
    }

    pub fn primary_action(&self) -> PrimaryAction {
        match self.mode() {
            EditorMode::New => PrimaryAction::Add,
            EditorMode::Editing => PrimaryAction::Save,
        }
    }

    fn cleared(pending_delete: Option<String>) -> Self {
        Self {
            pending_delete,
            ..Self::default()
        }
    }
}

/// Inputs to the editor reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    Select(String),
    ClearSelection,
    EditTitleDraft(String),
    EditContentDraft(String),
    RequestDelete(String),
    CancelDelete,
    /// A note was added from the drafts.
    NoteAdded,
    /// A note was removed from the collection.
    NoteDeleted(String),
    /// The collection was replaced by a reload.
    NotesReloaded,
}

/// Rejected transitions. The state is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    UnknownNote(String),
    TitleLocked,
    /// Adding needs new-note mode.
    NoteSelected,
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNote(_) => write!(f, "note does not exist"),
            Self::TitleLocked => write!(f, "title of an existing note cannot be edited"),
            Self::NoteSelected => write!(f, "a note is selected; clear it before adding"),
        }
    }
}

impl Error for TransitionError {}

/// Computes the next editor state for `event`.
///
/// `notes` is the collection as it stands after any store mutation that
/// triggered the event.
pub fn reduce(
    state: &EditorState,
    event: EditorEvent,
    notes: &NoteCollection,
) -> Result<EditorState, TransitionError> {
    match event {
        EditorEvent::Select(title) => {
            let content = notes
                .get(&title)
                .ok_or_else(|| TransitionError::UnknownNote(title.clone()))?;
            Ok(EditorState {
                content_draft: content.to_string(),
                title_draft: title.clone(),
                selection: Some(title),
                pending_delete: state.pending_delete.clone(),
            })
        }
        EditorEvent::ClearSelection | EditorEvent::NoteAdded => {
            Ok(EditorState::cleared(state.pending_delete.clone()))
        }
        EditorEvent::EditTitleDraft(text) => {
            if !state.title_editable() {
                return Err(TransitionError::TitleLocked);
            }
            Ok(EditorState {
                title_draft: text,
                ..state.clone()
            })
        }
        EditorEvent::EditContentDraft(text) => Ok(EditorState {
            content_draft: text,
            ..state.clone()
        }),
        EditorEvent::RequestDelete(title) => {
            if !notes.contains(&title) {
                return Err(TransitionError::UnknownNote(title));
            }
            Ok(EditorState {
                pending_delete: Some(title),
                ..state.clone()
            })
        }
        EditorEvent::CancelDelete => Ok(EditorState {
            pending_delete: None,
            ..state.clone()
        }),
        EditorEvent::NoteDeleted(title) => {
            let pending_delete = state
                .pending_delete
                .clone()
                .filter(|pending| *pending != title);
            if state.selection.as_deref() == Some(title.as_str()) {
                return Ok(EditorState::cleared(pending_delete));
            }
            Ok(EditorState {
                pending_delete,
                ..state.clone()
            })
        }
        EditorEvent::NotesReloaded => {
            let pending_delete = state
                .pending_delete
                .clone()
                .filter(|pending| notes.contains(pending));
            match state.selection.as_deref() {
                Some(selected) if !notes.contains(selected) => {
                    Ok(EditorState::cleared(pending_delete))
                }
                _ => Ok(EditorState {
                    pending_delete,
                    ..state.clone()
                }),
            }
        }
    }
}
