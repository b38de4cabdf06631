//! Notes screen session.
//!
//! # Responsibility
//! - Bind one `NoteStore` to one `EditorState`.
//! - Implement the screen actions (primary action, Clear, two-step delete).
//! - Project the state into a render-ready `ScreenView`.
//!
//! # Invariants
//! - Add is only reachable in `EditorMode::New`; Save only in `Editing`.
//! - Load failures are logged and swallowed; the session keeps its state.
//! - A failed blob write still applies the editor transition, because the
//!   in-memory collection already changed.

use crate::model::note::NoteValidationError;
use crate::repo::kv_repo::KeyValueStore;
use crate::repo::notes_blob::{LoadError, PersistError};
use crate::service::editor::{
    reduce, EditorEvent, EditorMode, EditorState, PrimaryAction, TransitionError,
};
use crate::service::note_store::{NoteStore, NoteStoreError};
use log::{debug, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which write the primary action (or `save`) performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added,
    Saved,
    /// Save requested with nothing selected.
    Skipped,
}

/// Session-level failures.
#[derive(Debug)]
pub enum SessionError {
    /// Blocking user notice; nothing changed.
    Validation(NoteValidationError),
    /// Event not allowed in the current state; nothing changed.
    Transition(TransitionError),
    /// State changed in memory, but the blob write failed.
    Persist(PersistError),
}

impl SessionError {
    /// Notice to show the user, if this failure is user-visible at all.
    pub fn user_notice(&self) -> Option<&'static str> {
        match self {
            Self::Validation(err) => Some(err.notice_message()),
            Self::Transition(_) | Self::Persist(_) => None,
        }
    }
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Transition(err) => write!(f, "{err}"),
            Self::Persist(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transition(err) => Some(err),
            Self::Persist(err) => Some(err),
        }
    }
}

impl From<TransitionError> for SessionError {
    fn from(value: TransitionError) -> Self {
        Self::Transition(value)
    }
}

impl From<NoteStoreError> for SessionError {
    fn from(value: NoteStoreError) -> Self {
        match value {
            NoteStoreError::Validation(err) => Self::Validation(err),
            NoteStoreError::NotFound(title) => {
                Self::Transition(TransitionError::UnknownNote(title))
            }
            NoteStoreError::Persist(err) => Self::Persist(err),
        }
    }
}

/// Pending delete awaiting the user's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    pub title: String,
    pub prompt: String,
}

impl DeleteConfirmation {
    pub const HEADING: &'static str = "Confirm Delete";

    pub fn for_title(title: impl Into<String>) -> Self {
        let title = title.into();
        let prompt = format!("Delete note \"{title}\"?");
        Self { title, prompt }
    }
}

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub title: String,
    pub selected: bool,
}

/// Everything the shell needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenView {
    /// Rows in collection order.
    pub items: Vec<NoteListItem>,
    pub title_draft: String,
    pub content_draft: String,
    pub title_editable: bool,
    pub primary_action: PrimaryAction,
    pub pending_delete: Option<DeleteConfirmation>,
}

/// One note screen over one key-value store.
pub struct NotesSession<S: KeyValueStore> {
    store: NoteStore<S>,
    editor: EditorState,
}

impl<S: KeyValueStore> NotesSession<S> {
    /// Creates a session without touching storage.
    pub fn new(kv: S) -> Self {
        Self {
            store: NoteStore::new(kv),
            editor: EditorState::new(),
        }
    }

    /// Creates a session and loads the persisted notes.
    ///
    /// A load failure is logged and the session starts empty.
    pub fn open(kv: S) -> Self {
        let mut session = Self::new(kv);
        if let Err(err) = session.store.load() {
            warn!("event=session_open module=session status=degraded error={err}");
        }
        session
    }

    /// Re-reads the persisted notes.
    ///
    /// On failure the in-memory notes and editor are left unchanged.
    pub fn reload(&mut self) -> Result<usize, LoadError> {
        let count = self.store.load()?;
        self.apply(EditorEvent::NotesReloaded);
        Ok(count)
    }

    pub fn store(&self) -> &NoteStore<S> {
        &self.store
    }

    pub fn editor(&self) -> &EditorState {
        &self.editor
    }

    pub fn select(&mut self, title: &str) -> Result<(), TransitionError> {
        self.dispatch(EditorEvent::Select(title.to_string()))
    }

    /// The Clear action: back to New with empty drafts.
    pub fn clear(&mut self) {
        self.apply(EditorEvent::ClearSelection);
    }

    pub fn edit_title(&mut self, text: impl Into<String>) -> Result<(), TransitionError> {
        self.dispatch(EditorEvent::EditTitleDraft(text.into()))
    }

    pub fn edit_content(&mut self, text: impl Into<String>) {
        self.apply(EditorEvent::EditContentDraft(text.into()));
    }

    /// Runs the primary action for the current mode.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SessionError> {
        match self.editor.mode() {
            EditorMode::New => self.add(),
            EditorMode::Editing => self.save(),
        }
    }

    /// Adds a note from the drafts, then returns to New.
    pub fn add(&mut self) -> Result<SubmitOutcome, SessionError> {
        if self.editor.mode() != EditorMode::New {
            return Err(TransitionError::NoteSelected.into());
        }
        let written = self.store.add(
            self.editor.title_draft().to_string(),
            self.editor.content_draft().to_string(),
        );
        self.commit(written, EditorEvent::NoteAdded)?;
        Ok(SubmitOutcome::Added)
    }

    /// Saves the content draft into the selected note.
    ///
    /// Silently does nothing when no note is selected.
    pub fn save(&mut self) -> Result<SubmitOutcome, SessionError> {
        let Some(title) = self.editor.selection().map(str::to_string) else {
            debug!("event=note_save module=session status=skipped reason=no_selection");
            return Ok(SubmitOutcome::Skipped);
        };
        self.store
            .update(&title, self.editor.content_draft().to_string())?;
        Ok(SubmitOutcome::Saved)
    }

    /// First step of delete: remembers `title` and returns the prompt.
    pub fn request_delete(&mut self, title: &str) -> Result<DeleteConfirmation, TransitionError> {
        self.dispatch(EditorEvent::RequestDelete(title.to_string()))?;
        Ok(DeleteConfirmation::for_title(title))
    }

    /// Second step of delete. Returns `Ok(false)` when nothing was pending.
    pub fn confirm_delete(&mut self) -> Result<bool, SessionError> {
        let Some(title) = self.editor.pending_delete().map(str::to_string) else {
            return Ok(false);
        };
        let written = self.store.delete(&title);
        if let Err(NoteStoreError::NotFound(_)) = &written {
            self.apply(EditorEvent::CancelDelete);
        }
        self.commit(written, EditorEvent::NoteDeleted(title))?;
        Ok(true)
    }

    pub fn cancel_delete(&mut self) {
        self.apply(EditorEvent::CancelDelete);
    }

    pub fn view(&self) -> ScreenView {
        let selection = self.editor.selection();
        ScreenView {
            items: self
                .store
                .notes()
                .titles()
                .map(|title| NoteListItem {
                    title: title.to_string(),
                    selected: selection == Some(title),
                })
                .collect(),
            title_draft: self.editor.title_draft().to_string(),
            content_draft: self.editor.content_draft().to_string(),
            title_editable: self.editor.title_editable(),
            primary_action: self.editor.primary_action(),
            pending_delete: self
                .editor
                .pending_delete()
                .map(|title| DeleteConfirmation::for_title(title)),
        }
    }

    fn dispatch(&mut self, event: EditorEvent) -> Result<(), TransitionError> {
        self.editor = reduce(&self.editor, event, self.store.notes())?;
        Ok(())
    }

    // For events the reducer accepts in every state.
    fn apply(&mut self, event: EditorEvent) {
        if let Err(err) = self.dispatch(event) {
            debug!("event=editor_transition module=session status=rejected error={err}");
        }
    }

    // Applies `event` whenever the store mutation reached memory, then
    // surfaces the store result.
    fn commit(
        &mut self,
        written: Result<(), NoteStoreError>,
        event: EditorEvent,
    ) -> Result<(), SessionError> {
        let applied = match &written {
            Ok(()) => true,
            Err(err) => err.is_applied(),
        };
        if applied {
            self.dispatch(event)?;
        }
        written.map_err(SessionError::from)
    }
}
