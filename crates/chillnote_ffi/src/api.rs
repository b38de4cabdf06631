//! FFI use-case API for the Flutter notes screen.
//!
//! # Responsibility
//! - Expose the notes screen actions to Dart via FRB as sync calls.
//! - Own the single process-wide notes session.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Every call goes through one mutex, so screen actions never interleave.
//! - Storage failures are logged and reported in `message` only; the only
//!   user-facing notices are validation errors and delete confirmations.
//! - If the database file cannot be opened the screen still works, backed by
//!   an in-memory store, until a reload reaches the file.

use chillnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CoreConfig, DeleteConfirmation, NoteValidationError, NotesSession, ScreenView, SessionError,
    SqliteKeyValueStore, SubmitOutcome,
};
use log::{info, warn};
use std::path::Path;
use std::sync::{Mutex, OnceLock, PoisonError};

type Session = NotesSession<SqliteKeyValueStore>;

static CONFIG: OnceLock<CoreConfig> = OnceLock::new();
static SESSION: OnceLock<Mutex<Option<ScreenSession>>> = OnceLock::new();

/// Where the process-wide session keeps its notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backing {
    File,
    /// The file could not be opened; nothing survives the process.
    Memory,
}

struct ScreenSession {
    session: Session,
    backing: Backing,
}

impl ScreenSession {
    /// Opens the notes file, falling back to an in-memory store.
    fn open(db_path: &Path) -> Result<Self, String> {
        match SqliteKeyValueStore::open(db_path) {
            Ok(kv) => {
                info!("event=session_open module=ffi status=ok backing=file");
                Ok(Self {
                    session: NotesSession::open(kv),
                    backing: Backing::File,
                })
            }
            Err(err) => {
                warn!("event=session_open module=ffi status=degraded backing=memory error={err}");
                let kv = SqliteKeyValueStore::open_in_memory()
                    .map_err(|err| format!("notes DB open failed: {err}"))?;
                Ok(Self {
                    session: NotesSession::new(kv),
                    backing: Backing::Memory,
                })
            }
        }
    }

    /// Re-reads the notes. A memory-backed session first retries the file and,
    /// once it opens, takes the file's notes in place of the in-memory ones.
    fn reload(&mut self, db_path: &Path) -> Result<usize, String> {
        if self.backing == Backing::Memory {
            let kv = SqliteKeyValueStore::open(db_path).map_err(|err| {
                warn!("event=notes_reload module=ffi status=degraded backing=memory error={err}");
                format!("notes DB still unavailable: {err}")
            })?;
            self.session = NotesSession::new(kv);
            self.backing = Backing::File;
            info!("event=notes_reload module=ffi status=recovered backing=file");
        }
        self.session.reload().map_err(|err| {
            warn!("event=notes_reload module=ffi status=degraded error={err}");
            err.to_string()
        })
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive). A blank
///   value uses `CHILLNOTE_LOG_LEVEL`, then the build default.
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Idempotent for the same `level + log_dir`; conflicting re-init fails.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = if level.trim().is_empty() {
        config().log_level.to_string()
    } else {
        level
    };
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One row of the note list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListEntry {
    pub title: String,
    pub selected: bool,
}

/// Render snapshot of the notes screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotesViewResponse {
    /// Whether the session could be opened.
    pub ok: bool,
    /// Rows in insertion order.
    pub items: Vec<NoteListEntry>,
    pub title_draft: String,
    pub content_draft: String,
    /// False while an existing note is selected.
    pub title_editable: bool,
    /// `Add Note` or `Save Changes`.
    pub primary_action_label: String,
    /// Confirmation prompt while a delete awaits an answer.
    pub pending_delete_prompt: Option<String>,
    /// False while notes live in memory only.
    pub durable: bool,
    /// Human-readable diagnostics.
    pub message: String,
}

impl NotesViewResponse {
    fn from_view(view: ScreenView, backing: Backing) -> Self {
        let durable = backing == Backing::File;
        Self {
            ok: true,
            items: view
                .items
                .into_iter()
                .map(|item| NoteListEntry {
                    title: item.title,
                    selected: item.selected,
                })
                .collect(),
            title_draft: view.title_draft,
            content_draft: view.content_draft,
            title_editable: view.title_editable,
            primary_action_label: view.primary_action.label().to_string(),
            pending_delete_prompt: view.pending_delete.map(|pending| pending.prompt),
            durable,
            message: if durable {
                String::new()
            } else {
                "Notes database unavailable; changes are kept in memory.".to_string()
            },
        }
    }

    fn failure(message: String) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            title_draft: String::new(),
            content_draft: String::new(),
            title_editable: true,
            primary_action_label: String::new(),
            pending_delete_prompt: None,
            durable: false,
            message,
        }
    }
}

/// Result envelope for one screen action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteActionResponse {
    /// Whether the action took effect.
    pub ok: bool,
    /// Human-readable diagnostics.
    pub message: String,
    /// Heading of a blocking dialog the shell must show, if any.
    pub notice_title: Option<String>,
    /// Body of that dialog.
    pub notice_message: Option<String>,
}

impl NoteActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            notice_title: None,
            notice_message: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            ..Self::success(message)
        }
    }

    fn validation(err: &NoteValidationError) -> Self {
        Self {
            ok: false,
            message: err.to_string(),
            notice_title: Some(NoteValidationError::NOTICE_TITLE.to_string()),
            notice_message: Some(err.notice_message().to_string()),
        }
    }

    fn confirmation(pending: DeleteConfirmation) -> Self {
        Self {
            ok: true,
            message: "Delete requested.".to_string(),
            notice_title: Some(DeleteConfirmation::HEADING.to_string()),
            notice_message: Some(pending.prompt),
        }
    }
}

/// Returns the current screen snapshot, opening the session on first use.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_view() -> NotesViewResponse {
    match with_screen(|screen| (screen.session.view(), screen.backing)) {
        Ok((view, backing)) => NotesViewResponse::from_view(view, backing),
        Err(err) => NotesViewResponse::failure(format!("notes_view failed: {err}")),
    }
}

/// Re-reads notes from storage. A failed read keeps the current notes.
///
/// While running on the in-memory fallback, this also retries the file.
#[flutter_rust_bridge::frb(sync)]
pub fn notes_reload() -> NoteActionResponse {
    let reloaded = with_screen(|screen| screen.reload(&config().db_path));
    match reloaded.and_then(|result| result) {
        Ok(count) => NoteActionResponse::success(format!("Loaded {count} note(s).")),
        Err(err) => NoteActionResponse::failure(format!("notes_reload failed: {err}")),
    }
}

/// Loads `title` into the drafts and enters editing mode.
#[flutter_rust_bridge::frb(sync)]
pub fn note_select(title: String) -> NoteActionResponse {
    flatten("note_select", |session| match session.select(&title) {
        Ok(()) => NoteActionResponse::success("Note selected."),
        Err(err) => NoteActionResponse::failure(format!("note_select failed: {err}")),
    })
}

/// The Clear button: leaves editing mode and empties both drafts.
#[flutter_rust_bridge::frb(sync)]
pub fn note_clear() -> NoteActionResponse {
    flatten("note_clear", |session| {
        session.clear();
        NoteActionResponse::success("Cleared.")
    })
}

/// Title field change. Rejected while an existing note is selected.
#[flutter_rust_bridge::frb(sync)]
pub fn note_edit_title(text: String) -> NoteActionResponse {
    flatten("note_edit_title", |session| match session.edit_title(text) {
        Ok(()) => NoteActionResponse::success(""),
        Err(err) => NoteActionResponse::failure(format!("note_edit_title failed: {err}")),
    })
}

/// Content field change.
#[flutter_rust_bridge::frb(sync)]
pub fn note_edit_content(text: String) -> NoteActionResponse {
    flatten("note_edit_content", |session| {
        session.edit_content(text);
        NoteActionResponse::success("")
    })
}

/// The primary button: `Add Note` in new mode, `Save Changes` when editing.
///
/// # FFI contract
/// - Validation failures return `ok=false` plus a notice to show.
/// - A failed storage write still returns `ok=true`; the change is kept in
///   memory and the failure is logged.
#[flutter_rust_bridge::frb(sync)]
pub fn note_submit() -> NoteActionResponse {
    flatten("note_submit", |session| {
        let action = session.editor().primary_action();
        match session.submit() {
            Ok(SubmitOutcome::Added) => NoteActionResponse::success("Note added."),
            Ok(SubmitOutcome::Saved) => NoteActionResponse::success("Note saved."),
            Ok(SubmitOutcome::Skipped) => NoteActionResponse::success("Nothing to save."),
            Err(SessionError::Validation(err)) => NoteActionResponse::validation(&err),
            Err(SessionError::Persist(err)) => {
                warn!(
                    "event=note_submit module=ffi status=degraded action={} error={err}",
                    action.label()
                );
                NoteActionResponse::success(format!("Kept in memory only: {err}"))
            }
            Err(err) => NoteActionResponse::failure(format!("note_submit failed: {err}")),
        }
    })
}

/// First delete step; the response carries the confirmation dialog.
#[flutter_rust_bridge::frb(sync)]
pub fn note_request_delete(title: String) -> NoteActionResponse {
    flatten("note_request_delete", |session| {
        match session.request_delete(&title) {
            Ok(pending) => NoteActionResponse::confirmation(pending),
            Err(err) => NoteActionResponse::failure(format!("note_request_delete failed: {err}")),
        }
    })
}

/// Confirms the pending delete.
#[flutter_rust_bridge::frb(sync)]
pub fn note_confirm_delete() -> NoteActionResponse {
    flatten("note_confirm_delete", |session| match session.confirm_delete() {
        Ok(true) => NoteActionResponse::success("Note deleted."),
        Ok(false) => NoteActionResponse::success("Nothing to delete."),
        Err(SessionError::Persist(err)) => {
            warn!("event=note_delete module=ffi status=degraded error={err}");
            NoteActionResponse::success(format!("Kept in memory only: {err}"))
        }
        Err(err) => NoteActionResponse::failure(format!("note_confirm_delete failed: {err}")),
    })
}

/// Dismisses the pending delete.
#[flutter_rust_bridge::frb(sync)]
pub fn note_cancel_delete() -> NoteActionResponse {
    flatten("note_cancel_delete", |session| {
        session.cancel_delete();
        NoteActionResponse::success("Delete cancelled.")
    })
}

fn config() -> &'static CoreConfig {
    CONFIG.get_or_init(CoreConfig::from_env)
}

fn flatten(
    call: &'static str,
    f: impl FnOnce(&mut Session) -> NoteActionResponse,
) -> NoteActionResponse {
    with_session(f).unwrap_or_else(|err| NoteActionResponse::failure(format!("{call} failed: {err}")))
}

fn with_session<T>(f: impl FnOnce(&mut Session) -> T) -> Result<T, String> {
    with_screen(|screen| f(&mut screen.session))
}

fn with_screen<T>(f: impl FnOnce(&mut ScreenSession) -> T) -> Result<T, String> {
    let slot = SESSION.get_or_init(|| Mutex::new(None));
    // Session state is only ever replaced whole, so a poisoned guard is still consistent.
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);

    if guard.is_none() {
        *guard = Some(ScreenSession::open(&config().db_path)?);
    }

    match guard.as_mut() {
        Some(screen) => Ok(f(screen)),
        None => Err("notes session unavailable".to_string()),
    }
}
