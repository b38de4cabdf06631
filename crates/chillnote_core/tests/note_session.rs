use chillnote_core::{
    load_collection, EditorMode, KeyValueStore, MemoryKeyValueStore, NoteValidationError,
    NotesSession, PrimaryAction, SessionError, StorageError, StorageResult, SubmitOutcome,
    TransitionError, NOTES_STORAGE_KEY,
};
use std::cell::Cell;

/// Memory store whose writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKeyValueStore,
    fail_writes: Cell<bool>,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("disk full".to_string()));
        }
        self.inner.set(key, value)
    }
}

fn add_note(session: &mut NotesSession<impl KeyValueStore>, title: &str, content: &str) {
    session.clear();
    session.edit_title(title).unwrap();
    session.edit_content(content);
    assert_eq!(session.submit().unwrap(), SubmitOutcome::Added);
}

#[test]
fn groceries_scenario_adds_selects_and_updates() {
    let kv = MemoryKeyValueStore::new();
    let mut session = NotesSession::open(&kv);
    assert!(session.view().items.is_empty());

    add_note(&mut session, "Groceries", "Milk, eggs");
    let view = session.view();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.items[0].title, "Groceries");
    assert!(!view.items[0].selected);

    session.select("Groceries").unwrap();
    assert_eq!(session.editor().content_draft(), "Milk, eggs");

    session.edit_content("Milk, eggs, bread");
    assert_eq!(session.submit().unwrap(), SubmitOutcome::Saved);

    assert_eq!(
        session.store().notes().get("Groceries"),
        Some("Milk, eggs, bread")
    );
    assert_eq!(
        load_collection(&kv).unwrap().get("Groceries"),
        Some("Milk, eggs, bread")
    );
    assert_eq!(session.editor().selection(), Some("Groceries"));
}

#[test]
fn successful_add_returns_to_new_with_cleared_drafts() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    session.edit_title("Ideas").unwrap();
    session.edit_content("garden");
    session.submit().unwrap();

    let view = session.view();
    assert_eq!(session.editor().mode(), EditorMode::New);
    assert_eq!(view.title_draft, "");
    assert_eq!(view.content_draft, "");
    assert_eq!(view.primary_action, PrimaryAction::Add);
    assert_eq!(session.store().notes().get("Ideas"), Some("garden"));
}

#[test]
fn duplicate_title_is_rejected_without_mutation() {
    let kv = MemoryKeyValueStore::new();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");

    session.edit_title("A").unwrap();
    session.edit_content("y");
    let err = session.submit().unwrap_err();

    assert!(matches!(
        err,
        SessionError::Validation(NoteValidationError::DuplicateTitle(_))
    ));
    assert_eq!(err.to_string(), "duplicate title");
    assert_eq!(
        err.user_notice(),
        Some("Note with this title already exists")
    );
    assert_eq!(session.store().notes().get("A"), Some("x"));
    assert_eq!(load_collection(&kv).unwrap().get("A"), Some("x"));
    // Drafts stay so the user can fix the title.
    assert_eq!(session.editor().title_draft(), "A");
    assert_eq!(session.editor().content_draft(), "y");
}

#[test]
fn blank_title_is_rejected_without_mutation() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    session.edit_title("   ").unwrap();
    session.edit_content("orphan body");

    let err = session.submit().unwrap_err();
    assert!(matches!(
        err,
        SessionError::Validation(NoteValidationError::EmptyTitle)
    ));
    assert_eq!(err.user_notice(), Some("Please enter a note title"));
    assert!(session.store().notes().is_empty());
}

#[test]
fn title_is_stored_as_typed() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    add_note(&mut session, " padded ", "x");
    assert_eq!(session.store().notes().get(" padded "), Some("x"));
    assert_eq!(session.store().notes().get("padded"), None);
}

#[test]
fn title_cannot_be_edited_while_a_note_is_selected() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    add_note(&mut session, "A", "x");
    session.select("A").unwrap();

    assert_eq!(session.edit_title("B"), Err(TransitionError::TitleLocked));
    assert!(!session.view().title_editable);
    assert_eq!(session.editor().title_draft(), "A");
}

#[test]
fn save_without_selection_is_a_silent_no_op() {
    let kv = MemoryKeyValueStore::new();
    let mut session = NotesSession::open(&kv);
    session.edit_content("ignored");

    assert_eq!(session.save().unwrap(), SubmitOutcome::Skipped);
    assert!(session.store().notes().is_empty());
    assert_eq!(kv.get(NOTES_STORAGE_KEY).unwrap(), None);
}

#[test]
fn delete_requires_confirmation() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    add_note(&mut session, "A", "x");

    let confirmation = session.request_delete("A").unwrap();
    assert_eq!(confirmation.prompt, "Delete note \"A\"?");
    assert_eq!(session.view().pending_delete, Some(confirmation));
    assert!(session.store().notes().contains("A"));

    session.cancel_delete();
    assert!(session.view().pending_delete.is_none());
    assert!(!session.confirm_delete().unwrap());
    assert!(session.store().notes().contains("A"));

    session.request_delete("A").unwrap();
    assert!(session.confirm_delete().unwrap());
    assert!(session.store().notes().is_empty());
    assert!(session.view().pending_delete.is_none());
}

#[test]
fn deleting_the_selected_note_returns_to_new() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    add_note(&mut session, "A", "x");
    add_note(&mut session, "B", "y");
    session.select("A").unwrap();
    session.edit_content("unsaved");

    session.request_delete("B").unwrap();
    session.confirm_delete().unwrap();
    assert_eq!(session.editor().selection(), Some("A"));
    assert_eq!(session.editor().content_draft(), "unsaved");

    session.request_delete("A").unwrap();
    session.confirm_delete().unwrap();
    assert_eq!(session.editor().selection(), None);
    assert_eq!(session.editor().title_draft(), "");
    assert_eq!(session.editor().content_draft(), "");
}

#[test]
fn request_delete_of_unknown_note_is_rejected() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    assert_eq!(
        session.request_delete("ghost"),
        Err(TransitionError::UnknownNote("ghost".to_string()))
    );
}

#[test]
fn view_lists_titles_in_insertion_order_and_marks_selection() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    for title in ["zeta", "alpha", "mid"] {
        add_note(&mut session, title, "");
    }
    session.select("alpha").unwrap();

    let view = session.view();
    let rows: Vec<(&str, bool)> = view
        .items
        .iter()
        .map(|item| (item.title.as_str(), item.selected))
        .collect();
    assert_eq!(rows, [("zeta", false), ("alpha", true), ("mid", false)]);
    assert_eq!(view.primary_action.label(), "Save Changes");
}

#[test]
fn open_swallows_malformed_blob_and_starts_empty() {
    let kv = MemoryKeyValueStore::with_entry(NOTES_STORAGE_KEY, "not json");
    let session = NotesSession::open(&kv);

    assert!(session.store().notes().is_empty());
    assert_eq!(session.editor().mode(), EditorMode::New);
}

#[test]
fn open_loads_existing_notes() {
    let kv = MemoryKeyValueStore::with_entry(NOTES_STORAGE_KEY, r#"{"A":"x","B":"y"}"#);
    let session = NotesSession::open(&kv);
    assert_eq!(session.store().notes().len(), 2);
}

#[test]
fn failed_write_keeps_optimistic_state_and_reports_persist_error() {
    let kv = FlakyStore::default();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");

    kv.fail_writes.set(true);
    session.edit_title("B").unwrap();
    session.edit_content("y");
    let err = session.submit().unwrap_err();

    assert!(matches!(err, SessionError::Persist(_)));
    assert_eq!(err.user_notice(), None);
    assert_eq!(session.store().notes().get("B"), Some("y"));
    assert_eq!(session.editor().mode(), EditorMode::New);
    assert_eq!(session.editor().title_draft(), "");

    let persisted = load_collection(&kv).unwrap();
    assert!(persisted.contains("A"));
    assert!(!persisted.contains("B"));

    kv.fail_writes.set(false);
    session.select("A").unwrap();
    session.edit_content("x2");
    session.submit().unwrap();
    let persisted = load_collection(&kv).unwrap();
    assert_eq!(persisted.get("B"), Some("y"));
    assert_eq!(persisted.get("A"), Some("x2"));
}

#[test]
fn reload_clears_selection_of_vanished_note() {
    let kv = MemoryKeyValueStore::new();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");
    session.select("A").unwrap();

    kv.set(NOTES_STORAGE_KEY, r#"{"B":"y"}"#).unwrap();
    assert_eq!(session.reload().unwrap(), 1);

    assert_eq!(session.editor().mode(), EditorMode::New);
    assert_eq!(session.view().items[0].title, "B");
}

#[test]
fn failed_reload_keeps_current_state() {
    let kv = MemoryKeyValueStore::new();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");
    session.select("A").unwrap();

    kv.set(NOTES_STORAGE_KEY, "{").unwrap();
    assert!(session.reload().is_err());

    assert_eq!(session.editor().selection(), Some("A"));
    assert!(session.store().notes().contains("A"));
}

#[test]
fn add_is_refused_while_editing() {
    let mut session = NotesSession::open(MemoryKeyValueStore::new());
    add_note(&mut session, "A", "x");
    session.select("A").unwrap();

    assert!(matches!(
        session.add(),
        Err(SessionError::Transition(TransitionError::NoteSelected))
    ));
    assert_eq!(session.store().notes().len(), 1);
}

#[test]
fn stray_blank_title_in_blob_does_not_cost_the_other_notes() {
    let kv = MemoryKeyValueStore::with_entry(
        NOTES_STORAGE_KEY,
        r#"{"Groceries":"Milk","  ":"stray","Ideas":"garden"}"#,
    );
    let mut session = NotesSession::open(&kv);
    assert_eq!(session.store().notes().len(), 2);

    add_note(&mut session, "New", "fresh");

    let persisted = load_collection(&kv).unwrap();
    assert_eq!(
        persisted.titles().collect::<Vec<_>>(),
        ["Groceries", "Ideas", "New"]
    );
    assert_eq!(persisted.get("Groceries"), Some("Milk"));
}

#[test]
fn failed_write_on_save_keeps_new_content_in_memory() {
    let kv = FlakyStore::default();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");
    session.select("A").unwrap();
    session.edit_content("x2");

    kv.fail_writes.set(true);
    let err = session.submit().unwrap_err();

    assert!(matches!(err, SessionError::Persist(_)));
    assert_eq!(err.user_notice(), None);
    assert_eq!(session.store().notes().get("A"), Some("x2"));
    assert_eq!(session.editor().selection(), Some("A"));
    assert_eq!(session.editor().content_draft(), "x2");
    assert_eq!(load_collection(&kv).unwrap().get("A"), Some("x"));
}

#[test]
fn failed_write_on_confirmed_delete_still_removes_selected_note() {
    let kv = FlakyStore::default();
    let mut session = NotesSession::open(&kv);
    add_note(&mut session, "A", "x");
    add_note(&mut session, "B", "y");
    session.select("A").unwrap();
    session.request_delete("A").unwrap();

    kv.fail_writes.set(true);
    let err = session.confirm_delete().unwrap_err();

    assert!(matches!(err, SessionError::Persist(_)));
    assert!(!session.store().notes().contains("A"));
    assert_eq!(session.editor().mode(), EditorMode::New);
    assert_eq!(session.editor().title_draft(), "");
    assert_eq!(session.editor().content_draft(), "");
    assert!(session.view().pending_delete.is_none());

    let persisted = load_collection(&kv).unwrap();
    assert!(persisted.contains("A"));
    assert!(persisted.contains("B"));
}
