//! Placeholder notes for unresolved references.

use crate::model::note::Note;
use crate::repo::note_store::{NoteStore, StoreResult};
use log::info;

/// Persists and returns an empty note titled exactly `title`.
///
/// The title is kept as captured from the marker, without normalization.
pub fn create_stub<S: NoteStore + ?Sized>(
    store: &mut S,
    title: &str,
    now_ms: i64,
) -> StoreResult<Note> {
    let stub = Note::new(title, "", now_ms);
    store.insert_note(&stub)?;
    info!("event=stub_create module=link status=ok note_id={}", stub.id);
    Ok(stub)
}

#[cfg(test)]
mod tests {
    use super::create_stub;
    use crate::repo::memory_store::InMemoryNoteStore;
    use crate::repo::note_store::NoteStore;

    #[test]
    fn stub_is_persisted_blank_with_verbatim_title() {
        let mut store = InMemoryNoteStore::new();
        let stub = create_stub(&mut store, " Raw Title ", 42).unwrap();

        let loaded = store.get_note(stub.id).unwrap().unwrap();
        assert_eq!(loaded.title, " Raw Title ");
        assert!(loaded.is_blank());
        assert_eq!(loaded.parent_id, None);
        assert!(loaded.tags.is_empty());
        assert!(loaded.links.is_empty());
        assert!(loaded.backlinks.is_empty());
        assert_eq!(loaded.created_at, 42);
        assert_eq!(loaded.updated_at, 42);
    }
}
