//! In-memory note store.
//!
//! # Invariants
//! - Scan order is insertion order; deletes do not reorder survivors.

use crate::model::note::{Note, NoteFields, NoteId};
use crate::repo::note_store::{NoteStore, StoreError, StoreResult};

/// Vector-backed store for tests and ephemeral gardens.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNoteStore {
    notes: Vec<Note>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn position(&self, id: NoteId) -> Option<usize> {
        self.notes.iter().position(|note| note.id == id)
    }
}

impl NoteStore for InMemoryNoteStore {
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.position(id).map(|index| self.notes[index].clone()))
    }

    fn scan_notes(&self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn insert_note(&mut self, note: &Note) -> StoreResult<()> {
        note.validate()?;
        if self.position(note.id).is_some() {
            return Err(StoreError::DuplicateId(note.id));
        }
        self.notes.push(note.clone());
        Ok(())
    }

    fn update_fields(&mut self, id: NoteId, fields: &NoteFields) -> StoreResult<()> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        let mut updated = self.notes[index].clone();
        updated.apply_fields(fields);
        updated.validate()?;
        self.notes[index] = updated;
        Ok(())
    }

    fn delete_note(&mut self, id: NoteId) -> StoreResult<()> {
        let index = self.position(id).ok_or(StoreError::NotFound(id))?;
        self.notes.remove(index);
        Ok(())
    }
}
