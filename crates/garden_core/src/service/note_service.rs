//! Note use-case service.
//!
//! # Responsibility
//! - Provide the caller-facing create/update/delete/get/list note APIs.
//! - Drive edge synchronization around every content change.
//!
//! # Invariants
//! - `create_note` resolves links against a stable new id before the note
//!   itself is persisted.
//! - `update_note` tears down every old outgoing edge, then rebuilds edges
//!   from the new content; `links` is replaced, never merged.
//! - `update_note`/`delete_note` on a missing id fail before any edge write.
//! - Mutating calls take `&mut self`, so one service instance serializes
//!   all graph writes made through it.

use crate::link::resolver::resolve_title;
use crate::link::sync::{GraphSynchronizer, SyncOptions};
use crate::model::note::{NewNote, Note, NoteFields, NoteId, NotePatch, NoteRef, NoteView};
use crate::repo::note_store::{NoteStore, StoreError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" in Unix epoch milliseconds.
pub type Clock = fn() -> i64;

/// Wall-clock time in Unix epoch milliseconds.
pub fn system_clock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist.
    NoteNotFound(NoteId),
    /// Persistence-layer failure.
    Store(StoreError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NoteNotFound(id),
            other => Self::Store(other),
        }
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over a note store.
pub struct NoteService<S: NoteStore> {
    store: S,
    clock: Clock,
    options: SyncOptions,
}

impl<S: NoteStore> NoteService<S> {
    /// Creates a service using the wall clock and default sync options.
    pub fn new(store: S) -> Self {
        Self::with_clock(store, system_clock)
    }

    /// Creates a service with an injected clock.
    pub fn with_clock(store: S, clock: Clock) -> Self {
        Self {
            store,
            clock,
            options: SyncOptions::default(),
        }
    }

    /// Replaces edge synchronization options.
    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Creates a note, stubbing and back-linking every referenced title.
    pub fn create_note(&mut self, request: NewNote) -> NoteServiceResult<Note> {
        let now = (self.clock)();
        let mut note = Note::new(request.resolved_title(), request.content, now);
        note.parent_id = request.parent_id;
        note.tags = request.tags;

        if let Err(err) = self.persist_new(&mut note, now) {
            error!(
                "event=note_create module=service status=error note_id={} error={}",
                note.id, err
            );
            return Err(err.into());
        }

        info!(
            "event=note_create module=service status=ok note_id={} links={}",
            note.id,
            note.links.len()
        );
        self.read_back(note.id, "created note not found in read-back")
    }

    /// Applies `patch` and rebuilds the note's edges from its new content.
    ///
    /// Fields absent from `patch` keep their stored value; content is
    /// re-synchronized even when unchanged.
    pub fn update_note(&mut self, id: NoteId, patch: NotePatch) -> NoteServiceResult<Note> {
        let existing = self
            .store
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        let now = (self.clock)().max(existing.created_at);

        let mut sync = GraphSynchronizer::new(&mut self.store, self.options);
        let removed = sync.teardown_outgoing(id, &existing.links)?;

        let content = patch.content.unwrap_or(existing.content);
        let links = sync.sync_links(id, &content, now)?;
        let link_count = links.len();

        let fields = NoteFields {
            title: Some(patch.title.unwrap_or(existing.title)),
            content: Some(content),
            parent_id: Some(patch.parent_id.unwrap_or(existing.parent_id)),
            tags: Some(patch.tags.unwrap_or(existing.tags)),
            updated_at: Some(now),
            links: Some(links),
            backlinks: None,
        };
        self.store.update_fields(id, &fields)?;

        info!(
            "event=note_update module=service status=ok note_id={} removed_edges={} links={}",
            id, removed, link_count
        );
        self.read_back(id, "updated note not found in read-back")
    }

    /// Deletes a note after retracting its outgoing backlink edges.
    ///
    /// Other notes' `links` naming this id are left as-is.
    pub fn delete_note(&mut self, id: NoteId) -> NoteServiceResult<()> {
        let existing = self
            .store
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;

        let removed = GraphSynchronizer::new(&mut self.store, self.options)
            .teardown_outgoing(id, &existing.links)?;
        self.store.delete_note(id)?;

        info!(
            "event=note_delete module=service status=ok note_id={} removed_edges={} inbound={}",
            id,
            removed,
            existing.backlinks.len()
        );
        Ok(())
    }

    /// Gets one note with its edge endpoints resolved for display.
    ///
    /// Ids that no longer resolve are silently dropped from both lists.
    pub fn get_note(&self, id: NoteId) -> NoteServiceResult<NoteView> {
        let note = self
            .store
            .get_note(id)?
            .ok_or(NoteServiceError::NoteNotFound(id))?;
        let link_details = self.resolve_refs(note.links.iter().copied())?;
        let backlink_details = self.resolve_refs(note.backlinks.iter())?;
        Ok(NoteView {
            note,
            link_details,
            backlink_details,
        })
    }

    /// Lists every note in store order.
    pub fn list_notes(&self) -> NoteServiceResult<Vec<Note>> {
        Ok(self.store.scan_notes()?)
    }

    /// Finds the note a `[[title]]` marker would resolve to.
    pub fn find_by_title(&self, title: &str) -> NoteServiceResult<Option<Note>> {
        Ok(resolve_title(&self.store, title)?)
    }

    fn persist_new(&mut self, note: &mut Note, now: i64) -> Result<(), StoreError> {
        note.links = GraphSynchronizer::new(&mut self.store, self.options)
            .sync_links(note.id, &note.content, now)?;
        self.store.insert_note(note)
    }

    fn resolve_refs(&self, ids: impl Iterator<Item = NoteId>) -> NoteServiceResult<Vec<NoteRef>> {
        let mut refs = Vec::new();
        for id in ids {
            if let Some(note) = self.store.get_note(id)? {
                refs.push(NoteRef {
                    id: note.id,
                    title: note.title,
                });
            }
        }
        Ok(refs)
    }

    fn read_back(&self, id: NoteId, details: &'static str) -> NoteServiceResult<Note> {
        self.store
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(details))
    }
}
