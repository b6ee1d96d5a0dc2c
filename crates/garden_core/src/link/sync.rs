//! Forward-link and backlink edge synchronization.
//!
//! # Responsibility
//! - Turn note content into an ordered forward-link list.
//! - Keep every target's backlink set in step with its referrers.
//!
//! # Invariants
//! - References are processed strictly left-to-right; each one is resolved
//!   (or stubbed) and its backlink written before the next is looked at.
//! - A stub inserted for one marker is visible to later markers of the same
//!   pass, so repeated unknown titles produce a single stub.
//! - Backlink writes touch only the target's `backlinks` field.
//! - Busy/locked store failures on backlink writes are retried up to
//!   `SyncOptions::backlink_retry_limit` extra attempts.

use crate::link::parser::{malformed_markers, references};
use crate::link::resolver::resolve_title;
use crate::link::stub::create_stub;
use crate::model::note::{BacklinkSet, NoteFields, NoteId};
use crate::repo::note_store::{NoteStore, StoreError, StoreResult};
use log::warn;

const DEFAULT_BACKLINK_RETRY_LIMIT: u32 = 3;

/// Tuning knobs for edge synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    /// Extra attempts for a backlink write that failed with a retryable error.
    pub backlink_retry_limit: u32,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            backlink_retry_limit: DEFAULT_BACKLINK_RETRY_LIMIT,
        }
    }
}

/// Edge synchronizer bound to one store for the duration of an operation.
pub struct GraphSynchronizer<'s, S: NoteStore + ?Sized> {
    store: &'s mut S,
    options: SyncOptions,
}

impl<'s, S: NoteStore + ?Sized> GraphSynchronizer<'s, S> {
    pub fn new(store: &'s mut S, options: SyncOptions) -> Self {
        Self { store, options }
    }

    /// Resolves every marker in `content` and records `owner` as a backlink
    /// on each target.
    ///
    /// Returns target ids in marker order, repeats included. The caller must
    /// store the result as the owner's `links`, replacing the old value.
    /// Unknown titles are materialized as stubs stamped with `now_ms`.
    pub fn sync_links(
        &mut self,
        owner: NoteId,
        content: &str,
        now_ms: i64,
    ) -> StoreResult<Vec<NoteId>> {
        let malformed = malformed_markers(content);
        if !malformed.is_empty() {
            warn!(
                "event=reference_malformed module=link status=skipped note_id={} count={}",
                owner,
                malformed.len()
            );
        }

        let mut linked = Vec::new();
        for reference in references(content) {
            let target = match resolve_title(&*self.store, reference)? {
                Some(note) => note,
                None => create_stub(&mut *self.store, reference, now_ms)?,
            };
            linked.push(target.id);
            self.add_backlink(target.id, owner)?;
        }
        Ok(linked)
    }

    /// Removes `owner` from the backlinks of every id in `links`.
    ///
    /// Targets that no longer exist are skipped. Returns how many backlink
    /// sets changed.
    pub fn teardown_outgoing(&mut self, owner: NoteId, links: &[NoteId]) -> StoreResult<usize> {
        let mut changed = 0;
        for target in links {
            if self.remove_backlink(*target, owner)? {
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Adds `source` to `target.backlinks` unless already present.
    pub fn add_backlink(&mut self, target: NoteId, source: NoteId) -> StoreResult<bool> {
        self.edit_backlinks(target, |backlinks| backlinks.insert(source))
    }

    /// Removes `source` from `target.backlinks` when present.
    pub fn remove_backlink(&mut self, target: NoteId, source: NoteId) -> StoreResult<bool> {
        self.edit_backlinks(target, |backlinks| backlinks.remove(source))
    }

    fn edit_backlinks(
        &mut self,
        target: NoteId,
        edit: impl Fn(&mut BacklinkSet) -> bool,
    ) -> StoreResult<bool> {
        let mut attempt = 0;
        loop {
            match self.try_edit_backlinks(target, &edit) {
                Err(err) if err.is_retryable() && attempt < self.options.backlink_retry_limit => {
                    attempt += 1;
                    warn!(
                        "event=backlink_persist_retry module=link status=retry note_id={} attempt={} error={}",
                        target, attempt, err
                    );
                }
                other => return other,
            }
        }
    }

    fn try_edit_backlinks(
        &mut self,
        target: NoteId,
        edit: &impl Fn(&mut BacklinkSet) -> bool,
    ) -> StoreResult<bool> {
        let Some(note) = self.store.get_note(target)? else {
            return Ok(false);
        };
        let mut backlinks = note.backlinks;
        if !edit(&mut backlinks) {
            return Ok(false);
        }
        match self
            .store
            .update_fields(target, &NoteFields::backlinks(backlinks))
        {
            Ok(()) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
