//! Case-insensitive title resolution.
//!
//! # Invariants
//! - Comparison uses Unicode lowercasing on both sides, independent of locale.
//! - The first match in store scan order wins. Titles are not unique, so
//!   multiple matches are reported as a warning and otherwise tolerated.

use crate::model::note::Note;
use crate::repo::note_store::{NoteStore, StoreResult};
use log::warn;

/// Returns whether two titles are equal ignoring case.
pub fn titles_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}

/// Returns every note whose title matches `title`, in scan order.
pub fn title_matches<S: NoteStore + ?Sized>(store: &S, title: &str) -> StoreResult<Vec<Note>> {
    Ok(store
        .scan_notes()?
        .into_iter()
        .filter(|note| titles_match(&note.title, title))
        .collect())
}

/// Resolves `title` to the first matching note, if any.
pub fn resolve_title<S: NoteStore + ?Sized>(store: &S, title: &str) -> StoreResult<Option<Note>> {
    let mut matches = title_matches(store, title)?.into_iter();
    let first = matches.next();
    let extra = matches.count();
    if let Some(note) = first.as_ref() {
        if extra > 0 {
            warn!(
                "event=title_ambiguous module=link status=ok resolved_id={} candidates={}",
                note.id,
                extra + 1
            );
        }
    }
    Ok(first)
}
