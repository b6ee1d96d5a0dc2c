//! Core domain logic for the note garden.
//! This crate owns the link/backlink graph invariants between notes.

pub mod db;
pub mod link;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use link::parser::{parse_references, references};
pub use link::sync::{GraphSynchronizer, SyncOptions};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::note::{
    BacklinkSet, NewNote, Note, NoteFields, NoteId, NotePatch, NoteRef, NoteValidationError,
    NoteView, DEFAULT_NOTE_TITLE,
};
pub use repo::memory_store::InMemoryNoteStore;
pub use repo::note_store::{NoteStore, StoreError, StoreResult};
pub use repo::sqlite_store::SqliteNoteStore;
pub use service::note_service::{
    system_clock, Clock, NoteService, NoteServiceError, NoteServiceResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
