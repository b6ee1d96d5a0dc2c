//! Persistence boundary consumed by the link-graph engine.
//!
//! # Responsibility
//! - Define the lookup/scan/insert/update/delete contract over notes.
//! - Translate backend failures into semantic store errors.
//!
//! # Invariants
//! - `scan_notes` order is stable for an unchanged store.
//! - `insert_note` never overwrites an existing id.
//! - `update_fields` writes only the fields present in `NoteFields`.

use crate::db::DbError;
use crate::model::note::{Note, NoteFields, NoteId, NoteValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level error for note persistence.
#[derive(Debug)]
pub enum StoreError {
    /// Target id is absent.
    NotFound(NoteId),
    /// Insert collided with an existing id.
    DuplicateId(NoteId),
    Validation(NoteValidationError),
    Db(DbError),
    /// Persisted row cannot be decoded into a valid note.
    InvalidData(String),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl StoreError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Db(err) => err.is_busy(),
            _ => false,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "note id already exists: {id}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "note store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_)
            | Self::DuplicateId(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<NoteValidationError> for StoreError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Document-store contract the link-graph engine depends on.
pub trait NoteStore {
    /// Loads one note by id.
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>>;
    /// Returns every note in stable store order.
    fn scan_notes(&self) -> StoreResult<Vec<Note>>;
    /// Persists a new note. Fails with `DuplicateId` if present.
    fn insert_note(&mut self, note: &Note) -> StoreResult<()>;
    /// Writes present fields onto an existing note. Fails with `NotFound`.
    fn update_fields(&mut self, id: NoteId, fields: &NoteFields) -> StoreResult<()>;
    /// Removes one note. Fails with `NotFound`.
    fn delete_note(&mut self, id: NoteId) -> StoreResult<()>;
}
