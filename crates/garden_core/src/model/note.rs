//! Note domain model.
//!
//! # Responsibility
//! - Define the single persisted entity of the garden and its edge sets.
//! - Provide explicit partial-update shapes for caller and store writes.
//!
//! # Invariants
//! - `id` is stable and never reused for another note.
//! - `backlinks` never holds the same id twice and iterates in id order.
//! - `updated_at` is not earlier than `created_at`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a note.
pub type NoteId = Uuid;

/// Title used when a caller creates a note without one.
pub const DEFAULT_NOTE_TITLE: &str = "Untitled";

/// Validation failures for note records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Nil UUID cannot identify a note.
    NilId,
    /// `updated_at` precedes `created_at`.
    InvalidTimestamps { created_at: i64, updated_at: i64 },
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "note id must not be nil"),
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must be >= created_at ({created_at})"
            ),
        }
    }
}

impl Error for NoteValidationError {}

/// Set of note ids referencing one note, ordered by id.
///
/// Serialized as a plain sorted array. An update tears the owner's edges
/// down and adds them back; in id order that reproduces the same encoding,
/// where an insertion-ordered list would move the owner to the end.
/// Readers therefore see referrers in id order, not link order.
/// Duplicates in a decoded array collapse to one entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<NoteId>", into = "Vec<NoteId>")]
pub struct BacklinkSet {
    ids: BTreeSet<NoteId>,
}

impl BacklinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` when absent. Returns `true` if the set changed.
    pub fn insert(&mut self, id: NoteId) -> bool {
        self.ids.insert(id)
    }

    /// Removes `id` when present. Returns `true` if the set changed.
    pub fn remove(&mut self, id: NoteId) -> bool {
        self.ids.remove(&id)
    }

    pub fn contains(&self, id: NoteId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NoteId> + '_ {
        self.ids.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<NoteId> {
        self.iter().collect()
    }
}

impl From<Vec<NoteId>> for BacklinkSet {
    fn from(value: Vec<NoteId>) -> Self {
        value.into_iter().collect()
    }
}

impl From<BacklinkSet> for Vec<NoteId> {
    fn from(value: BacklinkSet) -> Self {
        value.ids.into_iter().collect()
    }
}

impl FromIterator<NoteId> for BacklinkSet {
    fn from_iter<T: IntoIterator<Item = NoteId>>(iter: T) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

/// Canonical persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Display title. Not unique.
    pub title: String,
    /// Raw text, may contain `[[Title]]` reference markers.
    pub content: String,
    /// Weak hierarchy pointer. Never validated or cascaded.
    pub parent_id: Option<NoteId>,
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
    /// Referenced note ids in marker order. May repeat.
    pub links: Vec<NoteId>,
    /// Ids of notes currently referencing this one.
    pub backlinks: BacklinkSet,
}

impl Note {
    /// Creates a note with a generated id and empty edge sets.
    pub fn new(title: impl Into<String>, content: impl Into<String>, now_ms: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, content, now_ms)
    }

    /// Creates a note with a caller-provided id and empty edge sets.
    pub fn with_id(
        id: NoteId,
        title: impl Into<String>,
        content: impl Into<String>,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            parent_id: None,
            tags: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
            links: Vec::new(),
            backlinks: BacklinkSet::new(),
        }
    }

    /// Checks record-level invariants before persistence.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.id.is_nil() {
            return Err(NoteValidationError::NilId);
        }
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }

    /// Whether this note has no body, as stubs do until edited.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Applies a store-level field write in place.
    pub fn apply_fields(&mut self, fields: &NoteFields) {
        if let Some(title) = fields.title.as_ref() {
            self.title = title.clone();
        }
        if let Some(content) = fields.content.as_ref() {
            self.content = content.clone();
        }
        if let Some(parent_id) = fields.parent_id {
            self.parent_id = parent_id;
        }
        if let Some(tags) = fields.tags.as_ref() {
            self.tags = tags.clone();
        }
        if let Some(updated_at) = fields.updated_at {
            self.updated_at = updated_at;
        }
        if let Some(links) = fields.links.as_ref() {
            self.links = links.clone();
        }
        if let Some(backlinks) = fields.backlinks.as_ref() {
            self.backlinks = backlinks.clone();
        }
    }
}

/// Creation request accepted by the note service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewNote {
    /// Falls back to [`DEFAULT_NOTE_TITLE`] only when absent; an explicit
    /// empty title is kept.
    pub title: Option<String>,
    pub content: String,
    pub parent_id: Option<NoteId>,
    pub tags: Vec<String>,
}

impl NewNote {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: content.into(),
            ..Self::default()
        }
    }

    /// Effective title after defaulting.
    pub fn resolved_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| DEFAULT_NOTE_TITLE.to_string())
    }
}

/// Caller-level partial update. Absent fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    /// `Some(None)` clears the parent, `None` keeps it.
    pub parent_id: Option<Option<NoteId>>,
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

/// Store-level partial field write. Only present fields are persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub parent_id: Option<Option<NoteId>>,
    pub tags: Option<Vec<String>>,
    pub updated_at: Option<i64>,
    pub links: Option<Vec<NoteId>>,
    pub backlinks: Option<BacklinkSet>,
}

impl NoteFields {
    /// Write touching only the backlink set.
    pub fn backlinks(backlinks: BacklinkSet) -> Self {
        Self {
            backlinks: Some(backlinks),
            ..Self::default()
        }
    }
}

/// Display pair for a resolved edge endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRef {
    pub id: NoteId,
    pub title: String,
}

/// Read model for one note with resolved edge endpoints.
///
/// Ids that no longer resolve are dropped from both detail lists while
/// the raw `note.links` / `note.backlinks` stay untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteView {
    #[serde(flatten)]
    pub note: Note,
    pub link_details: Vec<NoteRef>,
    pub backlink_details: Vec<NoteRef>,
}
