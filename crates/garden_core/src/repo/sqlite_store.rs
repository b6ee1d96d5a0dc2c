//! SQLite-backed note store.
//!
//! # Responsibility
//! - Persist notes in the `notes` table with edge sets as JSON arrays.
//! - Keep SQL details behind the `NoteStore` contract.
//!
//! # Invariants
//! - Scan order is insertion order (`rowid ASC`).
//! - Write paths call `Note::validate()` on the resulting record before
//!   SQL mutations, so partial updates are checked like inserts.
//! - Read paths reject undecodable rows instead of masking them.

use crate::db::migrations::{current_version, latest_version};
use crate::model::note::{BacklinkSet, Note, NoteFields, NoteId};
use crate::repo::note_store::{NoteStore, StoreError, StoreResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

const NOTE_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    content,
    parent_uuid,
    tags,
    created_at,
    updated_at,
    links,
    backlinks
FROM notes";

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        let expected_version = latest_version();
        let actual_version = current_version(conn)?;
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn get_note(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }
        Ok(None)
    }

    fn scan_notes(&self) -> StoreResult<Vec<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} ORDER BY rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    fn insert_note(&mut self, note: &Note) -> StoreResult<()> {
        note.validate()?;

        let changed = self.conn.execute(
            "INSERT OR IGNORE INTO notes (
                uuid,
                title,
                content,
                parent_uuid,
                tags,
                created_at,
                updated_at,
                links,
                backlinks
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                note.id.to_string(),
                note.title.as_str(),
                note.content.as_str(),
                note.parent_id.map(|id| id.to_string()),
                encode_json("tags", &note.tags)?,
                note.created_at,
                note.updated_at,
                encode_json("links", &note.links)?,
                encode_json("backlinks", &note.backlinks)?,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::DuplicateId(note.id));
        }
        Ok(())
    }

    fn update_fields(&mut self, id: NoteId, fields: &NoteFields) -> StoreResult<()> {
        let mut updated = self.get_note(id)?.ok_or(StoreError::NotFound(id))?;
        updated.apply_fields(fields);
        updated.validate()?;

        let mut assignments: Vec<&'static str> = Vec::new();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = fields.title.as_ref() {
            assignments.push("title = ?");
            bind_values.push(Value::Text(title.clone()));
        }
        if let Some(content) = fields.content.as_ref() {
            assignments.push("content = ?");
            bind_values.push(Value::Text(content.clone()));
        }
        if let Some(parent_id) = fields.parent_id {
            assignments.push("parent_uuid = ?");
            bind_values.push(match parent_id {
                Some(parent) => Value::Text(parent.to_string()),
                None => Value::Null,
            });
        }
        if let Some(tags) = fields.tags.as_ref() {
            assignments.push("tags = ?");
            bind_values.push(Value::Text(encode_json("tags", tags)?));
        }
        if let Some(updated_at) = fields.updated_at {
            assignments.push("updated_at = ?");
            bind_values.push(Value::Integer(updated_at));
        }
        if let Some(links) = fields.links.as_ref() {
            assignments.push("links = ?");
            bind_values.push(Value::Text(encode_json("links", links)?));
        }
        if let Some(backlinks) = fields.backlinks.as_ref() {
            assignments.push("backlinks = ?");
            bind_values.push(Value::Text(encode_json("backlinks", backlinks)?));
        }

        if assignments.is_empty() {
            return Ok(());
        }

        let sql = format!("UPDATE notes SET {} WHERE uuid = ?;", assignments.join(", "));
        bind_values.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn delete_note(&mut self, id: NoteId) -> StoreResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_note_row(row: &Row<'_>) -> StoreResult<Note> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "notes.uuid")?;
    let parent_id = match row.get::<_, Option<String>>("parent_uuid")? {
        Some(value) => Some(parse_uuid(&value, "notes.parent_uuid")?),
        None => None,
    };
    let tags: Vec<String> = decode_json("tags", &row.get::<_, String>("tags")?)?;
    let links: Vec<NoteId> = decode_json("links", &row.get::<_, String>("links")?)?;
    let backlinks: BacklinkSet = decode_json("backlinks", &row.get::<_, String>("backlinks")?)?;

    let note = Note {
        id,
        title: row.get("title")?,
        content: row.get("content")?,
        parent_id,
        tags,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        links,
        backlinks,
    };
    note.validate()?;
    Ok(note)
}

fn parse_uuid(value: &str, column: &str) -> StoreResult<NoteId> {
    Uuid::parse_str(value)
        .map_err(|_| StoreError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

fn encode_json<T: Serialize + ?Sized>(column: &str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value)
        .map_err(|err| StoreError::InvalidData(format!("cannot encode notes.{column}: {err}")))
}

fn decode_json<T: DeserializeOwned>(column: &str, raw: &str) -> StoreResult<T> {
    serde_json::from_str(raw)
        .map_err(|err| StoreError::InvalidData(format!("cannot decode notes.{column}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::SqliteNoteStore;
    use crate::db::open_db_in_memory;
    use crate::model::note::{BacklinkSet, Note, NoteFields, NoteValidationError};
    use crate::repo::note_store::{NoteStore, StoreError};
    use rusqlite::Connection;

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteNoteStore::try_new(&conn).err().unwrap();
        assert!(matches!(
            err,
            StoreError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn update_fields_leaves_absent_columns_untouched() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteNoteStore::try_new(&conn).unwrap();
        let mut note = Note::new("Projects", "body", 10);
        note.tags = vec!["work".to_string()];
        note.links = vec![note.id];
        store.insert_note(&note).unwrap();

        let source = Note::new("Home", "", 10).id;
        let backlinks = BacklinkSet::from(vec![source]);
        store
            .update_fields(note.id, &NoteFields::backlinks(backlinks.clone()))
            .unwrap();

        let loaded = store.get_note(note.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Projects");
        assert_eq!(loaded.content, "body");
        assert_eq!(loaded.tags, vec!["work".to_string()]);
        assert_eq!(loaded.links, vec![note.id]);
        assert_eq!(loaded.backlinks, backlinks);
    }

    #[test]
    fn parent_can_be_set_and_cleared() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteNoteStore::try_new(&conn).unwrap();
        let parent = Note::new("Parent", "", 1);
        let child = Note::new("Child", "", 1);
        store.insert_note(&parent).unwrap();
        store.insert_note(&child).unwrap();

        let set_parent = NoteFields {
            parent_id: Some(Some(parent.id)),
            ..NoteFields::default()
        };
        store.update_fields(child.id, &set_parent).unwrap();
        assert_eq!(
            store.get_note(child.id).unwrap().unwrap().parent_id,
            Some(parent.id)
        );

        let clear_parent = NoteFields {
            parent_id: Some(None),
            ..NoteFields::default()
        };
        store.update_fields(child.id, &clear_parent).unwrap();
        assert_eq!(store.get_note(child.id).unwrap().unwrap().parent_id, None);
    }

    #[test]
    fn update_fields_rejects_updated_at_before_created_at() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteNoteStore::try_new(&conn).unwrap();
        let note = Note::new("Dated", "", 100);
        store.insert_note(&note).unwrap();

        let rewind = NoteFields {
            updated_at: Some(50),
            ..NoteFields::default()
        };
        let err = store.update_fields(note.id, &rewind).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(NoteValidationError::InvalidTimestamps { .. })
        ));
        assert_eq!(store.get_note(note.id).unwrap().unwrap().updated_at, 100);
    }

    #[test]
    fn corrupted_json_column_is_reported() {
        let conn = open_db_in_memory().unwrap();
        let mut store = SqliteNoteStore::try_new(&conn).unwrap();
        let note = Note::new("Broken", "", 1);
        store.insert_note(&note).unwrap();
        conn.execute(
            "UPDATE notes SET links = 'not json' WHERE uuid = ?1;",
            [note.id.to_string()],
        )
        .unwrap();

        let err = store.get_note(note.id).unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(message) if message.contains("notes.links")));
    }
}
