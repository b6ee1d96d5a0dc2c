//! Connection setup for the SQLite-backed garden.
//!
//! `open_db*` hands out connections that are already migrated, so
//! `SqliteNoteStore` never sees a half-built `notes` table. The schema
//! version lives in `PRAGMA user_version`; a file stamped by a newer
//! build is refused rather than downgraded.

use rusqlite::ErrorCode;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failures while opening or migrating a garden database.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The file was written by a build with a later schema.
    SchemaTooNew { found: u32, supported: u32 },
}

impl DbError {
    /// Lock contention from another connection; worth another attempt.
    pub fn is_busy(&self) -> bool {
        let Self::Sqlite(rusqlite::Error::SqliteFailure(err, _)) = self else {
            return false;
        };
        matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "garden database is at schema v{found}, this build reads up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::SchemaTooNew { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
