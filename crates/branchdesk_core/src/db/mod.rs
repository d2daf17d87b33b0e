//! Branch store bootstrap.
//!
//! # Responsibility
//! - Hand out SQLite connections that are ready for the branch repositories:
//!   foreign keys on, SQL helper functions registered, schema migrated.
//! - Report connection and schema failures as [`DbError`].
//!
//! # Invariants
//! - The schema version lives in `PRAGMA user_version`; a file written by a
//!   newer build is refused instead of being downgraded.
//! - Branch rows are never read or written before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
pub(crate) use open::UNICODE_LOWER_FN;

pub type DbResult<T> = Result<T, DbError>;

/// Failure to open, configure or migrate the branch store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
