//! SQLite backing for the key-value store.
//!
//! Connections handed out here are migrated before use: `open_db` and
//! `open_db_in_memory` fail rather than return a database the binary does
//! not understand. The schema version lives in `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the notes database.
#[derive(Debug)]
pub enum DbError {
    /// Engine-level failure (file access, locking, SQL).
    Engine(rusqlite::Error),
    /// The file was migrated by a newer build; it is left untouched.
    SchemaTooNew { found: u32, supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Engine(err) => write!(f, "sqlite: {err}"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "notes database uses schema v{found}; this build understands up to v{supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        if let Self::Engine(err) = self {
            Some(err)
        } else {
            None
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Engine(value)
    }
}
