//! Runtime configuration resolved from the process environment.
//!
//! # Invariants
//! - Blank or unparsable values fall back to defaults; resolution never fails.

use crate::logging::{default_log_level, parse_level};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "CHILLNOTE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "CHILLNOTE_LOG_LEVEL";
const DEFAULT_DB_FILE_NAME: &str = "chillnote.sqlite3";

/// Settings shared by the FFI layer and the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the notes blob.
    pub db_path: PathBuf,
    /// Normalized `trace|debug|info|warn|error`.
    pub log_level: &'static str,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = non_blank(lookup(DB_PATH_ENV))
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = non_blank(lookup(LOG_LEVEL_ENV))
            .and_then(|raw| parse_level(&raw).ok())
            .unwrap_or_else(default_log_level);

        Self { db_path, log_level }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
