//! Persistent application settings.
//!
//! # Responsibility
//! - Provide a string key/value store that survives restarts.
//! - Own the key namespace used across the application.
//!
//! # Invariants
//! - Keys are `/`-separated segments of `[A-Za-z0-9_.-]`, never empty.
//! - Reads of unknown keys return `Ok(None)`, not an error.

mod sqlite_store;

pub use sqlite_store::SqliteSettingsStore;

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Path of the project that was opened most recently.
pub const LAST_OPEN_PROJECT_KEY: &str = "app/last_open_project";

pub type SettingsResult<T> = Result<T, SettingsError>;

#[derive(Debug)]
pub enum SettingsError {
    InvalidKey(String),
    Db(DbError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidKey(key) => write!(f, "invalid settings key `{key}`"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidKey(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for SettingsError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SettingsError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Query(value))
    }
}

/// Key/value settings contract.
///
/// Methods take `&self`; implementations are used from a single UI thread
/// and shared behind `Rc`.
pub trait SettingsStore {
    fn value(&self, key: &str) -> SettingsResult<Option<String>>;
    fn set_value(&self, key: &str, value: &str) -> SettingsResult<()>;
    fn remove(&self, key: &str) -> SettingsResult<()>;

    /// Reads `key`, falling back to `default` when unset.
    fn value_or(&self, key: &str, default: &str) -> SettingsResult<String> {
        Ok(self.value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

pub(crate) fn validate_key(key: &str) -> SettingsResult<()> {
    let valid = !key.is_empty()
        && key.split('/').all(|segment| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | '-'))
        });
    if valid {
        Ok(())
    } else {
        Err(SettingsError::InvalidKey(key.to_string()))
    }
}
