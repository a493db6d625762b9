//! SQLite-backed settings store.

use super::{validate_key, SettingsResult, SettingsStore};
use crate::db::{open_db, open_db_in_memory};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Settings persisted in the `settings` table of one SQLite file.
pub struct SqliteSettingsStore {
    conn: Connection,
}

impl SqliteSettingsStore {
    /// Wraps a connection that already has migrations applied.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> SettingsResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn value(&self, key: &str) -> SettingsResult<Option<String>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_value(&self, key: &str, value: &str) -> SettingsResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        debug!("event=settings_write module=settings status=ok key={key}");
        Ok(())
    }

    fn remove(&self, key: &str) -> SettingsResult<()> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1;", params![key])?;
        Ok(())
    }
}
