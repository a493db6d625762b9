//! Schema migrations for the settings database.
//!
//! # Invariants
//! - Steps are listed in strictly increasing `version` order.
//! - The applied version lives in `PRAGMA user_version`.
//! - All pending steps are applied in one transaction or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct MigrationStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const STEPS: &[MigrationStep] = &[MigrationStep {
    version: 1,
    name: "settings",
    sql: include_str!("0001_settings.sql"),
}];

/// Returns the newest schema version this build can write.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |step| step.version)
}

/// Brings `conn` up to [`latest_version`].
///
/// # Errors
/// - `DbError::SchemaTooNew` when the file was written by a newer build.
/// - `DbError::Migration` naming the failing step; nothing is committed in
///   that case.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    if found > latest {
        return Err(DbError::SchemaTooNew {
            found,
            supported: latest,
        });
    }

    let pending: Vec<&MigrationStep> = STEPS.iter().filter(|step| step.version > found).collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in &pending {
        tx.execute_batch(step.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", step.version))
            .map_err(|source| DbError::Migration {
                version: step.version,
                name: step.name,
                source,
            })?;
    }
    tx.commit()?;

    for step in pending {
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            step.version, step.name
        );
    }
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
