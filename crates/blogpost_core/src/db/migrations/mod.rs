//! Schema migration registry for the blog post store.
//!
//! # Invariants
//! - Versions start at 1 and increase by exactly one per entry.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - All pending steps run in one transaction; a failing step leaves the
//!   database at its previous version.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    // Store-assigned ids must never be handed out twice, even after the
    // highest row is deleted.
    Migration {
        version: 2,
        name: "autoincrement_ids",
        sql: include_str!("0002_autoincrement_ids.sql"),
    },
];

/// Returns the latest schema version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Brings the connection's schema up to `latest_version()`.
///
/// Returns the number of migration steps applied (0 when already current).
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the database is newer than this binary.
/// - `Migration` naming the step whose SQL failed.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from_version = current_user_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending = pending_migrations(from_version);
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in pending {
        debug!(
            "event=db_migrate_step module=db version={} name={}",
            migration.version, migration.name
        );
        tx.execute_batch(migration.sql)
            .and_then(|()| {
                tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))
            })
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={from_version} to_version={latest} steps={}",
        pending.len()
    );
    Ok(pending.len())
}

fn pending_migrations(from_version: u32) -> &'static [Migration] {
    let applied = MIGRATIONS
        .iter()
        .take_while(|migration| migration.version <= from_version)
        .count();
    &MIGRATIONS[applied..]
}

#[cfg(test)]
mod tests {
    use super::{latest_version, pending_migrations, MIGRATIONS};

    #[test]
    fn versions_are_contiguous_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1, "{}", migration.name);
        }
    }

    #[test]
    fn pending_migrations_skips_applied_versions() {
        assert_eq!(pending_migrations(0).len(), MIGRATIONS.len());
        assert_eq!(pending_migrations(1)[0].version, 2);
        assert!(pending_migrations(latest_version()).is_empty());
    }
}
