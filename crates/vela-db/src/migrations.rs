//! # Schema Migrations
//!
//! The catalog schema ships inside the binary. `Database::new` applies any
//! pending script before the first read, so a fresh file and an old file
//! end up with the same `discounts` table.
//!
//! Scripts live in `migrations/sqlite/` at the workspace root and are named
//! `NNN_description.sql`. Applied scripts are recorded by checksum, so
//! changing one after release breaks startup; add a new script instead.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// How far a catalog's schema has caught up with the embedded scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationStatus {
    pub embedded: usize,
    pub applied: usize,
}

impl MigrationStatus {
    pub fn pending(&self) -> usize {
        self.embedded.saturating_sub(self.applied)
    }

    pub fn is_current(&self) -> bool {
        self.pending() == 0
    }
}

/// Applies every embedded script the catalog has not seen yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(scripts = MIGRATOR.migrations.len(), "Catalog schema up to date");
    Ok(())
}

/// Compares the embedded scripts with those recorded as applied.
///
/// Only meaningful after `run_migrations`, which creates the bookkeeping table.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<MigrationStatus> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok(MigrationStatus {
        embedded: MIGRATOR.migrations.len(),
        applied: usize::try_from(applied).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_new_catalog_is_current() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let status = migration_status(db.pool()).await.unwrap();
        assert!(status.embedded >= 1);
        assert!(status.is_current());
    }

    #[tokio::test]
    async fn test_rerun_is_a_no_op() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        let status = migration_status(db.pool()).await.unwrap();
        assert_eq!(status.applied, status.embedded);
    }

    #[test]
    fn test_pending_count() {
        let status = MigrationStatus {
            embedded: 3,
            applied: 1,
        };
        assert_eq!(status.pending(), 2);
        assert!(!status.is_current());
    }
}
