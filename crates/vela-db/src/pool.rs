//! # Catalog Pool
//!
//! Opens the SQLite catalog and hands out repositories.
//!
//! ```text
//!  DbConfig { path, max_connections }
//!       │
//!       ▼
//!  Database::new ──► SqlitePool ──► embedded migrations
//!       │
//!       ├── discounts() ──► DiscountRepository (clones the pool handle)
//!       ├── health_check()
//!       └── close()
//! ```
//!
//! The engine only reads the catalog while serving, so a file-backed pool
//! runs in WAL mode and every request can hold its own connection. An
//! in-memory catalog lives inside a single connection, which is therefore
//! never reaped.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::discount::DiscountRepository;

const IN_MEMORY: &str = ":memory:";

/// How long a catalog read may wait for a free connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the catalog lives and how many readers it serves at once.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/vela/vela.db").max_connections(8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a throwaway catalog.
    pub database_path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// A private catalog for tests. Always a single connection.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

/// Handle to the discount catalog.
///
/// Clones share one pool, so the API keeps a single handle in its state.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the catalog and brings its schema up to date.
    ///
    /// ## Errors
    /// * `DbError::ConnectionFailed` - the file cannot be opened or created
    /// * `DbError::MigrationFailed` - an embedded migration did not apply
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            max_connections = config.max_connections,
            "Opening discount catalog"
        );

        let pool = if config.is_in_memory() {
            let options = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await
        } else {
            let options = SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal);

            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(ACQUIRE_TIMEOUT)
                .connect_with(options)
                .await
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Catalog pool connected");

        migrations::run_migrations(&pool).await?;

        Ok(Database { pool })
    }

    /// The raw pool, for maintenance queries outside the repository.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn discounts(&self) -> DiscountRepository {
        DiscountRepository::new(self.pool.clone())
    }

    /// Closes every connection. Later reads fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing discount catalog");
        self.pool.close().await;
    }

    /// True when the catalog answers a trivial query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);
    }

    #[tokio::test]
    async fn test_in_memory_starts_empty() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.discounts().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_health_check_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }

    #[tokio::test]
    async fn test_closed_catalog_reads_fail() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(matches!(
            db.discounts().count().await,
            Err(DbError::ConnectionFailed(_))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = DbConfig::new("/tmp/vela.db");
        assert_eq!(config.max_connections, 5);
        assert!(!config.is_in_memory());

        let config = config.max_connections(12);
        assert_eq!(config.max_connections, 12);

        let memory = DbConfig::in_memory();
        assert!(memory.is_in_memory());
        assert_eq!(memory.max_connections, 1);
    }
}
