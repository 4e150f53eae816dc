//! # SQLite Backend
//!
//! Connection pool creation, configuration and the snapshot slot queries.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      SQLite Snapshot Storage                            │
//! │                                                                         │
//! │  App Startup                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteConfig::new(path) ← Configure pool settings                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SqliteBackend::new(config).await ← Create pool + run migrations        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────┐                            │
//! │  │            SqlitePool                   │                            │
//! │  │  ┌─────┐ ┌─────┐ ┌─────┐ ┌─────┐        │                            │
//! │  │  │Conn1│ │Conn2│ │Conn3│ │Conn4│ ...    │  (max_connections)         │
//! │  │  └─────┘ └─────┘ └─────┘ └─────┘        │                            │
//! │  └─────────────────────────────────────────┘                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart_snapshots table: key ─► payload (whole-value upsert)              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## WAL Mode
//! SQLite WAL (Write-Ahead Logging) mode is enabled for:
//! - Better concurrent read performance
//! - Readers don't block writers
//! - Better crash recovery

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::error::{StorageError, StorageResult};
use crate::migrations;

/// Special path that keeps the database in process memory.
const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// SQLite backend configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = SqliteConfig::new("/path/to/cart.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct SqliteConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5 (a single cart writer needs few)
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl SqliteConfig {
    /// Creates a new configuration with the given path.
    ///
    /// ## Arguments
    /// * `path` - Path to the SQLite database file. Created if it doesn't
    ///   exist, parent directory included.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        SqliteConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Sets the maximum number of connections.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Sets the minimum number of connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Sets the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets whether to run migrations on connect.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let backend = SqliteBackend::new(SqliteConfig::in_memory()).await?;
    /// // Backend is isolated, perfect for tests
    /// ```
    pub fn in_memory() -> Self {
        SqliteConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1, // In-memory requires single connection
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }

    /// Checks whether this configuration targets an in-memory database.
    fn is_in_memory(&self) -> bool {
        self.database_path == Path::new(MEMORY_PATH)
    }
}

// =============================================================================
// Backend
// =============================================================================

/// SQLite-backed snapshot storage.
///
/// One row per storage key in the `cart_snapshots` table; every save is a
/// whole-value upsert, so the stored payload is always the latest one the
/// store handed over.
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    /// The SQLite connection pool.
    pool: SqlitePool,
}

impl SqliteBackend {
    /// Creates a new SQLite backend.
    ///
    /// ## What This Does
    /// 1. Creates the database file (and parent directory) if missing
    /// 2. Configures SQLite for a local single-writer workload:
    ///    - WAL mode for concurrent reads
    ///    - NORMAL synchronous (balance of safety/speed)
    ///    - Foreign keys enabled
    /// 3. Creates the connection pool
    /// 4. Runs migrations (if enabled)
    ///
    /// ## Returns
    /// * `Ok(SqliteBackend)` - Ready-to-use backend
    /// * `Err(StorageError)` - Connection or migration failed
    ///
    /// ## Example
    /// ```rust,ignore
    /// let backend = SqliteBackend::new(SqliteConfig::new("./cart.db")).await?;
    /// ```
    pub async fn new(config: SqliteConfig) -> StorageResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing snapshot database"
        );

        // SQLite creates the file but not the directory above it.
        if !config.is_in_memory() {
            if let Some(parent) = config.database_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)
                        .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;
                }
            }
        }

        let connect_options = SqliteConnectOptions::new()
            .filename(&config.database_path)
            // Create file if it doesn't exist
            .create_if_missing(true)
            // WAL mode: Better concurrent read performance
            .journal_mode(SqliteJournalMode::Wal)
            // NORMAL synchronous: Good balance of durability and speed
            .synchronous(SqliteSynchronous::Normal)
            // Enable foreign key constraints
            // SQLite has them disabled by default for backwards compatibility
            .foreign_keys(true);

        debug!("Connection options configured");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Snapshot database pool created"
        );

        let backend = SqliteBackend { pool };

        if config.run_migrations {
            backend.run_migrations().await?;
        }

        Ok(backend)
    }

    /// Opens a backend at the given path with default pool settings.
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        SqliteBackend::new(SqliteConfig::new(path)).await
    }

    /// Runs database migrations.
    ///
    /// ## What This Does
    /// - Applies all pending migrations in order
    /// - Tracks applied migrations in `_sqlx_migrations` table
    /// - Idempotent: safe to run multiple times
    pub async fn run_migrations(&self) -> StorageResult<()> {
        migrations::run(&self.pool).await
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes the connection pool.
    ///
    /// ## When To Call
    /// - On application shutdown, after the cart store has shut down
    ///
    /// ## Note
    /// After calling close, load and save will fail.
    pub async fn close(&self) {
        info!("Closing snapshot database pool");
        self.pool.close().await;
    }

    /// Checks if the database is healthy (can execute queries).
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Resolves the platform default database location.
    ///
    /// ## Resolution Order
    /// 1. `GOCART_DB_PATH` environment variable
    /// 2. The platform data directory (e.g. `~/.local/share/gocart/cart.db`)
    ///
    /// ## Returns
    /// `None` when no home directory can be determined.
    pub fn default_database_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GOCART_DB_PATH") {
            return Some(PathBuf::from(path));
        }

        directories::ProjectDirs::from("dev", "gocart", "gocart")
            .map(|dirs| dirs.data_dir().join("cart.db"))
    }
}

#[async_trait]
impl PersistenceBackend for SqliteBackend {
    async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        let payload: Option<String> =
            sqlx::query_scalar("SELECT payload FROM cart_snapshots WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        debug!(key = %key, found = payload.is_some(), "Snapshot loaded");
        Ok(payload)
    }

    async fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO cart_snapshots (key, payload, updated_at) \
             VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET \
                 payload = excluded.payload, \
                 updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(payload)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = payload.len(), "Snapshot saved");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_backend_health() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();

        assert!(backend.health_check().await);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = SqliteConfig::new("/tmp/cart.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(config.run_migrations);
    }

    #[tokio::test]
    async fn test_load_missing_key_is_none() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();

        assert_eq!(backend.load("nothing-here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();

        backend.save("slot", r#"[{"id":"a"}]"#).await.unwrap();

        assert_eq!(
            backend.load("slot").await.unwrap().as_deref(),
            Some(r#"[{"id":"a"}]"#)
        );
    }

    #[tokio::test]
    async fn test_save_replaces_previous_payload() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();

        backend.save("slot", "old").await.unwrap();
        backend.save("slot", "new").await.unwrap();

        assert_eq!(backend.load("slot").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();

        backend.save("a", "payload-a").await.unwrap();
        backend.save("b", "payload-b").await.unwrap();

        assert_eq!(
            backend.load("a").await.unwrap().as_deref(),
            Some("payload-a")
        );
        assert_eq!(
            backend.load("b").await.unwrap().as_deref(),
            Some("payload-b")
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("cart.db");

        {
            let backend = SqliteBackend::open(&path).await.unwrap();
            backend.save("slot", "durable").await.unwrap();
            backend.close().await;
        }

        let backend = SqliteBackend::open(&path).await.unwrap();
        assert_eq!(
            backend.load("slot").await.unwrap().as_deref(),
            Some("durable")
        );
    }

    #[tokio::test]
    async fn test_queries_fail_after_close() {
        let backend = SqliteBackend::new(SqliteConfig::in_memory()).await.unwrap();
        backend.close().await;

        let err = backend.save("slot", "late").await.unwrap_err();
        assert!(matches!(err, StorageError::Unavailable(_)));
    }
}
