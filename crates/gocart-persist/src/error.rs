//! # Storage Error Types
//!
//! Error types for snapshot storage operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StorageError (this module) ← Adds context and categorization           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartStore ← load: log + fall back to empty cart                        │
//! │            ← save: log + count; in-memory cart keeps going              │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Snapshot storage errors.
///
/// These errors wrap sqlx errors and provide additional context. The store
/// never aborts on them: a failed load becomes an empty cart and a failed
/// save is logged and counted.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Opening the backend failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    /// - Schema incompatibility
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A load or save query failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// The backend exists but cannot serve requests right now.
    ///
    /// ## When This Occurs
    /// - Connection pool exhausted or closed
    /// - Backend shut down while a save was queued
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Convert sqlx errors to StorageError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::PoolTimedOut   → StorageError::Unavailable
/// sqlx::Error::PoolClosed     → StorageError::Unavailable
/// sqlx::Error::Database       → StorageError::QueryFailed
/// Other                       → StorageError::QueryFailed
/// ```
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => {
                StorageError::Unavailable("Connection pool exhausted".to_string())
            }
            sqlx::Error::PoolClosed => StorageError::Unavailable("Pool is closed".to_string()),
            sqlx::Error::Database(db_err) => StorageError::QueryFailed(db_err.message().to_string()),
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StorageError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StorageError::MigrationFailed(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
