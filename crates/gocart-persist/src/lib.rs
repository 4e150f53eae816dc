//! # gocart-persist: Storage Layer for gocart
//!
//! This crate provides durable storage for cart snapshots. A snapshot is an
//! opaque string filed under a storage key; backends never look inside it.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gocart Data Flow                                │
//! │                                                                         │
//! │  CartStore persistence worker                                           │
//! │       │  load(key) on open, save(key, payload) after mutations          │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gocart-persist (THIS CRATE)                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────────┐   ┌───────────────┐   ┌─────────────┐  │   │
//! │  │   │PersistenceBackend │   │ SqliteBackend │   │ Migrations  │  │   │
//! │  │   │   (backend.rs)    │   │  (sqlite.rs)  │   │ (embedded)  │  │   │
//! │  │   │                   │   │               │   │             │  │   │
//! │  │   │ load / save       │◄──│ SqlitePool    │   │ 001_cart_   │  │   │
//! │  │   │ (async trait)     │   │ upsert slot   │   │ snapshots   │  │   │
//! │  │   │                   │◄──│ MemoryBackend │   │             │  │   │
//! │  │   └───────────────────┘   └───────────────┘   └─────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/gocart/cart.db (or in-memory for tests)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`backend`] - The `PersistenceBackend` trait
//! - [`memory`] - In-memory backend for tests and ephemeral carts
//! - [`sqlite`] - SQLite-backed snapshot storage
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gocart_persist::{PersistenceBackend, SqliteBackend, SqliteConfig};
//!
//! let backend = SqliteBackend::new(SqliteConfig::new("path/to/cart.db")).await?;
//!
//! backend.save("@gocart:cart-items", "[]").await?;
//! let payload = backend.load("@gocart:cart-items").await?;
//! assert_eq!(payload.as_deref(), Some("[]"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod backend;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;

// =============================================================================
// Re-exports
// =============================================================================

pub use backend::PersistenceBackend;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryBackend;
pub use sqlite::{SqliteBackend, SqliteConfig};
