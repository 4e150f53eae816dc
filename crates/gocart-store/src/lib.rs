//! # gocart-store: The Cart Store Service
//!
//! This crate ties the pure cart logic to durable storage: a cloneable
//! [`CartStore`] handle applies mutations, broadcasts every change to
//! subscribers, and keeps the persisted snapshot fresh from a background
//! worker.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         gocart Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Consumer Code                               │   │
//! │  │     add_to_cart / increment / decrement / subscribe             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gocart-store (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌───────────────┐   ┌───────────────┐    │   │
//! │  │   │   CartStore   │   │ save worker   │   │  StoreConfig  │    │   │
//! │  │   │  (store.rs)   │──►│  (one task,   │   │  (config.rs)  │    │   │
//! │  │   │  mutations +  │   │   newest      │   │  TOML + env   │    │   │
//! │  │   │  subscribers  │   │   snapshot)   │   │               │    │   │
//! │  │   └───────────────┘   └───────┬───────┘   └───────────────┘    │   │
//! │  └───────────────────────────────┼─────────────────────────────────┘   │
//! │                                  │                                      │
//! │  ┌───────────────────────────────▼─────────────────────────────────┐   │
//! │  │            gocart-persist (PersistenceBackend)                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - **Restore on open**: the persisted cart is back before the store is
//!   handed out; unreadable or malformed snapshots degrade to an empty cart
//! - **Fresh saves**: every persisted snapshot is the cart *after* the
//!   mutation that triggered it, saves run one at a time, and the newest
//!   snapshot always wins
//! - **No partial states**: subscribers and storage only ever see a cart
//!   that some sequence of mutations actually produced
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use gocart_persist::MemoryBackend;
//! use gocart_store::{CartStore, NewItem, StoreConfig};
//!
//! let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
//!
//! store.add_to_cart(NewItem::new("sku-1", "Espresso Beans", "beans.png", 12.5));
//! store.increment("sku-1");
//!
//! store.flush().await;      // wait for the snapshot to hit storage
//! store.shutdown().await;   // final drain, then the store is closed
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{DatabaseSettings, StoreConfig, StoreSettings, DEFAULT_STORAGE_KEY};
pub use error::{ConfigError, ConfigResult};
pub use store::CartStore;

// Core types that appear in the store's API surface
pub use gocart_core::{Cart, CartItem, NewItem};
