//! # The Persistence Backend Trait
//!
//! A backend is a string-keyed slot for the cart snapshot. The store writes
//! the whole snapshot on every save and reads it back once on open; there is
//! no append, no partial update, no history.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Backend Contract                                   │
//! │                                                                         │
//! │  load(key)                                                              │
//! │    ├── Ok(Some(payload))  key was saved before; last payload wins       │
//! │    ├── Ok(None)           key never saved (fresh install)               │
//! │    └── Err(_)             backend unreadable; store starts empty        │
//! │                                                                         │
//! │  save(key, payload)                                                     │
//! │    ├── Ok(())             payload replaces whatever was stored          │
//! │    └── Err(_)             logged and counted; cart state unaffected     │
//! │                                                                         │
//! │  NOTE: Payloads are opaque here. Validation belongs to the payload      │
//! │        decoder in gocart-core, never to a backend.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;

use crate::error::StorageResult;

/// Durable storage for cart snapshot payloads.
///
/// Implementations must be shareable across tasks; the store keeps one
/// behind an `Arc` and calls it from its persistence worker.
///
/// ## Implementing Your Own
/// ```rust,ignore
/// use async_trait::async_trait;
/// use gocart_persist::{PersistenceBackend, StorageResult};
///
/// struct RemoteBackend { /* client handle */ }
///
/// #[async_trait]
/// impl PersistenceBackend for RemoteBackend {
///     async fn load(&self, key: &str) -> StorageResult<Option<String>> {
///         // fetch the stored payload, None when the key is absent
///         # unimplemented!()
///     }
///
///     async fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
///         // replace the stored payload for this key
///         # unimplemented!()
///     }
/// }
/// ```
#[async_trait]
pub trait PersistenceBackend: Send + Sync + 'static {
    /// Reads the payload stored under `key`.
    ///
    /// ## Returns
    /// - `Ok(Some(payload))` - the most recently saved payload for the key
    /// - `Ok(None)` - nothing was ever saved under the key
    /// - `Err(_)` - the backend could not be read
    async fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replaces the payload stored under `key`.
    ///
    /// Saves are whole-value: the previous payload is gone once this
    /// returns `Ok`.
    async fn save(&self, key: &str, payload: &str) -> StorageResult<()>;
}
