//! # In-Memory Backend
//!
//! A `HashMap` behind a mutex. Snapshots live exactly as long as the process;
//! useful for tests and for callers that want cart semantics without a disk.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backend::PersistenceBackend;
use crate::error::StorageResult;

/// Process-local snapshot storage.
///
/// ## Usage
/// ```rust,ignore
/// let backend = Arc::new(MemoryBackend::new());
/// let store = CartStore::open(backend.clone(), StoreConfig::default()).await;
/// ```
///
/// ## Why a std Mutex?
/// The critical sections are single map operations; the lock is never held
/// across an await point.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Reads the stored payload without going through the async trait.
    ///
    /// ## Usage
    /// Test assertions on what actually got persisted.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .expect("memory backend mutex poisoned")
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self
            .entries
            .lock()
            .expect("memory backend mutex poisoned")
            .get(key)
            .cloned())
    }

    async fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
        self.entries
            .lock()
            .expect("memory backend mutex poisoned")
            .insert(key.to_string(), payload.to_string());
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
    async fn test_load_missing_key_is_none() {
        let backend = MemoryBackend::new();

        assert_eq!(backend.load("nothing-here").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let backend = MemoryBackend::new();

        backend.save("slot", "[1,2,3]").await.unwrap();

        assert_eq!(
            backend.load("slot").await.unwrap().as_deref(),
            Some("[1,2,3]")
        );
    }

    #[tokio::test]
    async fn test_save_replaces_previous_payload() {
        let backend = MemoryBackend::new();

        backend.save("slot", "old").await.unwrap();
        backend.save("slot", "new").await.unwrap();

        assert_eq!(backend.load("slot").await.unwrap().as_deref(), Some("new"));
        assert_eq!(backend.peek("slot").as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let backend = MemoryBackend::new();

        backend.save("a", "payload-a").await.unwrap();
        backend.save("b", "payload-b").await.unwrap();

        assert_eq!(backend.load("a").await.unwrap().as_deref(), Some("payload-a"));
        assert_eq!(backend.load("b").await.unwrap().as_deref(), Some("payload-b"));
    }
}
