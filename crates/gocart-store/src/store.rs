//! # The Cart Store
//!
//! A cloneable handle around the live cart. Mutations are applied under a
//! mutex, broadcast to subscribers, and handed to a background worker that
//! persists them one at a time.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        CartStore Data Flow                              │
//! │                                                                         │
//! │  add_to_cart / increment / decrement                                    │
//! │       │                                                                 │
//! │       ▼ (mutex)                                                         │
//! │  ┌──────────────────────────┐                                           │
//! │  │ MutationState            │   1. apply pure mutation (gocart-core)    │
//! │  │   seq: u64               │   2. seq += 1                             │
//! │  │   cart: Cart             │   3. publish snapshot to both channels    │
//! │  │   closed: bool           │      while still holding the lock         │
//! │  └──────┬──────────┬────────┘                                           │
//! │         │          │                                                    │
//! │   watch │          │ watch                                              │
//! │  <Cart> ▼          ▼ <SavePoint>                                        │
//! │  ┌────────────┐  ┌─────────────────────────────────────────────┐        │
//! │  │ subscribers│  │        persistence worker (one task)        │        │
//! │  │ .changed() │  │                                             │        │
//! │  │ .borrow()  │  │  loop: wait for a new snapshot              │        │
//! │  └────────────┘  │        take the NEWEST one (skip stale)     │        │
//! │                  │        encode + backend.save(key, payload)  │        │
//! │                  │        publish attempted seq (for flush)    │        │
//! │                  └─────────────────────────────────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Save Freshness
//! The worker feed is a watch channel holding one `SavePoint`: publishing a
//! newer snapshot replaces an unserviced older one. The worker therefore
//! always persists the newest state it can see, saves never run
//! concurrently, and a burst of mutations collapses into few writes whose
//! last one carries the final state. A snapshot handed to the worker is
//! immutable; later mutations produce new snapshots instead of touching it.
//!
//! ## Error Policy
//! - Unreadable or malformed snapshot on open: log it, start empty
//! - Save failure: log it, bump [`CartStore::save_failures`], keep going;
//!   the in-memory cart is never rolled back
//! - Store used after [`CartStore::shutdown`]: caller bug, panics

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use gocart_core::{payload, Cart, NewItem};
use gocart_persist::{
    PersistenceBackend, SqliteBackend, SqliteConfig, StorageError, StorageResult,
};

use crate::config::StoreConfig;

// =============================================================================
// Internal State
// =============================================================================

/// A point-in-time snapshot handed to the persistence worker.
#[derive(Debug, Clone)]
struct SavePoint {
    /// Mutation counter value that produced this snapshot.
    seq: u64,
    /// The full cart as of that mutation.
    cart: Cart,
}

/// Everything the mutation path guards with one lock.
struct MutationState {
    /// Counts mutations since open. Snapshot n carries the cart after the
    /// n-th mutation; the worker reports attempted seqs so flush can wait.
    seq: u64,
    /// The live cart.
    cart: Cart,
    /// Set once by shutdown, under this lock, so no mutation that passed
    /// the check can publish after the final drain.
    closed: bool,
}

struct StoreInner {
    state: Mutex<MutationState>,
    /// Broadcasts the cart to subscribers.
    items_tx: watch::Sender<Cart>,
    /// Feeds the persistence worker. Holding only the newest snapshot is
    /// what makes saves last-write-wins.
    save_tx: watch::Sender<SavePoint>,
    /// Seq of the last save the worker attempted (success or failure).
    attempted_rx: watch::Receiver<u64>,
    /// Count of failed save attempts since open.
    save_failures: Arc<AtomicU64>,
    /// Taken by the first shutdown call.
    worker: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: mpsc::Sender<()>,
    storage_key: String,
}

// =============================================================================
// CartStore
// =============================================================================

/// Handle to the live cart.
///
/// Cloning is cheap and every clone drives the same cart; drop all clones
/// and the persistence worker drains the newest snapshot and exits on its
/// own. Call [`shutdown`](CartStore::shutdown) instead when you need to wait
/// for that final write.
///
/// ## Usage
/// ```rust,ignore
/// let backend = Arc::new(MemoryBackend::new());
/// let store = CartStore::open(backend, StoreConfig::default()).await;
///
/// store.add_to_cart(NewItem::new("sku-1", "Espresso Beans", "beans.png", 12.5));
/// store.increment("sku-1");
///
/// let mut rx = store.subscribe();
/// rx.changed().await.ok();
/// println!("{} lines in cart", rx.borrow().len());
///
/// store.shutdown().await;
/// ```
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreInner>,
}

impl CartStore {
    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens a store over the given backend.
    ///
    /// ## What This Does
    /// 1. Loads the snapshot under the configured storage key
    /// 2. Decodes and validates it; an unreadable backend or malformed
    ///    payload is logged and replaced by an empty cart
    /// 3. Spawns the persistence worker
    ///
    /// Opening never writes: a failed load does not clobber whatever is in
    /// storage until the first mutation produces a fresh snapshot.
    pub async fn open(backend: Arc<dyn PersistenceBackend>, config: StoreConfig) -> CartStore {
        let storage_key = config.storage_key().to_string();

        let initial = match backend.load(&storage_key).await {
            Ok(Some(stored)) => match payload::decode(&stored) {
                Ok(cart) => {
                    info!(key = %storage_key, items = cart.len(), "Cart restored from storage");
                    cart
                }
                Err(e) => {
                    error!(key = %storage_key, error = %e, "Persisted cart is malformed, starting empty");
                    Cart::new()
                }
            },
            Ok(None) => {
                debug!(key = %storage_key, "No persisted cart, starting empty");
                Cart::new()
            }
            Err(e) => {
                error!(key = %storage_key, error = %e, "Cart storage unreadable, starting empty");
                Cart::new()
            }
        };

        let (items_tx, _) = watch::channel(initial.clone());
        let (save_tx, save_rx) = watch::channel(SavePoint {
            seq: 0,
            cart: initial.clone(),
        });
        let (attempted_tx, attempted_rx) = watch::channel(0u64);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let save_failures = Arc::new(AtomicU64::new(0));

        let worker = tokio::spawn(persistence_worker(
            backend,
            storage_key.clone(),
            save_rx,
            attempted_tx,
            Arc::clone(&save_failures),
            shutdown_rx,
        ));

        CartStore {
            inner: Arc::new(StoreInner {
                state: Mutex::new(MutationState {
                    seq: 0,
                    cart: initial,
                    closed: false,
                }),
                items_tx,
                save_tx,
                attempted_rx,
                save_failures,
                worker: Mutex::new(Some(worker)),
                shutdown_tx,
                storage_key,
            }),
        }
    }

    /// Opens a store over a SQLite backend described by the config.
    ///
    /// Builds the backend from `[database]` settings (configured path or
    /// the platform default) and then behaves like [`open`](CartStore::open).
    pub async fn open_sqlite(config: StoreConfig) -> StorageResult<CartStore> {
        let path = config.resolved_database_path().ok_or_else(|| {
            StorageError::ConnectionFailed("No database path available".to_string())
        })?;

        let sqlite = SqliteConfig::new(path).max_connections(config.database.max_connections);
        let backend = SqliteBackend::new(sqlite).await?;

        Ok(CartStore::open(Arc::new(backend), config).await)
    }

    /// Shuts the store down.
    ///
    /// ## What This Does
    /// 1. Marks the store closed; any later call on the cart interface
    ///    panics
    /// 2. Wakes the persistence worker, which writes the newest snapshot
    ///    (if one is pending) and exits
    /// 3. Waits for the worker to finish
    ///
    /// Idempotent: later calls return immediately.
    pub async fn shutdown(&self) {
        {
            let mut state = self.inner.state.lock().expect("cart state mutex poisoned");
            if state.closed {
                return;
            }
            state.closed = true;
        }

        info!(key = %self.inner.storage_key, "Cart store shutting down");

        // Wake the worker; it drains the newest snapshot before exiting.
        let _ = self.inner.shutdown_tx.send(()).await;

        let handle = self
            .inner
            .worker
            .lock()
            .expect("worker handle mutex poisoned")
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                error!(error = %e, "Cart persistence worker task failed");
            }
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds a candidate item to the cart.
    ///
    /// ## Behavior
    /// - Id already in cart: same as [`increment`](CartStore::increment);
    ///   the candidate's title, image and price are discarded
    /// - Id not in cart: appends a line with quantity 1
    ///
    /// The mutation is applied, broadcast and queued for saving before this
    /// returns; the save itself completes in the background.
    ///
    /// Panics if the store has been shut down.
    pub fn add_to_cart(&self, item: NewItem) {
        debug!(id = %item.id, "add_to_cart");
        self.apply("add_to_cart", move |cart| cart.add(item));
    }

    /// Raises the quantity of the line with the given id by one.
    ///
    /// Unknown ids are a no-op; the cart is still re-broadcast and re-saved.
    /// Panics if the store has been shut down.
    pub fn increment(&self, id: &str) {
        debug!(id = %id, "increment");
        self.apply("increment", |cart| cart.increment(id));
    }

    /// Lowers the quantity of the line with the given id by one, removing
    /// the line when it holds a single unit.
    ///
    /// Unknown ids are a no-op; the cart is still re-broadcast and re-saved.
    /// Panics if the store has been shut down.
    pub fn decrement(&self, id: &str) {
        debug!(id = %id, "decrement");
        self.apply("decrement", |cart| cart.decrement(id));
    }

    /// Applies one mutation and publishes the result.
    ///
    /// Publishing happens under the state lock so snapshots reach the
    /// worker feed and subscribers in mutation order, every one carrying
    /// the post-mutation cart.
    fn apply<F>(&self, op: &'static str, mutate: F)
    where
        F: FnOnce(&mut Cart) -> gocart_core::CartChange,
    {
        let mut state = self.inner.state.lock().expect("cart state mutex poisoned");
        assert!(!state.closed, "cart store used after shutdown");

        let change = mutate(&mut state.cart);
        state.seq += 1;

        self.inner.items_tx.send_replace(state.cart.clone());
        self.inner.save_tx.send_replace(SavePoint {
            seq: state.seq,
            cart: state.cart.clone(),
        });

        debug!(
            op,
            seq = state.seq,
            change = ?change,
            items = state.cart.len(),
            "Cart mutation applied"
        );
    }

    // =========================================================================
    // Reads & Subscriptions
    // =========================================================================

    /// Returns a snapshot of the current cart.
    ///
    /// Panics if the store has been shut down.
    pub fn items(&self) -> Cart {
        let state = self.inner.state.lock().expect("cart state mutex poisoned");
        assert!(!state.closed, "cart store used after shutdown");
        state.cart.clone()
    }

    /// Subscribes to cart changes.
    ///
    /// The receiver starts at the current contents; `changed()` resolves
    /// after every mutation, including no-ops, with the full post-mutation
    /// cart in `borrow()`. Subscribing to a shut-down store panics.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        {
            let state = self.inner.state.lock().expect("cart state mutex poisoned");
            assert!(!state.closed, "cart store used after shutdown");
        }
        self.inner.items_tx.subscribe()
    }

    /// Waits until every mutation applied before this call has had its
    /// save attempted.
    ///
    /// "Attempted" covers failures: a save the backend rejected releases
    /// flush too, with the failure visible in
    /// [`save_failures`](CartStore::save_failures) and the log.
    ///
    /// Panics if the store has been shut down.
    pub async fn flush(&self) {
        let target = {
            let state = self.inner.state.lock().expect("cart state mutex poisoned");
            assert!(!state.closed, "cart store used after shutdown");
            state.seq
        };

        let mut attempted = self.inner.attempted_rx.clone();
        while *attempted.borrow_and_update() < target {
            attempted
                .changed()
                .await
                .expect("cart persistence worker exited with saves pending");
        }
    }

    /// Number of failed save attempts since the store was opened.
    ///
    /// Readable even after shutdown.
    pub fn save_failures(&self) -> u64 {
        self.inner.save_failures.load(Ordering::Relaxed)
    }

    /// The storage key this store files its snapshot under.
    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }
}

// =============================================================================
// Persistence Worker
// =============================================================================

/// Drains the snapshot feed, newest snapshot first-and-only.
///
/// Exits when shutdown is signalled or every store handle is gone; both
/// paths write a still-unsaved snapshot before returning.
async fn persistence_worker(
    backend: Arc<dyn PersistenceBackend>,
    key: String,
    mut save_rx: watch::Receiver<SavePoint>,
    attempted_tx: watch::Sender<u64>,
    save_failures: Arc<AtomicU64>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    debug!(key = %key, "Cart persistence worker started");

    let mut last_attempted = 0u64;
    loop {
        tokio::select! {
            changed = save_rx.changed() => match changed {
                Ok(()) => {
                    let point = save_rx.borrow_and_update().clone();
                    persist(backend.as_ref(), &key, &point, &attempted_tx, &save_failures).await;
                    last_attempted = point.seq;
                }
                // Every store handle is gone.
                Err(_) => break,
            },
            _ = shutdown_rx.recv() => break,
        }
    }

    // Final drain: a snapshot may have arrived while the last save ran.
    let point = save_rx.borrow_and_update().clone();
    if point.seq > last_attempted {
        persist(backend.as_ref(), &key, &point, &attempted_tx, &save_failures).await;
    }

    debug!(key = %key, "Cart persistence worker stopped");
}

/// One save attempt. Failures are logged and counted, never retried; the
/// next mutation supersedes this snapshot anyway.
async fn persist(
    backend: &dyn PersistenceBackend,
    key: &str,
    point: &SavePoint,
    attempted_tx: &watch::Sender<u64>,
    save_failures: &AtomicU64,
) {
    let encoded = payload::encode(&point.cart);

    match backend.save(key, &encoded).await {
        Ok(()) => {
            debug!(key = %key, seq = point.seq, items = point.cart.len(), "Cart snapshot persisted");
        }
        Err(e) => {
            save_failures.fetch_add(1, Ordering::Relaxed);
            error!(key = %key, seq = point.seq, error = %e, "Cart snapshot save failed");
        }
    }

    // Flush waiters watch attempted seqs; failed attempts release them too.
    let _ = attempted_tx.send(point.seq);
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_STORAGE_KEY;

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use gocart_persist::MemoryBackend;

    // =========================================================================
    // Test Backends
    // =========================================================================

    /// Accepts loads, rejects every save.
    struct FailingBackend;

    #[async_trait]
    impl PersistenceBackend for FailingBackend {
        async fn load(&self, _key: &str) -> StorageResult<Option<String>> {
            Ok(None)
        }

        async fn save(&self, _key: &str, _payload: &str) -> StorageResult<()> {
            Err(StorageError::Unavailable("injected save failure".into()))
        }
    }

    /// Rejects everything.
    struct BrokenBackend;

    #[async_trait]
    impl PersistenceBackend for BrokenBackend {
        async fn load(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::ConnectionFailed("injected load failure".into()))
        }

        async fn save(&self, _key: &str, _payload: &str) -> StorageResult<()> {
            Err(StorageError::ConnectionFailed("injected save failure".into()))
        }
    }

    /// Delegates to memory, counting saves.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        saves: AtomicUsize,
    }

    #[async_trait]
    impl PersistenceBackend for CountingBackend {
        async fn load(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(key, payload).await
        }
    }

    /// Delegates to memory after a delay, so a save can be caught in flight.
    struct SlowBackend {
        inner: MemoryBackend,
        delay: Duration,
    }

    impl SlowBackend {
        fn new(delay: Duration) -> Self {
            SlowBackend {
                inner: MemoryBackend::new(),
                delay,
            }
        }
    }

    #[async_trait]
    impl PersistenceBackend for SlowBackend {
        async fn load(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.load(key).await
        }

        async fn save(&self, key: &str, payload: &str) -> StorageResult<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.save(key, payload).await
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn beans() -> NewItem {
        NewItem::new("beans", "Espresso Beans", "beans.png", 12.5)
    }

    fn filters() -> NewItem {
        NewItem::new("filters", "Filter Papers", "filters.png", 3.2)
    }

    fn quantities(cart: &Cart) -> Vec<(String, u32)> {
        cart.iter().map(|i| (i.id.clone(), i.quantity)).collect()
    }

    fn stored_cart(backend: &MemoryBackend, key: &str) -> Cart {
        payload::decode(&backend.peek(key).expect("no payload stored")).unwrap()
    }

    const SEEDED: &str = r#"[
        {"id":"beans","title":"Espresso Beans","image_url":"beans.png","price":12.5,"quantity":2},
        {"id":"filters","title":"Filter Papers","image_url":"filters.png","price":3.2,"quantity":1}
    ]"#;

    // =========================================================================
    // Opening
    // =========================================================================

    #[tokio::test]
    async fn test_open_with_empty_storage_starts_empty() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;

        assert!(store.items().is_empty());
        assert_eq!(store.storage_key(), DEFAULT_STORAGE_KEY);
    }

    #[tokio::test]
    async fn test_open_restores_saved_items_in_order() {
        let backend = Arc::new(MemoryBackend::new());
        backend.save(DEFAULT_STORAGE_KEY, SEEDED).await.unwrap();

        let store = CartStore::open(backend, StoreConfig::default()).await;

        assert_eq!(
            quantities(&store.items()),
            vec![("beans".to_string(), 2), ("filters".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_open_with_malformed_payload_starts_empty() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .save(DEFAULT_STORAGE_KEY, "definitely not json")
            .await
            .unwrap();

        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;
        assert!(store.items().is_empty());

        // The store stays usable and the next save replaces the garbage.
        store.add_to_cart(beans());
        store.flush().await;
        assert_eq!(
            quantities(&stored_cart(&backend, DEFAULT_STORAGE_KEY)),
            vec![("beans".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_open_with_invalid_snapshot_contents_starts_empty() {
        // Valid JSON, invalid carts: a duplicated id and a zero quantity.
        let snapshots = [
            r#"[{"id":"a","title":"A","image_url":"a.png","price":1.0,"quantity":1},
                {"id":"a","title":"A","image_url":"a.png","price":1.0,"quantity":4}]"#,
            r#"[{"id":"a","title":"A","image_url":"a.png","price":1.0,"quantity":0}]"#,
        ];

        for snapshot in snapshots {
            let backend = Arc::new(MemoryBackend::new());
            backend.save(DEFAULT_STORAGE_KEY, snapshot).await.unwrap();

            let store = CartStore::open(backend, StoreConfig::default()).await;

            assert!(store.items().is_empty());
        }
    }

    #[tokio::test]
    async fn test_open_with_unreadable_backend_starts_empty() {
        let store = CartStore::open(Arc::new(BrokenBackend), StoreConfig::default()).await;

        assert!(store.items().is_empty());
    }

    #[tokio::test]
    async fn test_open_does_not_write() {
        let backend = Arc::new(CountingBackend::default());

        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;
        store.flush().await;

        assert_eq!(backend.saves.load(Ordering::SeqCst), 0);
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[tokio::test]
    async fn test_mutations_are_persisted_after_flush() {
        let backend = Arc::new(MemoryBackend::new());
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        store.add_to_cart(filters());
        store.increment("beans");
        store.flush().await;

        assert_eq!(
            quantities(&stored_cart(&backend, DEFAULT_STORAGE_KEY)),
            quantities(&store.items())
        );
    }

    #[tokio::test]
    async fn test_every_save_carries_post_mutation_state() {
        let backend = Arc::new(MemoryBackend::new());
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        store.flush().await;
        assert_eq!(
            quantities(&stored_cart(&backend, DEFAULT_STORAGE_KEY)),
            vec![("beans".to_string(), 1)]
        );

        store.increment("beans");
        store.flush().await;
        assert_eq!(
            quantities(&stored_cart(&backend, DEFAULT_STORAGE_KEY)),
            vec![("beans".to_string(), 2)]
        );

        store.decrement("beans");
        store.decrement("beans");
        store.flush().await;
        assert!(stored_cart(&backend, DEFAULT_STORAGE_KEY).is_empty());
    }

    #[tokio::test]
    async fn test_burst_of_mutations_persists_final_state() {
        let backend = Arc::new(CountingBackend::default());
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        for _ in 0..9 {
            store.increment("beans");
        }
        store.flush().await;

        let stored = stored_cart(&backend.inner, DEFAULT_STORAGE_KEY);
        assert_eq!(stored.get("beans").unwrap().quantity, 10);
        // The whole burst collapsed into a single write of the final state.
        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_in_flight_never_hides_newer_mutations() {
        let backend = Arc::new(SlowBackend::new(Duration::from_millis(50)));
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        // Let the worker pick up the first snapshot and stall in save().
        tokio::task::yield_now().await;

        store.increment("beans");
        store.increment("beans");
        store.flush().await;

        let stored = payload::decode(&backend.inner.peek(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.get("beans").unwrap().quantity, 3);
    }

    #[tokio::test]
    async fn test_noop_mutation_still_saves() {
        let backend = Arc::new(CountingBackend::default());
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.increment("ghost");
        store.flush().await;

        assert_eq!(backend.saves.load(Ordering::SeqCst), 1);
        assert_eq!(backend.inner.peek(DEFAULT_STORAGE_KEY).as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_save_failures_are_counted_and_state_survives() {
        let store = CartStore::open(Arc::new(FailingBackend), StoreConfig::default()).await;

        store.add_to_cart(beans());
        store.flush().await;
        assert_eq!(store.save_failures(), 1);

        // The cart keeps working; failures keep accumulating.
        store.add_to_cart(filters());
        store.flush().await;
        assert_eq!(store.save_failures(), 2);
        assert_eq!(store.items().len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_round_trips_the_cart() {
        let backend = Arc::new(MemoryBackend::new());

        let first = CartStore::open(backend.clone(), StoreConfig::default()).await;
        first.add_to_cart(beans());
        first.add_to_cart(filters());
        first.increment("beans");
        let expected = quantities(&first.items());
        first.flush().await;
        first.shutdown().await;

        let second = CartStore::open(backend, StoreConfig::default()).await;
        assert_eq!(quantities(&second.items()), expected);
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    #[tokio::test]
    async fn test_subscribers_see_every_mutation() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        let mut rx = store.subscribe();

        store.add_to_cart(beans());
        rx.changed().await.unwrap();
        assert_eq!(
            quantities(&rx.borrow_and_update()),
            vec![("beans".to_string(), 1)]
        );

        store.increment("beans");
        rx.changed().await.unwrap();
        assert_eq!(
            quantities(&rx.borrow_and_update()),
            vec![("beans".to_string(), 2)]
        );
    }

    #[tokio::test]
    async fn test_noop_mutation_still_notifies() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        let mut rx = store.subscribe();

        store.decrement("ghost");

        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[tokio::test]
    async fn test_subscriber_starts_at_restored_state() {
        let backend = Arc::new(MemoryBackend::new());
        backend.save(DEFAULT_STORAGE_KEY, SEEDED).await.unwrap();
        let store = CartStore::open(backend, StoreConfig::default()).await;

        let rx = store.subscribe();

        assert_eq!(rx.borrow().get("beans").unwrap().quantity, 2);
    }

    // =========================================================================
    // Shutdown & Teardown
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_waits_for_pending_save() {
        let backend = Arc::new(SlowBackend::new(Duration::from_millis(50)));
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        store.shutdown().await;

        let stored = payload::decode(&backend.inner.peek(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(stored.get("beans").unwrap().quantity, 1);
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;

        store.shutdown().await;
        store.shutdown().await;
    }

    #[tokio::test]
    async fn test_dropping_every_handle_drains_the_worker() {
        let backend = Arc::new(MemoryBackend::new());
        let store = CartStore::open(backend.clone(), StoreConfig::default()).await;

        store.add_to_cart(beans());
        drop(store);

        // Give the detached worker a few turns to notice and drain.
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        assert_eq!(
            quantities(&stored_cart(&backend, DEFAULT_STORAGE_KEY)),
            vec![("beans".to_string(), 1)]
        );
    }

    #[tokio::test]
    #[should_panic(expected = "used after shutdown")]
    async fn test_mutation_after_shutdown_panics() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        store.shutdown().await;

        store.add_to_cart(beans());
    }

    #[tokio::test]
    #[should_panic(expected = "used after shutdown")]
    async fn test_items_after_shutdown_panics() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        store.shutdown().await;

        let _ = store.items();
    }

    #[tokio::test]
    #[should_panic(expected = "used after shutdown")]
    async fn test_subscribe_after_shutdown_panics() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        store.shutdown().await;

        let _ = store.subscribe();
    }

    #[tokio::test]
    #[should_panic(expected = "used after shutdown")]
    async fn test_flush_after_shutdown_panics() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        store.shutdown().await;

        store.flush().await;
    }

    // =========================================================================
    // Isolation
    // =========================================================================

    #[tokio::test]
    async fn test_stores_with_different_keys_are_independent() {
        let backend = Arc::new(MemoryBackend::new());
        let alice = CartStore::open(
            backend.clone(),
            StoreConfig::with_storage_key("@gocart:cart-items:alice"),
        )
        .await;
        let bob = CartStore::open(
            backend.clone(),
            StoreConfig::with_storage_key("@gocart:cart-items:bob"),
        )
        .await;

        alice.add_to_cart(beans());
        bob.add_to_cart(filters());
        alice.flush().await;
        bob.flush().await;

        assert_eq!(
            quantities(&stored_cart(&backend, "@gocart:cart-items:alice")),
            vec![("beans".to_string(), 1)]
        );
        assert_eq!(
            quantities(&stored_cart(&backend, "@gocart:cart-items:bob")),
            vec![("filters".to_string(), 1)]
        );
        assert_eq!(alice.items().len(), 1);
        assert_eq!(bob.items().len(), 1);
    }

    #[tokio::test]
    async fn test_clones_drive_the_same_cart() {
        let store = CartStore::open(Arc::new(MemoryBackend::new()), StoreConfig::default()).await;
        let clone = store.clone();

        store.add_to_cart(beans());
        clone.increment("beans");

        assert_eq!(store.items().get("beans").unwrap().quantity, 2);
        assert_eq!(clone.items().get("beans").unwrap().quantity, 2);
    }
}
