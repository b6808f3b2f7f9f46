//! MemoryStore: in-process key-value store with WATCH/MULTI/EXEC semantics
//!
//! This module implements the `SessionStore` boundary using:
//! - `HashMap<SessionKey, Slot>` behind a `parking_lot::RwLock`
//! - `AtomicU64` for a monotonically increasing modification version
//! - per-connection watch sets recording the version seen at watch time
//!
//! # Design Notes
//!
//! - **Deletes leave tombstones**: a deleted key keeps its slot with the
//!   delete version, so watch → delete → recreate cannot look unchanged.
//!   Tombstones are never reclaimed: the map keeps one slot per key ever
//!   written, including every destroyed session. Acceptable for tests and
//!   short-lived embedded stores; long-running deployments belong on a real
//!   server store with its own key expiry.
//! - **Deleting a missing key is not a modification**, matching Redis.
//! - **One version per transaction**: every op of a committed batch is
//!   stamped with the same version.
//! - **EXEC drops watches**: `multi` releases the connection's watches
//!   whether it commits or aborts.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::trace;

use occ_session_core::{Batch, BatchOp, SessionKey, SessionStore, StoreError, StoreResult};

use crate::fault::{FaultPlan, StoreOp};

#[derive(Debug, Clone)]
struct Slot {
    value: Option<Vec<u8>>,
    version: u64,
}

/// Counters describing store activity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Committed conditional transactions
    pub commits: u64,
    /// Conditional transactions aborted by a watched-key change
    pub conflicts: u64,
    /// Unconditional sets
    pub sets: u64,
    /// Unconditional deletes of existing keys
    pub deletes: u64,
}

#[derive(Debug, Default)]
struct Inner {
    data: RwLock<HashMap<SessionKey, Slot>>,
    version: AtomicU64,
    faults: Mutex<FaultPlan>,
    stats: Mutex<StoreStats>,
    next_connection: AtomicU64,
}

/// Shared in-memory store
///
/// Cloning is cheap and yields a handle to the same data. Clients talk to
/// it through [`MemoryConnection`]s obtained from [`MemoryStore::connect`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store (version 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new client connection with its own watch set
    pub fn connect(&self) -> MemoryConnection {
        let id = self.inner.next_connection.fetch_add(1, Ordering::Relaxed) + 1;
        MemoryConnection {
            store: self.clone(),
            watches: HashMap::new(),
            id,
        }
    }

    /// Highest version assigned so far
    pub fn current_version(&self) -> u64 {
        self.inner.version.load(Ordering::SeqCst)
    }

    /// Modification version of `key` (0 if never written)
    pub fn version_of(&self, key: &SessionKey) -> u64 {
        self.inner
            .data
            .read()
            .get(key)
            .map(|s| s.version)
            .unwrap_or(0)
    }

    /// Current value of `key`, bypassing connections and fault injection
    pub fn peek(&self, key: &SessionKey) -> Option<Vec<u8>> {
        self.inner
            .data
            .read()
            .get(key)
            .and_then(|s| s.value.clone())
    }

    /// Whether `key` currently holds a value
    pub fn contains(&self, key: &SessionKey) -> bool {
        self.peek(key).is_some()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.inner
            .data
            .read()
            .values()
            .filter(|s| s.value.is_some())
            .count()
    }

    /// Whether no key holds a value
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the activity counters
    pub fn stats(&self) -> StoreStats {
        *self.inner.stats.lock()
    }

    /// Make the next `count` operations fail with `error`
    pub fn fail_next(&self, count: u32, error: StoreError) {
        self.inner.faults.lock().arm(count, None, error);
    }

    /// Make the next `count` operations of kind `op` fail with `error`
    pub fn fail_next_op(&self, op: StoreOp, count: u32, error: StoreError) {
        self.inner.faults.lock().arm(count, Some(op), error);
    }

    fn check_fault(&self, op: StoreOp) -> StoreResult<()> {
        match self.inner.faults.lock().take(op) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn next_version(&self) -> u64 {
        self.inner.version.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// One client connection to a [`MemoryStore`]
///
/// Watches belong to the connection, exactly like a Redis client
/// connection. Dropping the connection drops its watches.
#[derive(Debug)]
pub struct MemoryConnection {
    store: MemoryStore,
    watches: HashMap<SessionKey, u64>,
    id: u64,
}

impl MemoryConnection {
    /// Connection identifier (unique per store)
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Keys currently watched by this connection
    pub fn watched_keys(&self) -> impl Iterator<Item = &SessionKey> {
        self.watches.keys()
    }

    /// The store this connection talks to
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }
}

impl SessionStore for MemoryConnection {
    fn watch(&mut self, key: &SessionKey) -> StoreResult<()> {
        self.store.check_fault(StoreOp::Watch)?;
        let version = self.store.version_of(key);
        // Re-watching keeps the earliest observed version
        self.watches.entry(key.clone()).or_insert(version);
        Ok(())
    }

    fn get(&mut self, key: &SessionKey) -> StoreResult<Option<Vec<u8>>> {
        self.store.check_fault(StoreOp::Get)?;
        Ok(self.store.peek(key))
    }

    fn set(&mut self, key: &SessionKey, value: &[u8]) -> StoreResult<()> {
        self.store.check_fault(StoreOp::Set)?;
        let mut data = self.store.inner.data.write();
        let version = self.store.next_version();
        data.insert(
            key.clone(),
            Slot {
                value: Some(value.to_vec()),
                version,
            },
        );
        drop(data);
        self.store.inner.stats.lock().sets += 1;
        Ok(())
    }

    fn del(&mut self, key: &SessionKey) -> StoreResult<()> {
        self.store.check_fault(StoreOp::Del)?;
        let mut data = self.store.inner.data.write();
        let existed = data.get(key).map_or(false, |s| s.value.is_some());
        if existed {
            let version = self.store.next_version();
            data.insert(
                key.clone(),
                Slot {
                    value: None,
                    version,
                },
            );
            drop(data);
            self.store.inner.stats.lock().deletes += 1;
        }
        Ok(())
    }

    fn multi(&mut self, batch: Batch) -> StoreResult<()> {
        let watches = std::mem::take(&mut self.watches);
        self.store.check_fault(StoreOp::Multi)?;

        // Validation and application under one write lock
        let mut data = self.store.inner.data.write();

        for (key, seen) in &watches {
            let current = data.get(key).map(|s| s.version).unwrap_or(0);
            if current != *seen {
                drop(data);
                trace!(
                    connection = self.id,
                    key = %key,
                    seen,
                    current,
                    "transaction aborted by watched key change"
                );
                self.store.inner.stats.lock().conflicts += 1;
                return Err(StoreError::conflict(key.clone()));
            }
        }

        if !batch.is_empty() {
            let version = self.store.next_version();
            for op in batch.into_ops() {
                match op {
                    BatchOp::Set { key, value } => {
                        data.insert(
                            key,
                            Slot {
                                value: Some(value),
                                version,
                            },
                        );
                    }
                    BatchOp::Del { key } => {
                        if let Some(slot) = data.get_mut(&key) {
                            if slot.value.is_some() {
                                slot.value = None;
                                slot.version = version;
                            }
                        }
                    }
                }
            }
        }
        drop(data);

        self.store.inner.stats.lock().commits += 1;
        Ok(())
    }

    fn unwatch(&mut self) -> StoreResult<()> {
        self.store.check_fault(StoreOp::Unwatch)?;
        self.watches.clear();
        Ok(())
    }
}
