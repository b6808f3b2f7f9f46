//! Core traits: the store boundary and the session lifecycle surface
//!
//! `SessionStore` is the six-operation capability set the optimistic
//! protocol needs from a key-value store (Redis-like WATCH/MULTI/EXEC).
//! `SessionHandler` is what a session-lifecycle driver calls.

use crate::error::{Result, StoreResult};
use crate::key::{SessionId, SessionKey};
use crate::outcome::{DestroyOutcome, WriteOutcome};

/// One queued operation of a conditional transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    /// Unconditional set inside the transaction
    Set {
        /// Target key
        key: SessionKey,
        /// Encoded payload
        value: Vec<u8>,
    },
    /// Delete inside the transaction
    Del {
        /// Target key
        key: SessionKey,
    },
}

impl BatchOp {
    /// Key the operation touches
    pub fn key(&self) -> &SessionKey {
        match self {
            BatchOp::Set { key, .. } | BatchOp::Del { key } => key,
        }
    }
}

/// Operations queued for a conditional transaction (`multi`)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ops: Vec<BatchOp>,
}

impl Batch {
    /// Empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a set
    pub fn set(mut self, key: SessionKey, value: impl Into<Vec<u8>>) -> Self {
        self.ops.push(BatchOp::Set {
            key,
            value: value.into(),
        });
        self
    }

    /// Queue a delete
    pub fn del(mut self, key: SessionKey) -> Self {
        self.ops.push(BatchOp::Del { key });
        self
    }

    /// Queued operations in order
    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    /// Consume into the queued operations
    pub fn into_ops(self) -> Vec<BatchOp> {
        self.ops
    }

    /// Number of queued operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Key-value store capability set used by the session protocol
///
/// Watches are per connection: an implementation value represents one
/// client connection, so all methods take `&mut self`.
///
/// Every call is a potential network round trip. Timeouts and connectivity
/// problems are reported as non-conflict `StoreError`s.
pub trait SessionStore {
    /// Register intent to conditionally commit against `key`
    fn watch(&mut self, key: &SessionKey) -> StoreResult<()>;

    /// Plain read, independent of watch state
    fn get(&mut self, key: &SessionKey) -> StoreResult<Option<Vec<u8>>>;

    /// Unconditional write
    fn set(&mut self, key: &SessionKey, value: &[u8]) -> StoreResult<()>;

    /// Unconditional delete
    fn del(&mut self, key: &SessionKey) -> StoreResult<()>;

    /// Run `batch` as a conditional transaction
    ///
    /// Commits atomically unless a watched key changed since its watch, in
    /// which case nothing is applied and `StoreError::Conflict` is returned.
    /// Watches held by the connection are released either way.
    fn multi(&mut self, batch: Batch) -> StoreResult<()>;

    /// Release every watch held by this connection
    fn unwatch(&mut self) -> StoreResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn watch(&mut self, key: &SessionKey) -> StoreResult<()> {
        (**self).watch(key)
    }

    fn get(&mut self, key: &SessionKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &SessionKey, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn del(&mut self, key: &SessionKey) -> StoreResult<()> {
        (**self).del(key)
    }

    fn multi(&mut self, batch: Batch) -> StoreResult<()> {
        (**self).multi(batch)
    }

    fn unwatch(&mut self) -> StoreResult<()> {
        (**self).unwatch()
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn watch(&mut self, key: &SessionKey) -> StoreResult<()> {
        (**self).watch(key)
    }

    fn get(&mut self, key: &SessionKey) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &SessionKey, value: &[u8]) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn del(&mut self, key: &SessionKey) -> StoreResult<()> {
        (**self).del(key)
    }

    fn multi(&mut self, batch: Batch) -> StoreResult<()> {
        (**self).multi(batch)
    }

    fn unwatch(&mut self) -> StoreResult<()> {
        (**self).unwatch()
    }
}

/// Session lifecycle surface consumed by a session driver
///
/// One handler instance serves one request/session scope.
pub trait SessionHandler {
    /// Current payload for `id`, empty string when absent
    ///
    /// # Errors
    ///
    /// Store failures as `Error::Store`. A stored payload that is not valid
    /// UTF-8 cannot be returned as text and yields `Error::Codec`; handlers
    /// serving binary codecs expose a byte-level read for that case.
    fn read(&mut self, id: &SessionId) -> Result<String>;

    /// Persist `data` for `id`
    fn write(&mut self, id: &SessionId, data: &str) -> Result<WriteOutcome>;

    /// Remove the payload for `id`
    fn destroy(&mut self, id: &SessionId) -> Result<DestroyOutcome>;

    /// End the scope, releasing store-side state held by the handler
    fn close(&mut self);
}
