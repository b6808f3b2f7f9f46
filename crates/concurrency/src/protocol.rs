//! Optimistic session handler: watch, read, conditional commit, merge, retry
//!
//! One `OptimisticSession` serves one request scope. Many instances (one per
//! concurrent request) contend on the same keys; there is no in-process
//! locking, safety comes from the store's watch + conditional commit.
//!
//! ## Per-key states
//!
//! ```text
//! UNWATCHED --read--> WATCHED --multi ok--> COMMITTED
//!                        |
//!                        +--multi conflict--> CONFLICTED --re-read--> WATCHED
//! ```
//!
//! ## Write path
//!
//! ```text
//! 1. key not watched in this scope  -> unconditional SET (first write never conflicts)
//! 2. attempt 1                      -> MULTI { SET key data }
//! 3. conflict on attempt k          -> forget watch, re-read (WATCH + GET),
//!                                      data_k+1 = encode(merge(decode(stored), decode(data)))
//! 4. attempt k+1                    -> MULTI { SET key data_k+1 }
//! 5. bound reached                  -> RetryExhausted, no further store calls
//! ```
//!
//! Each merge starts from the caller's original data, never from a previously
//! merged payload. Non-conflict store errors end the call immediately.

use tracing::{debug, warn};

use occ_session_core::{
    AnyCodec, Batch, DestroyOutcome, Error, KeyFormatter, PayloadCodec, PrefixKeyFormatter,
    Result, SessionHandler, SessionId, SessionKey, SessionStore, WriteOutcome,
};

use crate::config::SessionConfig;
use crate::merge::merge_with_kind;
use crate::retry::RetryConfig;
use crate::watch::WatchRegistry;

/// Session handler implementing optimistic concurrency over a `SessionStore`
pub struct OptimisticSession<S, F = PrefixKeyFormatter, C = AnyCodec> {
    store: S,
    formatter: F,
    codec: C,
    registry: WatchRegistry,
    write_retry: RetryConfig,
    destroy_retry: RetryConfig,
}

impl<S: SessionStore> OptimisticSession<S> {
    /// Handler with default configuration
    pub fn new(store: S) -> Self {
        Self::with_config(store, &SessionConfig::default())
    }

    /// Handler configured from a `SessionConfig`
    pub fn with_config(store: S, config: &SessionConfig) -> Self {
        OptimisticSession::from_parts(
            store,
            config.key_formatter(),
            config.codec.codec(),
            config.write_retry.clone(),
            config.destroy_retry.clone(),
        )
    }
}

impl<S, F, C> OptimisticSession<S, F, C>
where
    S: SessionStore,
    F: KeyFormatter,
    C: PayloadCodec,
{
    /// Handler assembled from explicit collaborators
    pub fn from_parts(
        store: S,
        formatter: F,
        codec: C,
        write_retry: RetryConfig,
        destroy_retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            formatter,
            codec,
            registry: WatchRegistry::new(),
            write_retry,
            destroy_retry,
        }
    }

    /// Read the raw payload for `id`, watching its key first
    ///
    /// Returns an empty vector when nothing is stored.
    pub fn read_bytes(&mut self, id: &SessionId) -> Result<Vec<u8>> {
        let key = self.formatter.format_key(id);
        Ok(self.watch_and_get(&key)?.unwrap_or_default())
    }

    /// Write a raw payload for `id`
    pub fn write_bytes(&mut self, id: &SessionId, data: &[u8]) -> Result<WriteOutcome> {
        let key = self.formatter.format_key(id);

        if !self.registry.is_watched(&key) {
            self.store.set(&key, data)?;
            debug!(key = %key, "unwatched key written unconditionally");
            return Ok(WriteOutcome::Unconditional);
        }

        self.write_conditional(&key, data)
    }

    /// Delete the payload for `id` if this scope watched it
    pub fn destroy_session(&mut self, id: &SessionId) -> Result<DestroyOutcome> {
        let key = self.formatter.format_key(id);
        if !self.registry.is_watched(&key) {
            return Ok(DestroyOutcome::NotWatched);
        }

        let max_attempts = self.destroy_retry.max_attempts;
        for attempt in 1..=max_attempts {
            match self.store.multi(Batch::new().del(key.clone())) {
                Ok(()) => {
                    self.registry.clear(&key);
                    debug!(key = %key, attempt, "session destroyed");
                    return Ok(DestroyOutcome::Destroyed { attempts: attempt });
                }
                Err(e) if e.is_conflict() => {
                    debug!(key = %key, attempt, "destroy aborted by concurrent write");
                    if attempt < max_attempts {
                        self.destroy_retry.backoff(attempt);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(key = %key, attempts = max_attempts, "destroy gave up after repeated conflicts");
        Ok(DestroyOutcome::RetryExhausted {
            attempts: max_attempts,
        })
    }

    /// Release every watch held by this scope
    ///
    /// Never fails: an unwatch error is logged and local state is reset
    /// regardless.
    pub fn release(&mut self) {
        if let Err(e) = self.store.unwatch() {
            warn!(error = %e, watched = self.registry.len(), "unwatch failed on close");
        }
        self.registry.clear_all();
    }

    /// Whether this scope currently tracks a watch for `id`
    pub fn is_watched(&self, id: &SessionId) -> bool {
        self.registry.is_watched(&self.formatter.format_key(id))
    }

    /// Watch tracking state of this scope
    pub fn registry(&self) -> &WatchRegistry {
        &self.registry
    }

    /// The underlying store connection
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access to the store connection
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Consume the handler, returning the store connection
    pub fn into_store(self) -> S {
        self.store
    }

    fn watch_and_get(&mut self, key: &SessionKey) -> Result<Option<Vec<u8>>> {
        if !self.registry.is_watched(key) {
            self.store.watch(key)?;
            self.registry.mark_watched(key);
            debug!(key = %key, "watch established");
        }
        Ok(self.store.get(key)?)
    }

    fn write_conditional(&mut self, key: &SessionKey, data: &[u8]) -> Result<WriteOutcome> {
        let max_attempts = self.write_retry.max_attempts;

        for attempt in 1..=max_attempts {
            let payload = if attempt == 1 {
                data.to_vec()
            } else {
                let current = self.watch_and_get(key)?;
                self.merged_payload(key, current.as_deref(), data)
            };

            match self.store.multi(Batch::new().set(key.clone(), payload)) {
                Ok(()) => {
                    debug!(key = %key, attempt, "conditional write committed");
                    return Ok(WriteOutcome::Committed { attempts: attempt });
                }
                Err(e) if e.is_conflict() => {
                    self.registry.clear(key);
                    debug!(key = %key, attempt, "conditional write aborted by concurrent write");
                    if attempt < max_attempts {
                        self.write_retry.backoff(attempt);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(key = %key, attempts = max_attempts, "write lost after repeated conflicts");
        Ok(WriteOutcome::RetryExhausted {
            attempts: max_attempts,
        })
    }

    /// Payload for a retry: stored value merged with the caller's data
    ///
    /// Falls back to the caller's data when nothing is stored or either side
    /// does not decode.
    fn merged_payload(&self, key: &SessionKey, current: Option<&[u8]>, proposed: &[u8]) -> Vec<u8> {
        let current = match current {
            Some(bytes) if !bytes.is_empty() => bytes,
            _ => return proposed.to_vec(),
        };

        let decoded = self
            .codec
            .decode(current)
            .and_then(|c| Ok((c, self.codec.decode(proposed)?)));
        let (current, proposed_value) = match decoded {
            Ok(pair) => pair,
            Err(e) => {
                debug!(key = %key, error = %e, "undecodable payload, last writer wins");
                return proposed.to_vec();
            }
        };

        let (merged, kind) = merge_with_kind(current, proposed_value);
        match self.codec.encode(&merged) {
            Ok(bytes) => {
                debug!(key = %key, merge_kind = %kind, "merged conflicting session payloads");
                bytes
            }
            Err(e) => {
                warn!(key = %key, error = %e, "merged payload not encodable, last writer wins");
                proposed.to_vec()
            }
        }
    }
}

impl<S, F, C> SessionHandler for OptimisticSession<S, F, C>
where
    S: SessionStore,
    F: KeyFormatter,
    C: PayloadCodec,
{
    fn read(&mut self, id: &SessionId) -> Result<String> {
        let bytes = self.read_bytes(id)?;
        String::from_utf8(bytes).map_err(|e| Error::Codec(e.to_string()))
    }

    fn write(&mut self, id: &SessionId, data: &str) -> Result<WriteOutcome> {
        self.write_bytes(id, data.as_bytes())
    }

    fn destroy(&mut self, id: &SessionId) -> Result<DestroyOutcome> {
        self.destroy_session(id)
    }

    fn close(&mut self) {
        self.release()
    }
}

impl<S, F, C> std::fmt::Debug for OptimisticSession<S, F, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptimisticSession")
            .field("watched", &self.registry.len())
            .field("write_retry", &self.write_retry)
            .field("destroy_retry", &self.destroy_retry)
            .finish_non_exhaustive()
    }
}
