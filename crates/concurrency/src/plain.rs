//! Non-locking session handler
//!
//! Plain get/set/del against the store with no watches: concurrent writers
//! overwrite each other (last writer wins). Useful where sessions are never
//! shared between concurrent requests, and as the baseline the optimistic
//! handler improves on.

use tracing::debug;

use occ_session_core::{
    DestroyOutcome, Error, KeyFormatter, PrefixKeyFormatter, Result, SessionHandler, SessionId,
    SessionStore, WriteOutcome,
};

/// Session handler without conflict detection
#[derive(Debug)]
pub struct PlainSession<S, F = PrefixKeyFormatter> {
    store: S,
    formatter: F,
}

impl<S: SessionStore> PlainSession<S> {
    /// Handler with the default key prefix
    pub fn new(store: S) -> Self {
        PlainSession::with_formatter(store, PrefixKeyFormatter::default())
    }
}

impl<S: SessionStore, F: KeyFormatter> PlainSession<S, F> {
    /// Handler with a custom key formatter
    pub fn with_formatter(store: S, formatter: F) -> Self {
        Self { store, formatter }
    }

    /// The underlying store connection
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: SessionStore, F: KeyFormatter> SessionHandler for PlainSession<S, F> {
    fn read(&mut self, id: &SessionId) -> Result<String> {
        let key = self.formatter.format_key(id);
        let bytes = self.store.get(&key)?.unwrap_or_default();
        String::from_utf8(bytes).map_err(|e| Error::Codec(e.to_string()))
    }

    fn write(&mut self, id: &SessionId, data: &str) -> Result<WriteOutcome> {
        let key = self.formatter.format_key(id);
        self.store.set(&key, data.as_bytes())?;
        Ok(WriteOutcome::Unconditional)
    }

    fn destroy(&mut self, id: &SessionId) -> Result<DestroyOutcome> {
        let key = self.formatter.format_key(id);
        self.store.del(&key)?;
        debug!(key = %key, "session deleted");
        Ok(DestroyOutcome::Destroyed { attempts: 1 })
    }

    fn close(&mut self) {}
}
