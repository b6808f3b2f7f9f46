//! Watch tracking for one session scope
//!
//! A key is tracked iff this scope opened a watch on it in the store and the
//! watch has not since been consumed (commit or abort) or released.
//! Pure in-memory state; never fails.

use std::collections::HashSet;

use occ_session_core::SessionKey;

/// Keys with an open watch in the current scope
#[derive(Debug, Clone, Default)]
pub struct WatchRegistry {
    watched: HashSet<SessionKey>,
}

impl WatchRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a watch is tracked for `key`
    pub fn is_watched(&self, key: &SessionKey) -> bool {
        self.watched.contains(key)
    }

    /// Record that a watch is open for `key` (idempotent)
    pub fn mark_watched(&mut self, key: &SessionKey) {
        if !self.watched.contains(key) {
            self.watched.insert(key.clone());
        }
    }

    /// Stop tracking exactly `key`
    pub fn clear(&mut self, key: &SessionKey) {
        self.watched.remove(key);
    }

    /// Stop tracking every key
    pub fn clear_all(&mut self) {
        self.watched.clear();
    }

    /// Number of tracked keys
    pub fn len(&self) -> usize {
        self.watched.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.watched.is_empty()
    }

    /// Tracked keys, in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &SessionKey> {
        self.watched.iter()
    }
}
