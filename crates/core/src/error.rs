//! Error types for the session store
//!
//! Two layers:
//! - `StoreError`: failures reported by the external key-value store. The
//!   `Conflict` variant is the retryable abort signal of a conditional
//!   transaction; everything else is terminal for the current call.
//! - `Error`: everything a session operation can surface to its caller.
//!
//! We use `thiserror` for `Display` and `Error` implementations.

use crate::key::SessionKey;
use std::io;
use thiserror::Error;

/// Result type alias for session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Failures reported by a `SessionStore`
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A watched key changed between watch and commit; nothing was applied
    #[error("transaction aborted: watched key {} changed", display_key(.key))]
    Conflict {
        /// The watched key that changed, when the store reports it
        key: Option<SessionKey>,
    },

    /// The store did not answer in time
    #[error("store timeout: {0}")]
    Timeout(String),

    /// The connection to the store failed or was lost
    #[error("store connection error: {0}")]
    Connection(String),

    /// The store answered with something the client did not expect
    #[error("store protocol error: {0}")]
    Protocol(String),
}

fn display_key(key: &Option<SessionKey>) -> String {
    match key {
        Some(k) => k.to_string(),
        None => "<unknown>".to_string(),
    }
}

impl StoreError {
    /// Conflict on a known key
    pub fn conflict(key: SessionKey) -> Self {
        StoreError::Conflict { key: Some(key) }
    }

    /// Whether this is the conditional-transaction abort signal
    ///
    /// Only conflicts are retried by the write and destroy paths.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// Errors surfaced by session operations
#[derive(Debug, Error)]
pub enum Error {
    /// Non-conflict store failure (connectivity, timeout, protocol)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Payload could not be encoded or decoded
    #[error("Codec error: {0}")]
    Codec(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error (configuration files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Whether the underlying cause is a store conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_conflict())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<rmp_serde::encode::Error> for Error {
    fn from(e: rmp_serde::encode::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<rmp_serde::decode::Error> for Error {
    fn from(e: rmp_serde::decode::Error) -> Self {
        Error::Codec(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
