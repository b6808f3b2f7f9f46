//! Session identifiers and store keys
//!
//! - `SessionId`: the raw id handed over by the session layer (cookie value)
//! - `SessionKey`: the address of the payload in the external store
//! - `KeyFormatter`: pure, total mapping from the former to the latter

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default namespace prefix for session keys
pub const DEFAULT_KEY_PREFIX: &str = "session:";

/// Raw session identifier as supplied by the session layer
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        SessionId(id.into())
    }

    /// Generate a fresh random identifier (UUID v4, simple form)
    pub fn generate() -> Self {
        SessionId(Uuid::new_v4().simple().to_string())
    }

    /// Borrow the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        SessionId::new(id)
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        SessionId(id)
    }
}

/// Opaque address of a session payload in the store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey(String);

impl SessionKey {
    /// Build a key from its already-formatted representation
    pub fn new(key: impl Into<String>) -> Self {
        SessionKey(key.into())
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Raw bytes of the key, as sent to the store
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a session id to its store key
///
/// Implementations must be pure and total: the same id always yields the
/// same key and formatting never fails.
pub trait KeyFormatter {
    /// Compute the store key for `id`
    fn format_key(&self, id: &SessionId) -> SessionKey;
}

impl<F> KeyFormatter for F
where
    F: Fn(&SessionId) -> SessionKey,
{
    fn format_key(&self, id: &SessionId) -> SessionKey {
        self(id)
    }
}

/// Prepends a fixed namespace prefix to the raw id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixKeyFormatter {
    prefix: String,
}

impl PrefixKeyFormatter {
    /// Create a formatter with a custom prefix
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for PrefixKeyFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_KEY_PREFIX)
    }
}

impl KeyFormatter for PrefixKeyFormatter {
    fn format_key(&self, id: &SessionId) -> SessionKey {
        let mut key = String::with_capacity(self.prefix.len() + id.as_str().len());
        key.push_str(&self.prefix);
        key.push_str(id.as_str());
        SessionKey(key)
    }
}
