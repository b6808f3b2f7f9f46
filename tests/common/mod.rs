//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

pub use occ_session::{
    JsonCodec, MemoryConnection, MemoryStore, OptimisticSession, PayloadCodec, PlainSession,
    SessionConfig, SessionHandler, SessionId, SessionValue,
};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route handler logs through the test harness writer.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Payload helpers
// ============================================================================

/// Encode a value as the JSON text handed to `write`.
pub fn json(value: &SessionValue) -> String {
    let bytes = JsonCodec.encode(value).expect("encode test payload");
    String::from_utf8(bytes).expect("json is utf-8")
}

/// Decode the text returned by `read`.
pub fn decode(text: &str) -> SessionValue {
    JsonCodec.decode(text.as_bytes()).expect("decode test payload")
}

/// Build a map value from `(key, int)` pairs.
pub fn int_map(entries: &[(&str, i64)]) -> SessionValue {
    SessionValue::map(
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), SessionValue::Int(*v))),
    )
}

// ============================================================================
// TestEnv - store plus a scratch directory for config files
// ============================================================================

/// Store shared by every handler in a test, plus a temp dir.
pub struct TestEnv {
    pub store: MemoryStore,
    pub dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        init_tracing();
        TestEnv {
            store: MemoryStore::new(),
            dir: TempDir::new().expect("temp dir"),
        }
    }

    /// A new request scope with default configuration.
    pub fn optimistic(&self) -> OptimisticSession<MemoryConnection> {
        OptimisticSession::new(self.store.connect())
    }

    /// A new request scope configured from `config`.
    pub fn optimistic_with(&self, config: &SessionConfig) -> OptimisticSession<MemoryConnection> {
        OptimisticSession::with_config(self.store.connect(), config)
    }

    /// A new non-locking handler.
    pub fn plain(&self) -> PlainSession<MemoryConnection> {
        PlainSession::new(self.store.connect())
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join(occ_session::CONFIG_FILE_NAME)
    }
}
