//! occ-session - Session storage with optimistic concurrency control
//!
//! Several concurrent requests that share one session (AJAX bursts, parallel
//! tabs) each read the payload, modify it, and write it back. Without
//! coordination the last writer silently erases everyone else's changes.
//! [`OptimisticSession`] watches the session key on read, commits writes
//! conditionally, and on conflict merges the concurrent version with its own
//! before retrying a bounded number of times.
//!
//! # Quick Start
//!
//! ```
//! use occ_session::{MemoryStore, OptimisticSession, SessionHandler, SessionId};
//!
//! let store = MemoryStore::new();
//! let mut session = OptimisticSession::new(store.connect());
//! let id = SessionId::new("abc123");
//!
//! let data = session.read(&id)?;
//! assert_eq!(data, "");
//! let outcome = session.write(&id, r#"{"cart":{"apple":1}}"#)?;
//! assert!(outcome.is_success());
//! session.close();
//! # Ok::<(), occ_session::Error>(())
//! ```
//!
//! # Architecture
//!
//! - `occ-session-core`: identifiers, values, codecs, outcomes, errors, traits
//! - `occ-session-storage`: the in-memory reference store with WATCH/MULTI/EXEC
//! - `occ-session-concurrency`: watch registry, merge, retry, handlers, config

pub use occ_session_concurrency::{
    merge, merge_with_kind, MergeKind, OptimisticSession, PlainSession, RetryConfig,
    SessionConfig, WatchRegistry, CONFIG_FILE_NAME, DEFAULT_MAX_ATTEMPTS,
};
pub use occ_session_core::{
    AnyCodec, Batch, BatchOp, CodecKind, DestroyOutcome, Error, Fields, JsonCodec, KeyFormatter,
    MsgpackCodec, PayloadCodec, PrefixKeyFormatter, Record, Result, SessionHandler, SessionId,
    SessionKey, SessionStore, SessionValue, StoreError, StoreResult, Timestamp, WriteOutcome,
    DEFAULT_KEY_PREFIX,
};
pub use occ_session_storage::{MemoryConnection, MemoryStore, StoreOp, StoreStats};
