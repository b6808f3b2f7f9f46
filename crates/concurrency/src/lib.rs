//! Concurrency layer for the session store
//!
//! This crate implements optimistic concurrency control for session
//! payloads with:
//! - WatchRegistry: per-scope tracking of watched keys
//! - merge: type-aware merge of conflicting payload versions
//! - RetryConfig: bounded retry with optional backoff
//! - OptimisticSession: watch → read → conditional commit → merge → retry
//! - PlainSession: last-writer-wins handler without watches
//! - SessionConfig: `session.toml` configuration

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod merge;
pub mod plain;
pub mod protocol;
pub mod retry;
pub mod watch;

pub use config::{SessionConfig, CONFIG_FILE_NAME};
pub use merge::{merge, merge_with_kind, MergeKind};
pub use plain::PlainSession;
pub use protocol::OptimisticSession;
pub use retry::{RetryConfig, DEFAULT_MAX_ATTEMPTS};
pub use watch::WatchRegistry;
