//! In-memory store backend for the optimistic session store
//!
//! This crate implements the `SessionStore` boundary with:
//! - MemoryStore: shared data behind a RwLock with versioned slots
//! - MemoryConnection: per-client watch sets, conditional batches
//! - Fault injection for simulating timeouts and dropped connections
//!
//! It is the reference implementation of the WATCH/MULTI/EXEC contract used
//! by tests and embedded deployments.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fault;
pub mod memory;

pub use fault::StoreOp;
pub use memory::{MemoryConnection, MemoryStore, StoreStats};
