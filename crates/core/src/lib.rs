//! Core types and traits for the optimistic session store
//!
//! This crate defines the foundational types shared by every layer:
//! - SessionId / SessionKey / KeyFormatter: addressing payloads in the store
//! - SessionValue / Record: decoded payload model the merge logic works on
//! - Timestamp: microsecond instants stored inside payloads
//! - PayloadCodec: bytes ⇄ SessionValue (JSON, MessagePack)
//! - SessionStore: the WATCH/MULTI/EXEC-style store boundary
//! - SessionHandler: the lifecycle surface (read/write/destroy/close)
//! - Error / StoreError: error hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod key;
pub mod outcome;
pub mod timestamp;
pub mod traits;
pub mod value;

pub use codec::{AnyCodec, CodecKind, JsonCodec, MsgpackCodec, PayloadCodec};
pub use error::{Error, Result, StoreError, StoreResult};
pub use key::{KeyFormatter, PrefixKeyFormatter, SessionId, SessionKey, DEFAULT_KEY_PREFIX};
pub use outcome::{DestroyOutcome, WriteOutcome};
pub use timestamp::Timestamp;
pub use traits::{Batch, BatchOp, SessionHandler, SessionStore};
pub use value::{Fields, Record, SessionValue};
