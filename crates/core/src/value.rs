//! Decoded session payload model
//!
//! The store sees a session payload as opaque bytes. Once decoded by a
//! [`PayloadCodec`](crate::codec::PayloadCodec) it becomes a `SessionValue`,
//! which is the only representation the merge logic understands.
//!
//! ## Mergeable shapes
//!
//! - `Map`: associative mapping (key → value, unordered)
//! - `Record`: structured record/object with a type name and fields
//! - `Int` / `UInt` / `Float`: numeric scalars
//! - `Timestamp`: instants
//!
//! Every other variant is an opaque scalar as far as merging is concerned.
//!
//! ## Equality
//!
//! Different variants are never equal (`Int(1) != Float(1.0)`); floats use
//! IEEE-754 equality.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timestamp::Timestamp;

/// Field map shared by `Map` and `Record`
pub type Fields = BTreeMap<String, SessionValue>;

/// A structured record: a named bag of fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Type name of the record (class name, schema name, ...)
    pub name: String,
    /// Field values
    pub fields: Fields,
}

impl Record {
    /// Create an empty record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Fields::new(),
        }
    }

    /// Builder-style field insertion
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<SessionValue>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }
}

/// Decoded session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionValue {
    /// Null / absent
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// Unsigned integer above `i64::MAX`
    ///
    /// Codecs produce `Int` for anything that fits; this variant exists so
    /// large unsigned ids survive a decode/encode cycle exactly.
    UInt(u64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Ordered list
    Array(Vec<SessionValue>),
    /// Point in time
    Timestamp(Timestamp),
    /// Associative mapping
    Map(Fields),
    /// Structured record
    Record(Record),
}

impl PartialEq for SessionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SessionValue::Null, SessionValue::Null) => true,
            (SessionValue::Bool(a), SessionValue::Bool(b)) => a == b,
            (SessionValue::Int(a), SessionValue::Int(b)) => a == b,
            (SessionValue::UInt(a), SessionValue::UInt(b)) => a == b,
            (SessionValue::Float(a), SessionValue::Float(b)) => a == b,
            (SessionValue::String(a), SessionValue::String(b)) => a == b,
            (SessionValue::Bytes(a), SessionValue::Bytes(b)) => a == b,
            (SessionValue::Array(a), SessionValue::Array(b)) => a == b,
            (SessionValue::Timestamp(a), SessionValue::Timestamp(b)) => a == b,
            (SessionValue::Map(a), SessionValue::Map(b)) => a == b,
            (SessionValue::Record(a), SessionValue::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl SessionValue {
    /// Variant name, used in log fields
    pub fn type_name(&self) -> &'static str {
        match self {
            SessionValue::Null => "Null",
            SessionValue::Bool(_) => "Bool",
            SessionValue::Int(_) => "Int",
            SessionValue::UInt(_) => "UInt",
            SessionValue::Float(_) => "Float",
            SessionValue::String(_) => "String",
            SessionValue::Bytes(_) => "Bytes",
            SessionValue::Array(_) => "Array",
            SessionValue::Timestamp(_) => "Timestamp",
            SessionValue::Map(_) => "Map",
            SessionValue::Record(_) => "Record",
        }
    }

    /// True for `Int`, `UInt` and `Float`
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            SessionValue::Int(_) | SessionValue::UInt(_) | SessionValue::Float(_)
        )
    }

    /// Exact integer view of `Int`/`UInt`, `None` for anything else
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            SessionValue::Int(i) => Some(i128::from(*i)),
            SessionValue::UInt(u) => Some(i128::from(*u)),
            _ => None,
        }
    }

    /// Numeric view of `Int`/`UInt`/`Float`, `None` for anything else
    ///
    /// Lossy for integers beyond 2^53.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SessionValue::Int(i) => Some(*i as f64),
            SessionValue::UInt(u) => Some(*u as f64),
            SessionValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the fields of a `Map`
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            SessionValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow a `Record`
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            SessionValue::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Build a `Map` from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<SessionValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        SessionValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<bool> for SessionValue {
    fn from(b: bool) -> Self {
        SessionValue::Bool(b)
    }
}

impl From<i64> for SessionValue {
    fn from(i: i64) -> Self {
        SessionValue::Int(i)
    }
}

impl From<i32> for SessionValue {
    fn from(i: i32) -> Self {
        SessionValue::Int(i64::from(i))
    }
}

impl From<u64> for SessionValue {
    /// `Int` when the value fits, `UInt` otherwise
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => SessionValue::Int(i),
            Err(_) => SessionValue::UInt(u),
        }
    }
}

impl From<f64> for SessionValue {
    fn from(f: f64) -> Self {
        SessionValue::Float(f)
    }
}

impl From<&str> for SessionValue {
    fn from(s: &str) -> Self {
        SessionValue::String(s.to_string())
    }
}

impl From<String> for SessionValue {
    fn from(s: String) -> Self {
        SessionValue::String(s)
    }
}

impl From<Timestamp> for SessionValue {
    fn from(ts: Timestamp) -> Self {
        SessionValue::Timestamp(ts)
    }
}

impl From<Record> for SessionValue {
    fn from(r: Record) -> Self {
        SessionValue::Record(r)
    }
}

impl From<Fields> for SessionValue {
    fn from(m: Fields) -> Self {
        SessionValue::Map(m)
    }
}
