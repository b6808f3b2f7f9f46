//! Payload codecs: bytes in the store ⇄ `SessionValue`
//!
//! Decoding and encoding live here, outside the merge logic. The protocol
//! layer decodes both sides of a conflict, merges the decoded values and
//! re-encodes the result with the same codec.
//!
//! ## JSON mapping (`JsonCodec`)
//!
//! | JSON | SessionValue |
//! |------|--------------|
//! | `null`, `true`/`false`, strings, arrays | same |
//! | integer fitting `i64` | `Int` |
//! | larger integer fitting `u64` | `UInt` |
//! | any other number | `Float` |
//! | `{"$ts": "<canonical rfc3339>"}` | `Timestamp` |
//! | `{"$bytes": [u8, ...]}` | `Bytes` |
//! | `{"$record": "<name>", "fields": {...}}` | `Record` |
//! | any other object | `Map` |
//!
//! Decoding then encoding reproduces the input value exactly, so merging
//! never rewrites entries it did not choose between. A `$ts` object is only
//! read as a `Timestamp` when its text is already in the form this codec
//! writes (UTC, microseconds, `Z`, as in `2024-01-01T00:00:00.000000Z`).
//! Offsets or nanosecond text would be normalised on the way out, so such
//! objects stay plain maps and are carried through verbatim.
//!
//! ## MessagePack (`MsgpackCodec`)
//!
//! The serde representation of `SessionValue` encoded with `rmp-serde`.
//! Self-describing, no tagging conventions needed.

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number, Value as Json};

use crate::error::{Error, Result};
use crate::timestamp::Timestamp;
use crate::value::{Fields, Record, SessionValue};

const TS_TAG: &str = "$ts";
const BYTES_TAG: &str = "$bytes";
const RECORD_TAG: &str = "$record";
const RECORD_FIELDS: &str = "fields";

/// Converts stored bytes to and from decoded session values
pub trait PayloadCodec {
    /// Decode stored bytes
    ///
    /// # Errors
    ///
    /// Returns `Error::Codec` if the bytes are not a valid payload.
    fn decode(&self, bytes: &[u8]) -> Result<SessionValue>;

    /// Encode a value for storage
    ///
    /// # Errors
    ///
    /// Returns `Error::Codec` if the value cannot be represented.
    fn encode(&self, value: &SessionValue) -> Result<Vec<u8>>;
}

/// JSON codec with `$`-tagged objects for non-JSON shapes
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl PayloadCodec for JsonCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SessionValue> {
        let json: Json = serde_json::from_slice(bytes)?;
        Ok(from_json(json))
    }

    fn encode(&self, value: &SessionValue) -> Result<Vec<u8>> {
        let json = to_json(value)?;
        Ok(serde_json::to_vec(&json)?)
    }
}

fn from_json(json: Json) -> SessionValue {
    match json {
        Json::Null => SessionValue::Null,
        Json::Bool(b) => SessionValue::Bool(b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                SessionValue::Int(i)
            } else if let Some(u) = n.as_u64() {
                SessionValue::UInt(u)
            } else {
                SessionValue::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => SessionValue::String(s),
        Json::Array(items) => SessionValue::Array(items.into_iter().map(from_json).collect()),
        Json::Object(obj) => from_json_object(obj),
    }
}

fn from_json_object(mut obj: JsonMap<String, Json>) -> SessionValue {
    if obj.len() == 1 {
        if let Some(Json::String(text)) = obj.get(TS_TAG) {
            if let Some(ts) = parse_canonical_timestamp(text) {
                return SessionValue::Timestamp(ts);
            }
        }
        if let Some(Json::Array(items)) = obj.get(BYTES_TAG) {
            let bytes: Option<Vec<u8>> = items
                .iter()
                .map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            if let Some(bytes) = bytes {
                return SessionValue::Bytes(bytes);
            }
        }
    }

    let is_record = obj.len() == 2
        && obj.get(RECORD_TAG).map_or(false, Json::is_string)
        && obj.get(RECORD_FIELDS).map_or(false, Json::is_object);
    if is_record {
        if let (Some(Json::String(name)), Some(Json::Object(fields))) =
            (obj.remove(RECORD_TAG), obj.remove(RECORD_FIELDS))
        {
            return SessionValue::Record(Record {
                name,
                fields: from_json_fields(fields),
            });
        }
    }

    SessionValue::Map(from_json_fields(obj))
}

/// Timestamp whose encoding is exactly `text`
fn parse_canonical_timestamp(text: &str) -> Option<Timestamp> {
    Timestamp::parse_rfc3339(text).filter(|ts| ts.to_rfc3339() == text)
}

fn from_json_fields(obj: JsonMap<String, Json>) -> Fields {
    obj.into_iter().map(|(k, v)| (k, from_json(v))).collect()
}

fn to_json(value: &SessionValue) -> Result<Json> {
    Ok(match value {
        SessionValue::Null => Json::Null,
        SessionValue::Bool(b) => Json::Bool(*b),
        SessionValue::Int(i) => Json::Number(Number::from(*i)),
        SessionValue::UInt(u) => Json::Number(Number::from(*u)),
        SessionValue::Float(f) => Json::Number(Number::from_f64(*f).ok_or_else(|| {
            Error::Codec(format!("float {} has no JSON representation", f))
        })?),
        SessionValue::String(s) => Json::String(s.clone()),
        SessionValue::Bytes(bytes) => {
            let mut obj = JsonMap::new();
            obj.insert(
                BYTES_TAG.to_string(),
                Json::Array(bytes.iter().map(|b| Json::from(*b)).collect()),
            );
            Json::Object(obj)
        }
        SessionValue::Array(items) => {
            Json::Array(items.iter().map(to_json).collect::<Result<Vec<_>>>()?)
        }
        SessionValue::Timestamp(ts) => {
            let mut obj = JsonMap::new();
            obj.insert(TS_TAG.to_string(), Json::String(ts.to_rfc3339()));
            Json::Object(obj)
        }
        SessionValue::Map(fields) => Json::Object(to_json_fields(fields)?),
        SessionValue::Record(record) => {
            let mut obj = JsonMap::new();
            obj.insert(RECORD_TAG.to_string(), Json::String(record.name.clone()));
            obj.insert(
                RECORD_FIELDS.to_string(),
                Json::Object(to_json_fields(&record.fields)?),
            );
            Json::Object(obj)
        }
    })
}

fn to_json_fields(fields: &Fields) -> Result<JsonMap<String, Json>> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), to_json(v)?)))
        .collect()
}

/// MessagePack codec over the serde form of `SessionValue`
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgpackCodec;

impl PayloadCodec for MsgpackCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SessionValue> {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    fn encode(&self, value: &SessionValue) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec(value)?)
    }
}

/// Codec selection as written in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecKind {
    /// `JsonCodec`
    #[default]
    Json,
    /// `MsgpackCodec`
    Msgpack,
}

impl CodecKind {
    /// Build the codec this kind names
    pub fn codec(self) -> AnyCodec {
        match self {
            CodecKind::Json => AnyCodec::Json(JsonCodec),
            CodecKind::Msgpack => AnyCodec::Msgpack(MsgpackCodec),
        }
    }
}

/// Runtime-selected codec
#[derive(Debug, Clone, Copy)]
pub enum AnyCodec {
    /// JSON
    Json(JsonCodec),
    /// MessagePack
    Msgpack(MsgpackCodec),
}

impl Default for AnyCodec {
    fn default() -> Self {
        CodecKind::default().codec()
    }
}

impl PayloadCodec for AnyCodec {
    fn decode(&self, bytes: &[u8]) -> Result<SessionValue> {
        match self {
            AnyCodec::Json(c) => c.decode(bytes),
            AnyCodec::Msgpack(c) => c.decode(bytes),
        }
    }

    fn encode(&self, value: &SessionValue) -> Result<Vec<u8>> {
        match self {
            AnyCodec::Json(c) => c.encode(value),
            AnyCodec::Msgpack(c) => c.encode(value),
        }
    }
}
