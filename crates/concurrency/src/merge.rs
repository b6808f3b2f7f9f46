//! Merging two conflicting versions of a session payload
//!
//! `merge(current, proposed)` is total. Rules are tried in order and the
//! first match wins:
//!
//! 1. `Map` + `Map`: shallow right-biased union
//! 2. `Record` + `Record`: same union over fields, proposed record's name
//! 3. numeric + numeric: the larger value (ties and NaN keep `current`)
//! 4. `Timestamp` + `Timestamp`: the later instant
//! 5. anything else: `proposed` (last-writer-wins)
//!
//! Inputs are decoded values; decoding and encoding are the caller's job.

use std::cmp::Ordering;
use std::fmt;

use occ_session_core::{Fields, Record, SessionValue};

/// Which rule produced a merged value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeKind {
    /// Rule 1
    MapUnion,
    /// Rule 2
    RecordUnion,
    /// Rule 3
    NumericMax,
    /// Rule 4
    LatestTimestamp,
    /// Rule 5
    LastWriterWins,
}

impl MergeKind {
    /// Stable name for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeKind::MapUnion => "map_union",
            MergeKind::RecordUnion => "record_union",
            MergeKind::NumericMax => "numeric_max",
            MergeKind::LatestTimestamp => "latest_timestamp",
            MergeKind::LastWriterWins => "last_writer_wins",
        }
    }
}

impl fmt::Display for MergeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge the stored value with a newly proposed one
pub fn merge(current: SessionValue, proposed: SessionValue) -> SessionValue {
    merge_with_kind(current, proposed).0
}

/// Like [`merge`], also reporting which rule applied
pub fn merge_with_kind(current: SessionValue, proposed: SessionValue) -> (SessionValue, MergeKind) {
    match (current, proposed) {
        (SessionValue::Map(base), SessionValue::Map(overlay)) => {
            (SessionValue::Map(union(base, overlay)), MergeKind::MapUnion)
        }
        (SessionValue::Record(base), SessionValue::Record(overlay)) => (
            SessionValue::Record(Record {
                name: overlay.name,
                fields: union(base.fields, overlay.fields),
            }),
            MergeKind::RecordUnion,
        ),
        (current, proposed) if current.is_numeric() && proposed.is_numeric() => {
            (numeric_max(current, proposed), MergeKind::NumericMax)
        }
        (SessionValue::Timestamp(a), SessionValue::Timestamp(b)) => {
            (SessionValue::Timestamp(a.max(b)), MergeKind::LatestTimestamp)
        }
        (_, proposed) => (proposed, MergeKind::LastWriterWins),
    }
}

/// Proposed entries overlaid on base entries
fn union(mut base: Fields, overlay: Fields) -> Fields {
    base.extend(overlay);
    base
}

fn numeric_max(current: SessionValue, proposed: SessionValue) -> SessionValue {
    // Integer pairs compare exactly, anything involving a float as f64
    let ordering = match (current.as_i128(), proposed.as_i128()) {
        (Some(a), Some(b)) => Some(b.cmp(&a)),
        _ => match (current.as_f64(), proposed.as_f64()) {
            (Some(a), Some(b)) => b.partial_cmp(&a),
            _ => None,
        },
    };
    match ordering {
        Some(Ordering::Greater) => proposed,
        _ => current,
    }
}
