//! Overlapping Request Tests
//!
//! Two or more request scopes read the same session before either writes.
//! The later committer merges its own data with what the earlier one stored.

use crate::common::*;
use occ_session::{Record, SessionConfig, Timestamp, WriteOutcome};

// ============================================================================
// Map payloads
// ============================================================================

#[test]
fn overlapping_requests_keep_both_keys() {
    let env = TestEnv::new();
    let id = SessionId::new("ajax");

    let mut a = env.optimistic();
    let mut b = env.optimistic();
    a.read(&id).unwrap();
    b.read(&id).unwrap();

    assert_eq!(
        a.write(&id, &json(&int_map(&[("a", 1)]))).unwrap(),
        WriteOutcome::Committed { attempts: 1 }
    );
    assert_eq!(
        b.write(&id, &json(&int_map(&[("b", 2)]))).unwrap(),
        WriteOutcome::Committed { attempts: 2 }
    );
    a.close();
    b.close();

    let stored = decode(&env.optimistic().read(&id).unwrap());
    assert_eq!(stored, int_map(&[("a", 1), ("b", 2)]));
}

#[test]
fn later_writer_wins_shared_key() {
    let env = TestEnv::new();
    let id = SessionId::new("shared-key");

    let mut a = env.optimistic();
    let mut b = env.optimistic();
    a.read(&id).unwrap();
    b.read(&id).unwrap();

    a.write(&id, &json(&int_map(&[("step", 1), ("a", 1)]))).unwrap();
    b.write(&id, &json(&int_map(&[("step", 2)]))).unwrap();

    let stored = decode(&env.optimistic().read(&id).unwrap());
    assert_eq!(stored, int_map(&[("a", 1), ("step", 2)]));
}

#[test]
fn three_overlapping_requests() {
    let env = TestEnv::new();
    let id = SessionId::new("tabs");

    let mut scopes: Vec<_> = (0..3).map(|_| env.optimistic()).collect();
    for scope in &mut scopes {
        scope.read(&id).unwrap();
    }

    let outcomes: Vec<_> = scopes
        .iter_mut()
        .enumerate()
        .map(|(i, scope)| {
            let key = format!("tab{i}");
            scope
                .write(&id, &json(&int_map(&[(key.as_str(), i as i64)])))
                .unwrap()
        })
        .collect();

    assert_eq!(outcomes[0], WriteOutcome::Committed { attempts: 1 });
    assert_eq!(outcomes[1], WriteOutcome::Committed { attempts: 2 });
    assert_eq!(outcomes[2], WriteOutcome::Committed { attempts: 2 });

    let stored = decode(&env.optimistic().read(&id).unwrap());
    assert_eq!(stored, int_map(&[("tab0", 0), ("tab1", 1), ("tab2", 2)]));
}

// ============================================================================
// Scalar and typed payloads
// ============================================================================

#[test]
fn counter_keeps_the_larger_value() {
    let env = TestEnv::new();
    let id = SessionId::new("counter");
    env.optimistic().write(&id, "5").unwrap();

    let mut fast = env.optimistic();
    let mut slow = env.optimistic();
    fast.read(&id).unwrap();
    slow.read(&id).unwrap();

    fast.write(&id, "9").unwrap();
    slow.write(&id, "6").unwrap();

    assert_eq!(env.optimistic().read(&id).unwrap(), "9");
}

#[test]
fn last_seen_keeps_the_later_timestamp() {
    let env = TestEnv::new();
    let id = SessionId::new("last-seen");
    let early = Timestamp::from_secs(1_700_000_000);
    let late = Timestamp::from_secs(1_700_000_600);

    let mut a = env.optimistic();
    let mut b = env.optimistic();
    a.read(&id).unwrap();
    b.read(&id).unwrap();

    a.write(&id, &json(&SessionValue::Timestamp(late))).unwrap();
    b.write(&id, &json(&SessionValue::Timestamp(early))).unwrap();

    let stored = decode(&env.optimistic().read(&id).unwrap());
    assert_eq!(stored, SessionValue::Timestamp(late));
}

#[test]
fn records_merge_fields_under_new_name() {
    let env = TestEnv::new();
    let id = SessionId::new("profile");

    let mut a = env.optimistic();
    let mut b = env.optimistic();
    a.read(&id).unwrap();
    b.read(&id).unwrap();

    let v1: SessionValue = Record::new("ProfileV1").with_field("theme", "dark").into();
    let v2: SessionValue = Record::new("ProfileV2").with_field("lang", "en").into();
    a.write(&id, &json(&v1)).unwrap();
    b.write(&id, &json(&v2)).unwrap();

    let stored = decode(&env.optimistic().read(&id).unwrap());
    let record = stored.as_record().unwrap();
    assert_eq!(record.name, "ProfileV2");
    assert_eq!(record.fields.len(), 2);
}

#[test]
fn msgpack_sessions_merge_through_byte_api() {
    let env = TestEnv::new();
    let config = SessionConfig::from_toml_str("codec = \"msgpack\"").unwrap();
    let codec = config.codec.codec();
    let id = SessionId::new("binary");

    let mut a = env.optimistic_with(&config);
    let mut b = env.optimistic_with(&config);
    a.read_bytes(&id).unwrap();
    b.read_bytes(&id).unwrap();

    a.write_bytes(&id, &codec.encode(&int_map(&[("a", 1)])).unwrap())
        .unwrap();
    let outcome = b
        .write_bytes(&id, &codec.encode(&int_map(&[("b", 2)])).unwrap())
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Committed { attempts: 2 });

    let stored = env.optimistic_with(&config).read_bytes(&id).unwrap();
    assert_eq!(
        codec.decode(&stored).unwrap(),
        int_map(&[("a", 1), ("b", 2)])
    );
}
