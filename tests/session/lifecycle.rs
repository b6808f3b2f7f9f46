//! Request Lifecycle Tests
//!
//! One handler per request scope: read, write, optionally destroy, close.

use crate::common::*;
use occ_session::{DestroyOutcome, WriteOutcome};

// ============================================================================
// Read / write / close
// ============================================================================

#[test]
fn new_session_reads_empty() {
    let env = TestEnv::new();
    let mut scope = env.optimistic();

    assert_eq!(scope.read(&SessionId::new("fresh")).unwrap(), "");
    scope.close();
}

#[test]
fn written_payload_visible_to_next_request() {
    let env = TestEnv::new();
    let id = SessionId::new("abc123");
    let payload = json(&int_map(&[("visits", 1)]));

    let mut first = env.optimistic();
    first.read(&id).unwrap();
    assert_eq!(
        first.write(&id, &payload).unwrap(),
        WriteOutcome::Committed { attempts: 1 }
    );
    first.close();

    let mut second = env.optimistic();
    assert_eq!(second.read(&id).unwrap(), payload);
    second.close();
}

#[test]
fn write_without_read_is_unconditional() {
    let env = TestEnv::new();
    let id = SessionId::new("blind");

    let mut scope = env.optimistic();
    assert_eq!(
        scope.write(&id, "{\"x\":1}").unwrap(),
        WriteOutcome::Unconditional
    );
    assert!(!scope.is_watched(&id));
    scope.close();

    let stats = env.store.stats();
    assert_eq!(stats.sets, 1);
    assert_eq!(stats.commits, 0);
}

#[test]
fn close_releases_every_watch() {
    let env = TestEnv::new();
    let mut scope = env.optimistic();

    for name in ["a", "b", "c"] {
        scope.read(&SessionId::new(name)).unwrap();
    }
    assert_eq!(scope.registry().len(), 3);

    scope.close();
    assert!(scope.registry().is_empty());
    assert_eq!(scope.store().watched_keys().count(), 0);
}

#[test]
fn handler_reusable_after_close() {
    let env = TestEnv::new();
    let id = SessionId::new("reuse");
    let mut scope = env.optimistic();

    scope.read(&id).unwrap();
    scope.write(&id, "1").unwrap();
    scope.close();

    // A new request on the same handler watches again
    scope.read(&id).unwrap();
    assert!(scope.is_watched(&id));
    assert_eq!(
        scope.write(&id, "2").unwrap(),
        WriteOutcome::Committed { attempts: 1 }
    );
    scope.close();
}

// ============================================================================
// Destroy
// ============================================================================

#[test]
fn destroy_after_read_removes_session() {
    let env = TestEnv::new();
    let id = SessionId::new("logout");

    let mut setup = env.optimistic();
    setup.write(&id, "{\"user\":7}").unwrap();

    let mut scope = env.optimistic();
    scope.read(&id).unwrap();
    assert_eq!(
        scope.destroy(&id).unwrap(),
        DestroyOutcome::Destroyed { attempts: 1 }
    );
    assert!(!scope.is_watched(&id));
    scope.close();

    assert_eq!(env.optimistic().read(&id).unwrap(), "");
}

#[test]
fn destroy_after_write_in_same_scope() {
    let env = TestEnv::new();
    let id = SessionId::new("write-then-destroy");

    let mut scope = env.optimistic();
    scope.read(&id).unwrap();
    scope.write(&id, "{\"tmp\":true}").unwrap();
    assert!(scope.destroy(&id).unwrap().is_success());
    scope.close();

    assert_eq!(env.optimistic().read(&id).unwrap(), "");
}

#[test]
fn destroy_without_read_does_nothing() {
    let env = TestEnv::new();
    let id = SessionId::new("keep");

    let mut setup = env.optimistic();
    setup.write(&id, "{\"keep\":1}").unwrap();

    let mut scope = env.optimistic();
    assert_eq!(scope.destroy(&id).unwrap(), DestroyOutcome::NotWatched);
    scope.close();

    assert_eq!(env.optimistic().read(&id).unwrap(), "{\"keep\":1}");
}
