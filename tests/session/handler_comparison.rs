//! Plain vs Optimistic Handler Tests
//!
//! The same overlapping-request schedule run through both handlers.

use crate::common::*;
use occ_session::SessionHandler;

fn overlapping_schedule<H: SessionHandler>(a: &mut H, b: &mut H, id: &SessionId) {
    a.read(id).unwrap();
    b.read(id).unwrap();
    a.write(id, &json(&int_map(&[("from_a", 1)]))).unwrap();
    b.write(id, &json(&int_map(&[("from_b", 1)]))).unwrap();
    a.close();
    b.close();
}

#[test]
fn plain_handler_loses_first_write() {
    let env = TestEnv::new();
    let id = SessionId::new("plain");

    overlapping_schedule(&mut env.plain(), &mut env.plain(), &id);

    let stored = decode(&env.plain().read(&id).unwrap());
    assert_eq!(stored, int_map(&[("from_b", 1)]));
}

#[test]
fn optimistic_handler_keeps_both_writes() {
    let env = TestEnv::new();
    let id = SessionId::new("optimistic");

    overlapping_schedule(&mut env.optimistic(), &mut env.optimistic(), &id);

    let stored = decode(&env.optimistic().read(&id).unwrap());
    assert_eq!(stored, int_map(&[("from_a", 1), ("from_b", 1)]));
}

#[test]
fn handlers_share_key_layout() {
    let env = TestEnv::new();
    let id = SessionId::new("mixed");

    env.plain().write(&id, "{\"v\":1}").unwrap();
    assert_eq!(env.optimistic().read(&id).unwrap(), "{\"v\":1}");
}
