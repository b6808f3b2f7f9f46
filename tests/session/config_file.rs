//! Configuration File Tests
//!
//! `session.toml` on disk driving handler construction.

use crate::common::*;
use occ_session::{CodecKind, Error, KeyFormatter, WriteOutcome};

#[test]
fn default_file_written_once_and_loaded() {
    let env = TestEnv::new();
    let path = env.config_path();

    SessionConfig::write_default_if_missing(&path).unwrap();
    std::fs::write(&path, "key_prefix = \"custom:\"\n").unwrap();
    // Existing file is left alone
    SessionConfig::write_default_if_missing(&path).unwrap();

    let config = SessionConfig::from_file(&path).unwrap();
    assert_eq!(config.key_prefix, "custom:");
    assert_eq!(config.codec, CodecKind::Json);
}

#[test]
fn configured_prefix_used_for_store_keys() {
    let env = TestEnv::new();
    let path = env.config_path();
    std::fs::write(&path, "key_prefix = \"app1:sess:\"\n").unwrap();
    let config = SessionConfig::from_file(&path).unwrap();
    let id = SessionId::new("u42");

    let mut scope = env.optimistic_with(&config);
    scope.write(&id, "{}").unwrap();

    let key = config.key_formatter().format_key(&id);
    assert_eq!(key.as_str(), "app1:sess:u42");
    assert!(env.store.contains(&key));
}

#[test]
fn configured_write_bound_applies() {
    let env = TestEnv::new();
    let path = env.config_path();
    std::fs::write(&path, "[write_retry]\nmax_attempts = 1\n").unwrap();
    let config = SessionConfig::from_file(&path).unwrap();
    let id = SessionId::new("bounded");

    let mut a = env.optimistic_with(&config);
    let mut b = env.optimistic_with(&config);
    a.read(&id).unwrap();
    b.read(&id).unwrap();
    a.write(&id, "{\"a\":1}").unwrap();

    assert_eq!(
        b.write(&id, "{\"b\":1}").unwrap(),
        WriteOutcome::RetryExhausted { attempts: 1 }
    );
    assert_eq!(env.optimistic().read(&id).unwrap(), "{\"a\":1}");
}

#[test]
fn saved_config_round_trips() {
    let env = TestEnv::new();
    let path = env.config_path();
    let mut config = SessionConfig::default();
    config.codec = CodecKind::Msgpack;
    config.destroy_retry = config.destroy_retry.with_max_attempts(3);

    config.write_to_file(&path).unwrap();
    assert_eq!(SessionConfig::from_file(&path).unwrap(), config);
}

#[test]
fn invalid_file_reports_path() {
    let env = TestEnv::new();
    let path = env.config_path();
    std::fs::write(&path, "codec = \"xml\"\n").unwrap();

    match SessionConfig::from_file(&path) {
        Err(Error::Config(msg)) => assert!(msg.contains("session.toml")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_config_error() {
    let env = TestEnv::new();
    let err = SessionConfig::from_file(&env.dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
