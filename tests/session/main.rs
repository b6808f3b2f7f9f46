//! Session Store Integration Tests
//!
//! Request-scope level behaviour of the public `occ-session` API: handlers
//! sharing one store, conflict merges, configuration files.

#[path = "../common/mod.rs"]
mod common;

mod config_file;
mod handler_comparison;
mod lifecycle;
mod merge_scenarios;
