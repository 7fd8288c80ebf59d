//! Tests for tracing initialization.

use std::sync::Mutex;

use rulemine_core::tracing::{init_tracing, init_tracing_with_default};

/// Global mutex to serialize tracing tests (env var manipulation).
static TRACING_MUTEX: Mutex<()> = Mutex::new(());

/// RULEMINE_LOG with per-module directives is accepted.
#[test]
fn test_rulemine_log_directives() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("RULEMINE_LOG", "rulemine_analysis=debug,rulemine_dmn=warn");
    init_tracing();
    std::env::remove_var("RULEMINE_LOG");
}

/// Repeated initialization does not panic.
#[test]
fn test_init_tracing_idempotent() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    init_tracing();
    init_tracing_with_default("debug");
    init_tracing();
}

/// A garbage filter falls back to the default level.
#[test]
fn test_invalid_filter_falls_back() {
    let _lock = TRACING_MUTEX.lock().unwrap();
    std::env::set_var("RULEMINE_LOG", "this_is[not a filter");
    init_tracing();
    std::env::remove_var("RULEMINE_LOG");
}
