//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep to wait for something.
//! Streaming waits on the socket with `tokio::time::timeout`; nothing polls.
//!
//! **Exceptions**: test code.

use architectural_enforcement::{rust_sources, scan};

const PRODUCTION_DIRS: &[&str] = &["guidance/core/src", "guidance/cli/src"];

fn is_sleep_call(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

/// Test that production code does not contain sleep() calls
#[test]
fn test_no_sleep_in_production_code() {
    let violations = scan(PRODUCTION_DIRS, is_sleep_call);

    if !violations.is_empty() {
        eprintln!("\n❌ Sleep calls found in production code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        eprintln!("\n✅ Wait on I/O instead:");
        eprintln!("  - tokio::time::timeout around the read");
        eprintln!("  - tokio::select! with a cancellation future");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_production_dirs_are_scanned() {
    for dir in PRODUCTION_DIRS {
        assert!(
            !rust_sources(dir).is_empty(),
            "{dir} has no sources; is the lint pointing at the right place?"
        );
    }
}

#[test]
fn test_detects_sleep_patterns() {
    assert!(is_sleep_call("tokio::time::sleep(Duration::from_millis(10)).await;"));
    assert!(is_sleep_call("std::thread::sleep(d);"));
    assert!(!is_sleep_call("let asleep = true;"));
}
