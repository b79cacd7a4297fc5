//! Integration Test: No Panicking Shortcuts in Library Code
//!
//! **Policy**: `guidance-core` propagates errors with `Result` and `?`.
//! `unwrap()` and `expect()` are only allowed in tests.

use architectural_enforcement::scan;

fn is_panicking_call(code: &str) -> bool {
    code.contains(".unwrap()") || code.contains(".expect(")
}

#[test]
fn test_no_unwrap_or_expect_in_library_code() {
    let violations = scan(&["guidance/core/src"], is_panicking_call);

    if !violations.is_empty() {
        eprintln!("\n❌ unwrap()/expect() found in library code!\n");
        for violation in &violations {
            eprintln!("  ❌ {violation}");
        }
        panic!(
            "\nFound {} panicking call(s); return an error instead.",
            violations.len()
        );
    }
}

#[test]
fn test_detects_panicking_calls() {
    assert!(is_panicking_call("let v = map.get(k).unwrap();"));
    assert!(is_panicking_call("x.expect(\"present\")"));
    assert!(!is_panicking_call("value.unwrap_or_default()"));
    assert!(!is_panicking_call("value.unwrap_or_else(|| 0)"));
}
