//! Architectural Enforcement
//!
//! Source-level lints that run as ordinary tests:
//! - No sleep calls in production code (wait on I/O or timers instead)
//! - No `unwrap()` / `expect()` in library code
//!
//! The helpers here locate workspace sources and strip test-only code so each
//! rule only sees what ships.

use std::fs;
use std::path::{Path, PathBuf};

/// A rule violation at a source location
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File containing the violation
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// Offending source line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.path.display(), self.line, self.text)
    }
}

/// Root of the workspace this crate belongs to
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file below `dir` (relative to the workspace root)
#[must_use]
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(walkdir::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Production lines of a source file as `(line_number, code)` pairs
///
/// Everything from the first `#[cfg(test)]` on is dropped (test modules sit
/// at the bottom of each file), as are comments.
#[must_use]
pub fn production_lines(content: &str) -> Vec<(usize, &str)> {
    content
        .lines()
        .enumerate()
        .take_while(|(_, line)| line.trim() != "#[cfg(test)]")
        .filter_map(|(idx, line)| {
            let code = line.split("//").next().unwrap_or(line);
            (!code.trim().is_empty()).then_some((idx + 1, code))
        })
        .collect()
}

/// Scan production lines of every source below `dirs` with `is_violation`
#[must_use]
pub fn scan(dirs: &[&str], is_violation: impl Fn(&str) -> bool) -> Vec<Violation> {
    let mut violations = Vec::new();
    for dir in dirs {
        for path in rust_sources(dir) {
            let Ok(content) = fs::read_to_string(&path) else {
                continue;
            };
            for (line, code) in production_lines(&content) {
                if is_violation(code) {
                    violations.push(Violation {
                        path: path.clone(),
                        line,
                        text: code.trim().to_string(),
                    });
                }
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// note\n\n#[cfg(test)]\nmod tests {}\n";
        assert_eq!(production_lines(source), vec![(1, "fn a() {}")]);
    }

    #[test]
    fn test_trailing_comments_are_stripped() {
        let source = "let x = 1; // .unwrap()\n";
        assert_eq!(production_lines(source), vec![(1, "let x = 1; ")]);
    }

    #[test]
    fn test_workspace_root_holds_the_manifest() {
        assert!(workspace_root().join("Cargo.toml").exists());
    }
}
