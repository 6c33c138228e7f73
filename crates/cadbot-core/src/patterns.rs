//! Structural pattern scans over example scripts.
//!
//! Five independent scans summarize the idiomatic shape of one example:
//! import lines, the session-initialization call, the builder-creation
//! line, the commit→destroy span, and the `{paramN}` placeholder tokens.
//! Absence of one pattern never prevents the others from matching, and
//! extraction never fails — missing patterns are simply absent from the
//! summary.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::PatternSummary;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:import\s+\S.*|from\s+\S+\s+import\s+.*)$").unwrap());
static SESSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*\bSession\.GetSession\(\).*$").unwrap());
static BUILDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*\w*[Bb]uilder\d*\s*=\s*\w+(?:\.\w+)*\.Create\w*Builder\(.*\).*$").unwrap()
});
static COMMIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*\.Commit(?:Feature)?\(\).*$").unwrap());
static DESTROY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^.*\.Destroy\(\).*$").unwrap());
static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{param(\d+)\}").unwrap());

/// Summarize the structural markers of one example's text.
pub fn extract_patterns(text: &str) -> PatternSummary {
    PatternSummary {
        import_lines: IMPORT_RE
            .find_iter(text)
            .map(|m| m.as_str().trim().to_string())
            .collect(),
        session_init_line: SESSION_RE.find(text).map(|m| m.as_str().trim().to_string()),
        builder_creation_line: BUILDER_RE.find(text).map(|m| m.as_str().trim().to_string()),
        commit_destroy_snippet: commit_destroy_snippet(text),
        placeholder_tokens: placeholder_tokens(text),
    }
}

/// The span from the first commit call through the next destroy call,
/// captured as one snippet. Requires the destroy to follow the commit.
fn commit_destroy_snippet(text: &str) -> Option<String> {
    let commit = COMMIT_RE.find(text)?;
    let destroy = DESTROY_RE.find_at(text, commit.end())?;
    Some(text[commit.start()..destroy.end()].trim().to_string())
}

/// Distinct `{paramN}` tokens, ordered by N.
fn placeholder_tokens(text: &str) -> Vec<String> {
    let indices: BTreeSet<usize> = PLACEHOLDER_RE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    indices.into_iter().map(|n| format!("{{param{}}}", n)).collect()
}
