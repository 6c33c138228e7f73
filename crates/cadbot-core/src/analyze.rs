//! Keyword and numeric-parameter extraction from free-text requests.
//!
//! The keyword feeds the matcher's fast paths before vector search runs;
//! the ordering is precision-over-recall: an explicit filename or a known
//! operation word is an unambiguous signal, a generic first word is not.

use std::sync::LazyLock;

use regex::Regex;

/// Recognized CAD operation and shape vocabulary, scanned in order.
/// Earlier entries win when a request mentions several.
pub const DOMAIN_VOCABULARY: &[&str] = &[
    "block", "cylinder", "cone", "sphere", "fillet", "chamfer", "blend", "extrude", "revolve",
    "boss", "hole", "pocket", "pattern", "mirror", "sketch", "datum", "unite", "subtract",
    "intersect", "split", "extract", "offset", "shell", "thread", "expression",
];

static FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9_\-]+)\.(?:py|cs|vb|java)\b").unwrap());
static FIRST_WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[a-z]{3,}").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Extract one representative keyword from a request.
///
/// In priority order: the stem of a filename-like token with a recognized
/// script extension; the first [`DOMAIN_VOCABULARY`] entry found as a
/// substring; the first alphabetic token of length ≥ 3; the lowercased
/// request unchanged. Always returns a string (possibly empty for empty
/// input), never fails.
pub fn extract_keyword(request: &str) -> String {
    let lowered = request.to_lowercase();

    if let Some(caps) = FILENAME_RE.captures(request) {
        return caps[1].to_lowercase();
    }

    for word in DOMAIN_VOCABULARY {
        if lowered.contains(word) {
            return (*word).to_string();
        }
    }

    if let Some(token) = FIRST_WORD_RE.find(&lowered) {
        return token.as_str().to_string();
    }

    lowered
}

/// Extract every decimal-integer run from a request, in order.
///
/// "create a block 100 100 50" → `["100", "100", "50"]`. These become the
/// values substituted for `{paramN}` placeholders in generated code.
pub fn extract_params(request: &str) -> Vec<String> {
    NUMBER_RE
        .find_iter(request)
        .map(|m| m.as_str().to_string())
        .collect()
}
