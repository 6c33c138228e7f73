//! `{paramN}` placeholder substitution and content fingerprinting.
//!
//! Example scripts and generated code carry `{param1}`, `{param2}`, …
//! tokens standing in for user-supplied values. Substitution replaces each
//! token with the corresponding value, defaulting to `"0"`, and guarantees
//! the output contains no unresolved tokens.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{param(\d+)\}").unwrap());

/// Value substituted for placeholders without a supplied value.
const DEFAULT_PARAM_VALUE: &str = "0";

/// Highest placeholder index referenced in `code` (0 when there are none).
pub fn max_param_index(code: &str) -> usize {
    PLACEHOLDER_RE
        .captures_iter(code)
        .filter_map(|caps| caps[1].parse().ok())
        .max()
        .unwrap_or(0)
}

/// Replace every `{paramN}` token with the N-th value, or `"0"` when the
/// value list is too short.
///
/// A final cleanup pass replaces any token still present (including ones
/// introduced by the substituted values themselves), so the returned text
/// never contains a `{paramN}` token. Idempotent on fully-resolved text.
pub fn substitute_params(code: &str, values: &[String]) -> String {
    let mut out = code.to_string();
    for i in 1..=max_param_index(code) {
        let value = values
            .get(i - 1)
            .map(String::as_str)
            .unwrap_or(DEFAULT_PARAM_VALUE);
        out = out.replace(&format!("{{param{}}}", i), value);
    }
    PLACEHOLDER_RE
        .replace_all(&out, DEFAULT_PARAM_VALUE)
        .into_owned()
}

/// Stable hex fingerprint of the exact text, used as the explanation-cache
/// key. Identical text always produces an identical fingerprint.
pub fn content_fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_substitutes_in_order() {
        let code = "length = {param1}\nwidth = {param2}\nheight = {param3}";
        let out = substitute_params(code, &values(&["100", "100", "50"]));
        assert_eq!(out, "length = 100\nwidth = 100\nheight = 50");
    }

    #[test]
    fn test_missing_values_default_to_zero() {
        let code = "a = {param1}, b = {param2}";
        let out = substitute_params(code, &values(&["7"]));
        assert_eq!(out, "a = 7, b = 0");
    }

    #[test]
    fn test_no_tokens_survive() {
        let code = "x = {param1} {param2} {param9} {param12}";
        for supplied in [&[][..], &["1"][..], &["1", "2", "3"][..]] {
            let out = substitute_params(code, &values(supplied));
            assert!(!PLACEHOLDER_RE.is_match(&out), "leftover token in {:?}", out);
        }
    }

    #[test]
    fn test_idempotent_on_resolved_text() {
        let resolved = substitute_params("a = {param1}", &values(&["42"]));
        assert_eq!(substitute_params(&resolved, &values(&["99"])), resolved);
    }

    #[test]
    fn test_repeated_token_replaced_everywhere() {
        let code = "{param1} + {param1} + {param1}";
        assert_eq!(substitute_params(code, &values(&["5"])), "5 + 5 + 5");
    }

    #[test]
    fn test_value_containing_token_is_cleaned_up() {
        let out = substitute_params("x = {param1}", &values(&["{param2}"]));
        assert_eq!(out, "x = 0");
    }

    #[test]
    fn test_max_param_index() {
        assert_eq!(max_param_index("{param1} {param3}"), 3);
        assert_eq!(max_param_index("no tokens"), 0);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let a = content_fingerprint("import NXOpen");
        let b = content_fingerprint("import NXOpen");
        let c = content_fingerprint("import NXOpen ");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
