//! Code-block recovery from unstructured LLM responses.
//!
//! Providers drift between response formats: a tagged fence, a bare fence,
//! a labeled section, or code pasted inline with prose around it. Each
//! format has its own extraction function; [`extract_code`] tries them in
//! order and accepts the first candidate longer than [`MIN_CODE_LEN`].
//! Rejecting short candidates filters out accidental empty or near-empty
//! fenced blocks.
//!
//! Extraction failure returns `None`; callers treat that as a hard
//! generation failure and keep the raw response for inspection.

use std::sync::LazyLock;

use regex::Regex;

/// Minimum trimmed length for an accepted candidate.
pub const MIN_CODE_LEN: usize = 50;

/// Inline markers that unmistakably start generated journal code.
const CODE_MARKERS: &[&str] = &["import NXOpen", "Session.GetSession("];

static TAGGED_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```python[ \t]*\n(.*?)```").unwrap());
static ANY_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\n(.*?)```").unwrap());
static SECTION_HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^.*(?:GENERATED CODE|CODE:).*$").unwrap());

/// Recover a code block from response text, trying each strategy in order.
pub fn extract_code(response: &str) -> Option<String> {
    if response.trim().is_empty() {
        return None;
    }
    tagged_fence(response)
        .or_else(|| any_fence(response))
        .or_else(|| labeled_section(response))
        .or_else(|| marker_scan(response))
}

/// Accept a candidate only if its trimmed length reaches [`MIN_CODE_LEN`].
fn accept(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();
    if trimmed.len() >= MIN_CODE_LEN {
        Some(trimmed.to_string())
    } else {
        None
    }
}

/// Strategy 1: a fenced block tagged `python`.
fn tagged_fence(response: &str) -> Option<String> {
    TAGGED_FENCE_RE
        .captures(response)
        .and_then(|caps| accept(&caps[1]))
}

/// Strategy 2: any fenced block, tagged or not.
fn any_fence(response: &str) -> Option<String> {
    ANY_FENCE_RE
        .captures(response)
        .and_then(|caps| accept(&caps[1]))
}

/// Strategy 3: a fenced block after a "GENERATED CODE" / "CODE:" heading.
fn labeled_section(response: &str) -> Option<String> {
    let heading = SECTION_HEADING_RE.find(response)?;
    let section = &response[heading.end()..];
    ANY_FENCE_RE
        .captures(section)
        .and_then(|caps| accept(&caps[1]))
}

/// Strategy 4: everything from the first unmistakable code marker onward.
fn marker_scan(response: &str) -> Option<String> {
    let pos = CODE_MARKERS
        .iter()
        .filter_map(|marker| response.find(marker))
        .min()?;
    let line_start = response[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    accept(&response[line_start..])
}
