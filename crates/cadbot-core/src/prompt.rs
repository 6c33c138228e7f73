//! Deterministic prompt assembly for the generation provider.
//!
//! Two variants: an example-anchored prompt embedding the matched script
//! and a digest of its patterns, and a fallback prompt for when no example
//! is available (empty corpus, no match). Both are pure string composition
//! and never fail for any input, including the empty string.

use crate::models::{Document, PatternSummary};

/// Import lines included in the pattern digest.
const DIGEST_IMPORT_LINES: usize = 3;

/// Mandatory code-generation requirements, prepended to every prompt.
const SYSTEM_DIRECTIVE: &str = "You are an expert Siemens NX automation developer. \
Generate a complete NXOpen Python journal that fulfills the user's request.

Requirements:
- Emit a complete, runnable script: imports, a main() function, and an entry point.
- Acquire the session with NXOpen.Session.GetSession() and operate on the work part.
- Use the builder idiom: create the builder, set its inputs, Commit(), then Destroy() the builder.
- Expose every user-adjustable dimension as a {paramN} placeholder ({param1}, {param2}, ...) instead of a hard-coded value.
- Handle errors: guard against a missing work part and close any listing window you open.
- All dimensions are in millimeters.";

/// Compose the generation prompt anchored on a matched example.
///
/// Fixed order: directive, the full example labeled as the reference, a
/// condensed digest of its patterns, the verbatim request, and a closing
/// emit-code-only instruction.
pub fn compose_with_example(
    request: &str,
    example: &Document,
    summary: &PatternSummary,
) -> String {
    let mut prompt = String::new();
    prompt.push_str(SYSTEM_DIRECTIVE);

    prompt.push_str("\n\n## Reference example: ");
    prompt.push_str(&example.name);
    prompt.push_str("\nReplicate the structure of this script.\n\n```python\n");
    prompt.push_str(&example.text);
    if !example.text.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("```\n");

    push_digest(&mut prompt, summary);

    prompt.push_str("\n## User request\n");
    prompt.push_str(request);
    prompt.push_str(
        "\n\nRespond with the code only, matching the reference structure exactly.",
    );
    prompt
}

/// Compose the fallback prompt used when no example is available.
pub fn compose_without_example(request: &str) -> String {
    format!(
        "{}\n\n## User request\n{}\n\nRespond with the code only, inside a single ```python fenced block.",
        SYSTEM_DIRECTIVE, request
    )
}

/// Condensed pattern digest: first imports, the session line, and the
/// placeholder tokens. Sections with nothing to say are omitted.
fn push_digest(prompt: &mut String, summary: &PatternSummary) {
    if !summary.import_lines.is_empty() {
        prompt.push_str("\nKey imports:\n");
        for line in summary.import_lines.iter().take(DIGEST_IMPORT_LINES) {
            prompt.push_str(&format!("- {}\n", line));
        }
    }
    if let Some(ref line) = summary.session_init_line {
        prompt.push_str(&format!("Session initialization: {}\n", line));
    }
    if !summary.placeholder_tokens.is_empty() {
        prompt.push_str(&format!(
            "Placeholders to preserve: {}\n",
            summary.placeholder_tokens.join(", ")
        ));
    }
}
