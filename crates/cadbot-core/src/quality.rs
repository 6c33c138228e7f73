//! Deterministic structural quality scoring for generated code.
//!
//! Six independent case-insensitive substring checks with fixed weights
//! summing to 100. The rubric never executes the code; it only verifies
//! that the structural skeleton of a well-formed journal is present.
//!
//! | Check | Substring | Weight |
//! |-------|-----------|--------|
//! | import statement | `import` | 20 |
//! | main function | `def main` | 20 |
//! | session acquisition | `getsession()` | 15 |
//! | builder usage | `builder` | 15 |
//! | commit call | `.commit()` | 15 |
//! | destroy call | `.destroy()` | 15 |

use serde::Serialize;

const W_IMPORT: u32 = 20;
const W_MAIN: u32 = 20;
const W_SESSION: u32 = 15;
const W_BUILDER: u32 = 15;
const W_COMMIT: u32 = 15;
const W_DESTROY: u32 = 15;

/// Score at or above which code is considered production-ready.
const HIGH_QUALITY: u32 = 90;
/// Score at or above which code is considered usable with adjustments.
const GOOD_QUALITY: u32 = 70;

pub const NO_CODE_MESSAGE: &str = "No code to score";
pub const HIGH_QUALITY_MESSAGE: &str = "High quality - production ready";
pub const GOOD_QUALITY_MESSAGE: &str = "Good quality - may need adjustments";
pub const LOW_QUALITY_MESSAGE: &str = "Below quality standard - review before use";

/// Results of the six structural checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QualityChecklist {
    pub has_import: bool,
    pub has_main_function: bool,
    pub has_session: bool,
    pub has_builder: bool,
    pub has_commit: bool,
    pub has_destroy: bool,
}

impl QualityChecklist {
    /// Named check results in fixed order, paired with their weights.
    pub fn entries(&self) -> [(&'static str, bool, u32); 6] {
        [
            ("import_statement", self.has_import, W_IMPORT),
            ("main_function", self.has_main_function, W_MAIN),
            ("session_acquisition", self.has_session, W_SESSION),
            ("builder_usage", self.has_builder, W_BUILDER),
            ("commit_call", self.has_commit, W_COMMIT),
            ("destroy_call", self.has_destroy, W_DESTROY),
        ]
    }
}

/// A scored quality assessment of one piece of generated code.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub checklist: QualityChecklist,
    /// Sum of the weights of passing checks, in `0..=100`.
    pub score: u32,
    /// Human-readable category for the score.
    pub message: &'static str,
}

/// Apply the rubric to `code`.
///
/// Empty (or whitespace-only) code short-circuits to score 0 with
/// [`NO_CODE_MESSAGE`]; the substring checks never run against it.
pub fn score_code(code: &str) -> QualityReport {
    if code.trim().is_empty() {
        return QualityReport {
            checklist: QualityChecklist::default(),
            score: 0,
            message: NO_CODE_MESSAGE,
        };
    }

    let lowered = code.to_lowercase();
    let checklist = QualityChecklist {
        has_import: lowered.contains("import"),
        has_main_function: lowered.contains("def main"),
        has_session: lowered.contains("getsession()"),
        has_builder: lowered.contains("builder"),
        has_commit: lowered.contains(".commit()"),
        has_destroy: lowered.contains(".destroy()"),
    };

    let score = checklist
        .entries()
        .iter()
        .filter(|(_, passed, _)| *passed)
        .map(|(_, _, weight)| weight)
        .sum();

    QualityReport {
        checklist,
        score,
        message: categorize(score),
    }
}

fn categorize(score: u32) -> &'static str {
    if score >= HIGH_QUALITY {
        HIGH_QUALITY_MESSAGE
    } else if score >= GOOD_QUALITY {
        GOOD_QUALITY_MESSAGE
    } else {
        LOW_QUALITY_MESSAGE
    }
}
