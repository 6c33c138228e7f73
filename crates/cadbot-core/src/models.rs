//! Core data models used throughout cadbot.
//!
//! These types represent the example documents, match results, and pattern
//! summaries that flow through the retrieval and generation pipeline.

use serde::Serialize;

/// One example script available for matching. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Unique identifier, typically the file name (e.g. `block.py`).
    pub name: String,
    /// Full source content.
    pub text: String,
}

impl Document {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// The document name with its final extension stripped
    /// (`block.py` → `block`).
    pub fn stem(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.name)
    }
}

/// Which matcher strategy produced a [`MatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchStrategy {
    /// The request mentioned a document by name.
    ExactName,
    /// The extracted keyword matched a document name (or rescued a weak
    /// vector result).
    Keyword,
    /// Cosine similarity against the corpus index.
    VectorSimilarity,
    /// Cosine similarity, boosted because the keyword occurs in the
    /// matched document's text.
    VectorSimilarityWithKeywordBoost,
}

impl MatchStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStrategy::ExactName => "exact-name",
            MatchStrategy::Keyword => "keyword",
            MatchStrategy::VectorSimilarity => "vector-similarity",
            MatchStrategy::VectorSimilarityWithKeywordBoost => "vector-similarity+keyword-boost",
        }
    }
}

/// The best example for a request. Produced per query, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Position of the matched document in the corpus the matcher was given.
    pub document_index: usize,
    /// Name of the matched document.
    pub document_name: String,
    /// Match strength in `[0.0, 1.0]`. Ordinal, not a probability.
    pub confidence: f64,
    /// Strategy that produced the match.
    pub strategy: MatchStrategy,
}

/// Structural markers extracted from one example's text.
///
/// Every field defaults to empty/absent; the scans in
/// [`patterns`](crate::patterns) are independent, so any subset may be
/// populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PatternSummary {
    /// All import-statement lines, in source order.
    pub import_lines: Vec<String>,
    /// The session-initialization line, if present.
    pub session_init_line: Option<String>,
    /// The builder-creation line, if present.
    pub builder_creation_line: Option<String>,
    /// The span from the first commit call through the next destroy call.
    pub commit_destroy_snippet: Option<String>,
    /// Distinct `{paramN}` tokens found, ordered by N.
    pub placeholder_tokens: Vec<String>,
}
