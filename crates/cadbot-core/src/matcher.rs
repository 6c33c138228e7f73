//! Layered example matching: exact name → keyword → vector similarity →
//! keyword rescue.
//!
//! Strategies run in strict priority order; the first one that produces a
//! result wins and later strategies are not consulted. Each strategy is a
//! named function returning an `Option` so it can be tested on its own.
//!
//! # Strategy Order
//!
//! 1. **Exact name** (confidence `exact_name_confidence`): the request
//!    mentions a document by file name, or the request itself is contained
//!    in a document's stripped name.
//! 2. **Keyword** (`keyword_confidence`): the analyzer keyword is a
//!    substring of a document name.
//! 3. **Vector similarity**: cosine score from the [`CorpusIndex`], with a
//!    `keyword_boost` (capped at `boost_cap`) when the keyword also occurs
//!    in the matched document's text. Requests shorter than
//!    `short_query_words` words are padded with a fixed domain phrase
//!    first; very short queries produce unstable cosine scores.
//! 4. **Rescue**: a vector confidence below `rescue_threshold` is weaker
//!    evidence than a keyword hit anywhere in a document, so a linear scan
//!    for the keyword returns that document at `rescue_confidence`.
//!
//! An empty corpus, or all strategies exhausted, yields `None` — never an
//! error. Confidence is a user-facing signal in `[0, 1]`, not a gate.

use crate::analyze::extract_keyword;
use crate::index::CorpusIndex;
use crate::models::{Document, MatchResult, MatchStrategy};

/// Matching tuning parameters, decoupled from application config.
///
/// The confidence constants are empirically chosen; they are carried as
/// configuration rather than derived from a formula.
#[derive(Debug, Clone)]
pub struct MatcherParams {
    /// Confidence assigned to an exact-name hit.
    pub exact_name_confidence: f64,
    /// Confidence assigned to a keyword-in-name hit.
    pub keyword_confidence: f64,
    /// Confidence assigned to a rescue hit.
    pub rescue_confidence: f64,
    /// Added to the cosine score when the keyword occurs in the matched text.
    pub keyword_boost: f64,
    /// Ceiling for the boosted confidence.
    pub boost_cap: f64,
    /// Vector confidences below this trigger the rescue scan.
    pub rescue_threshold: f64,
    /// Requests with fewer words than this are padded before vectorizing.
    pub short_query_words: usize,
}

impl Default for MatcherParams {
    fn default() -> Self {
        Self {
            exact_name_confidence: 0.95,
            keyword_confidence: 0.85,
            rescue_confidence: 0.75,
            keyword_boost: 0.30,
            boost_cap: 0.95,
            rescue_threshold: 0.5,
            short_query_words: 5,
        }
    }
}

/// Appended to short queries before vectorizing.
const SHORT_QUERY_PADDING: &str = "create cad part model feature geometry operation";

/// Resolve a request to the single best document, if any.
pub fn best_match(
    request: &str,
    corpus: &[Document],
    index: &CorpusIndex,
    params: &MatcherParams,
) -> Option<MatchResult> {
    if corpus.is_empty() {
        return None;
    }

    if let Some(result) = match_exact_name(request, corpus, params) {
        return Some(result);
    }

    let keyword = extract_keyword(request);
    if let Some(result) = match_keyword(&keyword, corpus, params) {
        return Some(result);
    }

    let vector = match_vector(request, &keyword, corpus, index, params);

    match vector {
        Some(result) if result.confidence >= params.rescue_threshold => Some(result),
        weak => {
            if !keyword.is_empty() {
                if let Some(rescued) = match_rescue(&keyword, corpus, params) {
                    return Some(rescued);
                }
            }
            weak
        }
    }
}

/// Strategy 1: the request names a document.
///
/// Fires when the full document name occurs in the request (`"run
/// block.py"`) or the trimmed request is contained in the stripped name
/// (the user typed the bare name). A stem buried in a longer sentence is
/// deliberately left to the keyword strategy.
pub fn match_exact_name(
    request: &str,
    corpus: &[Document],
    params: &MatcherParams,
) -> Option<MatchResult> {
    let request_lower = request.trim().to_lowercase();
    if request_lower.is_empty() {
        return None;
    }

    for (i, doc) in corpus.iter().enumerate() {
        let name_lower = doc.name.to_lowercase();
        let stem_lower = doc.stem().to_lowercase();
        if name_lower.is_empty() || stem_lower.is_empty() {
            continue;
        }
        if request_lower.contains(&name_lower) || stem_lower.contains(&request_lower) {
            return Some(MatchResult {
                document_index: i,
                document_name: doc.name.clone(),
                confidence: params.exact_name_confidence,
                strategy: MatchStrategy::ExactName,
            });
        }
    }
    None
}

/// Strategy 2: the extracted keyword is a substring of a document name.
pub fn match_keyword(
    keyword: &str,
    corpus: &[Document],
    params: &MatcherParams,
) -> Option<MatchResult> {
    if keyword.is_empty() {
        return None;
    }

    for (i, doc) in corpus.iter().enumerate() {
        if doc.name.to_lowercase().contains(keyword) {
            return Some(MatchResult {
                document_index: i,
                document_name: doc.name.clone(),
                confidence: params.keyword_confidence,
                strategy: MatchStrategy::Keyword,
            });
        }
    }
    None
}

/// Strategy 3: cosine similarity with optional keyword boost.
pub fn match_vector(
    request: &str,
    keyword: &str,
    corpus: &[Document],
    index: &CorpusIndex,
    params: &MatcherParams,
) -> Option<MatchResult> {
    let padded;
    let query = if request.split_whitespace().count() < params.short_query_words {
        padded = format!("{} {}", request, SHORT_QUERY_PADDING);
        padded.as_str()
    } else {
        request
    };

    let ranked = index.query(query);
    let &(top, score) = ranked.first()?;
    let doc = corpus.get(top)?;

    let boosted = !keyword.is_empty() && doc.text.to_lowercase().contains(keyword);
    let (confidence, strategy) = if boosted {
        (
            (score + params.keyword_boost).min(params.boost_cap),
            MatchStrategy::VectorSimilarityWithKeywordBoost,
        )
    } else {
        (score, MatchStrategy::VectorSimilarity)
    };

    Some(MatchResult {
        document_index: top,
        document_name: doc.name.clone(),
        confidence: confidence.clamp(0.0, 1.0),
        strategy,
    })
}

/// Strategy 4: rescue a weak vector result with a keyword scan over names
/// and bodies.
pub fn match_rescue(
    keyword: &str,
    corpus: &[Document],
    params: &MatcherParams,
) -> Option<MatchResult> {
    for (i, doc) in corpus.iter().enumerate() {
        if doc.name.to_lowercase().contains(keyword) || doc.text.to_lowercase().contains(keyword) {
            return Some(MatchResult {
                document_index: i,
                document_name: doc.name.clone(),
                confidence: params.rescue_confidence,
                strategy: MatchStrategy::Keyword,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new(
                "block.py",
                "import NXOpen\ncreate a solid block with {param1} {param2} {param3}",
            ),
            Document::new(
                "cylinder.py",
                "import NXOpen\ncreate a cylinder with diameter {param1} and height {param2}",
            ),
            Document::new(
                "fillet.py",
                "import NXOpen\napply an edge blend radius {param1} to selected edges",
            ),
        ]
    }

    fn run(request: &str, docs: &[Document]) -> Option<MatchResult> {
        let index = CorpusIndex::build(docs);
        best_match(request, docs, &index, &MatcherParams::default())
    }

    #[test]
    fn test_empty_corpus_never_matches() {
        assert!(run("create a block", &[]).is_none());
        assert!(run("", &[]).is_none());
    }

    #[test]
    fn test_filename_mention_is_exact_name() {
        let result = run("please run block.py for me", &corpus()).unwrap();
        assert_eq!(result.document_name, "block.py");
        assert_eq!(result.strategy, MatchStrategy::ExactName);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_bare_name_request_is_exact_name() {
        let result = run("cylinder", &corpus()).unwrap();
        assert_eq!(result.document_name, "cylinder.py");
        assert_eq!(result.strategy, MatchStrategy::ExactName);
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_keyword_in_sentence_uses_keyword_strategy() {
        let result = run("create a block 100 100 50", &corpus()).unwrap();
        assert_eq!(result.document_name, "block.py");
        assert_eq!(result.strategy, MatchStrategy::Keyword);
        assert_eq!(result.confidence, 0.85);
    }

    #[test]
    fn test_empty_request_against_corpus_is_handled() {
        // Nothing to go on: no name, no keyword, an all-zero vector, and a
        // rescue scan with an empty keyword is skipped.
        let result = run("", &corpus());
        if let Some(m) = result {
            assert!(m.confidence <= 0.5);
        }
    }

    #[test]
    fn test_vector_strategy_for_descriptive_request() {
        let result = run(
            "I would like to round over the sharp edges of my part with a smooth blend",
            &corpus(),
        )
        .unwrap();
        assert_eq!(result.document_name, "fillet.py");
        assert!(matches!(
            result.strategy,
            MatchStrategy::VectorSimilarity
                | MatchStrategy::VectorSimilarityWithKeywordBoost
                | MatchStrategy::Keyword
        ));
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_boost_caps_at_configured_ceiling() {
        let docs = corpus();
        let index = CorpusIndex::build(&docs);
        let params = MatcherParams::default();
        let result = match_vector(
            &docs[1].text,
            "cylinder",
            &docs,
            &index,
            &params,
        )
        .unwrap();
        assert_eq!(result.strategy, MatchStrategy::VectorSimilarityWithKeywordBoost);
        assert!(result.confidence <= params.boost_cap + 1e-9);
    }

    #[test]
    fn test_rescue_recovers_text_only_keyword() {
        // "datum" appears only in a body, and the surrounding request
        // shares no vocabulary with the corpus, so the vector score is weak.
        let docs = vec![
            Document::new("misc_a.py", "nothing relevant lives here"),
            Document::new("setup.py", "construct the datum plane then exit"),
        ];
        let index = CorpusIndex::build(&docs);
        let result = best_match(
            "zz qq datum ww yy xx",
            &docs,
            &index,
            &MatcherParams::default(),
        )
        .unwrap();
        assert_eq!(result.document_name, "setup.py");
        assert_eq!(result.strategy, MatchStrategy::Keyword);
        assert_eq!(result.confidence, 0.75);
    }

    #[test]
    fn test_confidence_always_in_unit_interval() {
        let docs = corpus();
        for request in ["block.py", "a block please", "mystery widget", "", "42"] {
            if let Some(result) = run(request, &docs) {
                assert!(
                    (0.0..=1.0).contains(&result.confidence),
                    "confidence {} for {:?}",
                    result.confidence,
                    request
                );
            }
        }
    }

    #[test]
    fn test_corpus_order_breaks_exact_name_ties() {
        let docs = vec![
            Document::new("plate.py", "first"),
            Document::new("plate_thick.py", "second"),
        ];
        let index = CorpusIndex::build(&docs);
        let result = best_match("plate", &docs, &index, &MatcherParams::default()).unwrap();
        assert_eq!(result.document_index, 0);
    }
}
