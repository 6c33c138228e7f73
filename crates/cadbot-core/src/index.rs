//! TF-IDF similarity index over a fixed example corpus.
//!
//! The index is built once per corpus load and treated as read-only
//! afterwards; a corpus change means building a fresh index and swapping
//! it in whole. All queries are deterministic for a fixed document order.
//!
//! # Indexing Algorithm
//!
//! 1. Lowercase each document and split it into alphanumeric tokens of
//!    length ≥ 2, dropping a standard stop-word set.
//! 2. Form phrase terms: all n-grams of the remaining tokens up to length 3.
//! 3. Count document frequency per term; drop terms below `MIN_DOC_FREQ`
//!    or present in more than `MAX_DOC_RATIO` of documents. If the ratio
//!    filter would empty the vocabulary of a non-empty corpus (single-file
//!    corpora hit this), it is skipped.
//! 4. Weight: `tf × idf` with smoothed `idf = ln((1+N)/(1+df)) + 1`.
//! 5. L2-normalize each document vector, so cosine similarity reduces to a
//!    sparse dot product.
//!
//! # Queries
//!
//! Query text goes through the same tokenization; terms outside the
//! vocabulary are ignored. Results are ranked by cosine similarity,
//! highest first, with document index as the tie-break.

use std::collections::{HashMap, HashSet};

use crate::models::Document;

/// Longest phrase (n-gram) indexed.
const NGRAM_MAX: usize = 3;
/// Terms must appear in at least this many documents.
const MIN_DOC_FREQ: usize = 1;
/// Terms present in more than this fraction of documents are ignored.
const MAX_DOC_RATIO: f64 = 0.95;

/// Standard English stop words, dropped before n-gram formation.
const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "if",
    "in", "into", "is", "it", "its", "no", "not", "of", "on", "or", "such", "that", "the", "then",
    "there", "these", "they", "this", "to", "was", "were", "will", "with",
];

/// Searchable similarity index over an ordered document collection.
///
/// `document_vectors[i]` corresponds to position `i` of the corpus the
/// index was built from. An index built from an empty corpus is the empty
/// sentinel: every query returns no results rather than failing.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    /// Term → smoothed inverse document frequency.
    vocabulary: HashMap<String, f64>,
    document_vectors: Vec<HashMap<String, f64>>,
}

impl CorpusIndex {
    /// Build an index over `documents`. Idempotent for a fixed input list.
    pub fn build(documents: &[Document]) -> Self {
        let n_docs = documents.len();
        if n_docs == 0 {
            return Self::default();
        }

        let doc_terms: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| term_sequence(&doc.text))
            .collect();

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        for terms in &doc_terms {
            let distinct: HashSet<&String> = terms.iter().collect();
            for term in distinct {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let max_df = (n_docs as f64 * MAX_DOC_RATIO).floor() as usize;
        let mut vocabulary: HashMap<String, f64> = doc_freq
            .iter()
            .filter(|(_, &df)| df >= MIN_DOC_FREQ && df <= max_df)
            .map(|(term, &df)| (term.clone(), smoothed_idf(df, n_docs)))
            .collect();

        // A single-file corpus has every term in 100% of documents; keep the
        // index usable rather than strictly honoring the ratio cutoff.
        if vocabulary.is_empty() {
            vocabulary = doc_freq
                .iter()
                .filter(|(_, &df)| df >= MIN_DOC_FREQ)
                .map(|(term, &df)| (term.clone(), smoothed_idf(df, n_docs)))
                .collect();
        }

        let document_vectors = doc_terms
            .iter()
            .map(|terms| weighted_vector(terms, &vocabulary))
            .collect();

        Self {
            vocabulary,
            document_vectors,
        }
    }

    /// Rank every document by cosine similarity to `text`, highest first.
    ///
    /// Returns `(document_index, score)` pairs with scores in `[0.0, 1.0]`.
    /// Ties resolve to the lower document index. An empty index, or a query
    /// with no in-vocabulary terms, produces all-zero scores (the latter)
    /// or an empty list (the former).
    pub fn query(&self, text: &str) -> Vec<(usize, f64)> {
        if self.document_vectors.is_empty() {
            return Vec::new();
        }

        let query_vec = weighted_vector(&term_sequence(text), &self.vocabulary);

        let mut ranked: Vec<(usize, f64)> = self
            .document_vectors
            .iter()
            .enumerate()
            .map(|(i, doc_vec)| (i, dot(&query_vec, doc_vec)))
            .collect();

        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });

        ranked
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.document_vectors.len()
    }

    /// Number of distinct terms in the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// True for the empty-index sentinel.
    pub fn is_empty(&self) -> bool {
        self.document_vectors.is_empty()
    }
}

fn smoothed_idf(doc_freq: usize, n_docs: usize) -> f64 {
    ((1.0 + n_docs as f64) / (1.0 + doc_freq as f64)).ln() + 1.0
}

/// Lowercased word tokens and their n-grams up to [`NGRAM_MAX`], in order.
fn term_sequence(text: &str) -> Vec<String> {
    let words: Vec<String> = tokenize(text);
    let mut terms = Vec::with_capacity(words.len() * NGRAM_MAX);
    for n in 1..=NGRAM_MAX {
        if words.len() < n {
            break;
        }
        for window in words.windows(n) {
            terms.push(window.join(" "));
        }
    }
    terms
}

/// Lowercase alphanumeric tokens of length ≥ 2, stop words removed.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .filter(|token| token.len() >= 2)
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Build an L2-normalized `tf × idf` vector over vocabulary terms only.
fn weighted_vector(terms: &[String], vocabulary: &HashMap<String, f64>) -> HashMap<String, f64> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for term in terms {
        if vocabulary.contains_key(term.as_str()) {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let mut vector: HashMap<String, f64> = counts
        .into_iter()
        .map(|(term, tf)| (term.to_string(), tf as f64 * vocabulary[term]))
        .collect();

    let norm = vector.values().map(|w| w * w).sum::<f64>().sqrt();
    if norm > f64::EPSILON {
        for weight in vector.values_mut() {
            *weight /= norm;
        }
    }
    vector
}

/// Sparse dot product; both sides are already L2-normalized, so this is
/// the cosine similarity.
fn dot(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, w)| large.get(term).map(|v| w * v))
        .sum()
}
