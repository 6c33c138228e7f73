//! Request-scoped generation pipeline.
//!
//! One user submission runs one sequential pass: analyze → match →
//! extract patterns → compose prompt → provider call → extract code →
//! substitute parameters → score. All per-request state lives in the
//! returned [`PipelineReport`]; the pipeline itself holds nothing between
//! calls, so concurrent requests never share mutable state.
//!
//! Matching failures degrade gracefully to the no-example prompt.
//! Provider and extraction failures are surfaced as distinct
//! [`GenerationOutcome`] tags, never swallowed, and the raw response is
//! retained wherever one exists.

use anyhow::Result;

use cadbot_core::analyze::extract_params;
use cadbot_core::index::CorpusIndex;
use cadbot_core::matcher::{best_match, MatcherParams};
use cadbot_core::models::{Document, MatchResult};
use cadbot_core::params::{content_fingerprint, substitute_params};
use cadbot_core::patterns::extract_patterns;
use cadbot_core::prompt::{compose_with_example, compose_without_example};
use cadbot_core::quality::{score_code, QualityReport};
use cadbot_core::{extract, quality};

use crate::cache::ExplanationCache;
use crate::provider::GenerationProvider;

/// Code that survived extraction, with its provenance and score.
#[derive(Debug, Clone)]
pub struct GeneratedCode {
    /// The provider's response, verbatim.
    pub raw_response: String,
    /// Extracted code after parameter substitution.
    pub code: String,
    /// Structural quality assessment of `code`.
    pub quality: QualityReport,
}

/// Outcome of the provider + extraction stage.
///
/// Callers branch on the tag; a weak quality score on a `Success` is a
/// warning, not a failure.
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Code was generated, extracted, substituted, and scored.
    Success(GeneratedCode),
    /// The provider call failed; no response text exists.
    ProviderFailure { error: String },
    /// The provider responded, but no code block could be recovered.
    /// The raw response is retained for inspection.
    ExtractionFailure { raw_response: String },
}

impl GenerationOutcome {
    /// Short tag for display.
    pub fn label(&self) -> &'static str {
        match self {
            GenerationOutcome::Success(_) => "success",
            GenerationOutcome::ProviderFailure { .. } => "provider-failure",
            GenerationOutcome::ExtractionFailure { .. } => "extraction-failure",
        }
    }
}

/// Everything one request produced, owned by the caller.
#[derive(Debug)]
pub struct PipelineReport {
    /// The matched example, absent for an empty corpus or no match.
    pub match_result: Option<MatchResult>,
    /// The exact prompt sent to the provider, for audit display.
    pub prompt: String,
    /// What came back.
    pub outcome: GenerationOutcome,
}

/// Run the full generation pipeline for one request.
pub async fn run_generation(
    request: &str,
    corpus: &[Document],
    index: &CorpusIndex,
    matcher_params: &MatcherParams,
    provider: &dyn GenerationProvider,
) -> PipelineReport {
    let match_result = best_match(request, corpus, index, matcher_params);

    let prompt = compose_prompt(request, corpus, &match_result);

    let raw_response = match provider.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            return PipelineReport {
                match_result,
                prompt,
                outcome: GenerationOutcome::ProviderFailure {
                    error: e.to_string(),
                },
            }
        }
    };

    let code = match extract::extract_code(&raw_response) {
        Some(code) => code,
        None => {
            return PipelineReport {
                match_result,
                prompt,
                outcome: GenerationOutcome::ExtractionFailure { raw_response },
            }
        }
    };

    let code = substitute_params(&code, &extract_params(request));
    let quality = score_code(&code);

    PipelineReport {
        match_result,
        prompt,
        outcome: GenerationOutcome::Success(GeneratedCode {
            raw_response,
            code,
            quality,
        }),
    }
}

/// Compose the generation prompt, falling back to the no-example variant
/// when nothing matched.
fn compose_prompt(
    request: &str,
    corpus: &[Document],
    match_result: &Option<MatchResult>,
) -> String {
    match match_result {
        Some(result) => match corpus.get(result.document_index) {
            Some(doc) => {
                let summary = extract_patterns(&doc.text);
                compose_with_example(request, doc, &summary)
            }
            None => compose_without_example(request),
        },
        None => compose_without_example(request),
    }
}

/// Explain a script via the provider, with fingerprint-keyed caching.
///
/// Identical code text always produces the identical cache key, so an
/// explanation is generated at most once per distinct script.
pub async fn explain_code(
    code: &str,
    provider: &dyn GenerationProvider,
    cache: &mut dyn ExplanationCache,
) -> Result<String> {
    let key = content_fingerprint(code);
    if let Some(hit) = cache.get(&key) {
        return Ok(hit);
    }

    let explanation = provider.generate(&explanation_prompt(code)).await?;
    cache.put(&key, &explanation)?;
    Ok(explanation)
}

fn explanation_prompt(code: &str) -> String {
    format!(
        "You are an expert CAD developer assistant. Explain the following \
Siemens NXOpen Python code in clear, concise steps.\n\n```python\n{}\n```",
        code
    )
}

/// True when a successful outcome should be flagged as low quality.
pub fn is_low_quality(outcome: &GenerationOutcome) -> bool {
    matches!(
        outcome,
        GenerationOutcome::Success(generated)
            if generated.quality.message == quality::LOW_QUALITY_MESSAGE
    )
}
