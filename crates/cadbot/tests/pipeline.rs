use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{bail, Result};
use async_trait::async_trait;
use tempfile::TempDir;

use cadbot::cache::MemoryCache;
use cadbot::config::CorpusConfig;
use cadbot::corpus::load_corpus;
use cadbot::pipeline::{explain_code, run_generation, GenerationOutcome};
use cadbot::provider::GenerationProvider;
use cadbot_core::index::CorpusIndex;
use cadbot_core::matcher::MatcherParams;
use cadbot_core::models::{Document, MatchStrategy};

const BLOCK_EXAMPLE: &str = r#"# Creates a block with given dimensions
import NXOpen

def main():
    the_session = NXOpen.Session.GetSession()
    work_part = the_session.Parts.Work

    length = "{param1}"
    width = "{param2}"
    height = "{param3}"

    block_builder = work_part.Features.CreateBlockFeatureBuilder(None)
    block_builder.SetOriginAndLengths(NXOpen.Point3d(0.0, 0.0, 0.0), length, width, height)
    block_feature = block_builder.Commit()
    block_builder.Destroy()

if __name__ == "__main__":
    main()
"#;

/// Scripted provider: returns a fixed response and counts calls.
struct ScriptedProvider {
    response: String,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationProvider for ScriptedProvider {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

/// Provider whose transport always fails.
struct FailingProvider;

#[async_trait]
impl GenerationProvider for FailingProvider {
    fn model_name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("connection refused")
    }
}

fn block_corpus() -> Vec<Document> {
    vec![Document::new("block.py", BLOCK_EXAMPLE)]
}

#[tokio::test]
async fn scenario_a_keyword_match_and_full_substitution() {
    let corpus = block_corpus();
    let index = CorpusIndex::build(&corpus);
    let params = MatcherParams::default();

    let response = format!("Here is the journal:\n```python\n{}```\n", BLOCK_EXAMPLE);
    let provider = ScriptedProvider::new(&response);

    let report = run_generation(
        "create a block 100 100 50",
        &corpus,
        &index,
        &params,
        &provider,
    )
    .await;

    let matched = report.match_result.expect("a match");
    assert_eq!(matched.document_name, "block.py");
    assert_eq!(matched.strategy, MatchStrategy::Keyword);
    assert_eq!(matched.confidence, 0.85);

    match report.outcome {
        GenerationOutcome::Success(generated) => {
            assert!(generated.code.contains("length = \"100\""));
            assert!(generated.code.contains("width = \"100\""));
            assert!(generated.code.contains("height = \"50\""));
            assert!(!generated.code.contains("{param"));
            assert_eq!(generated.quality.score, 100);
        }
        other => panic!("expected success, got {}", other.label()),
    }
}

#[tokio::test]
async fn scenario_b_empty_corpus_uses_fallback_prompt() {
    let corpus: Vec<Document> = Vec::new();
    let index = CorpusIndex::build(&corpus);
    let provider = ScriptedProvider::new("no code here, sorry");

    let report = run_generation(
        "make a cylinder",
        &corpus,
        &index,
        &MatcherParams::default(),
        &provider,
    )
    .await;

    assert!(report.match_result.is_none());
    assert!(!report.prompt.contains("Reference example"));
    assert!(report.prompt.contains("make a cylinder"));
}

#[tokio::test]
async fn scenario_c_untagged_fence_extracts_exactly() {
    let body = "import Foo\n\ndef main():\n    value = compute_the_thing()\n    return value\n";
    let response = format!(
        "Sure! Here's your code:\n```\n{}```\nLet me know if you need anything else.",
        body
    );
    let corpus = block_corpus();
    let index = CorpusIndex::build(&corpus);
    let provider = ScriptedProvider::new(&response);

    let report = run_generation("block 1 2 3", &corpus, &index, &MatcherParams::default(), &provider).await;

    match report.outcome {
        GenerationOutcome::Success(generated) => {
            assert_eq!(generated.code, body.trim());
        }
        other => panic!("expected success, got {}", other.label()),
    }
}

#[tokio::test]
async fn scenario_d_missing_destroy_scores_85() {
    let code = "import Foo\ndef main():\n    s = NXOpen.Session.GetSession()\n    b = Builder()\n    b.Commit()\n";
    let response = format!("```python\n{}```", code);
    let corpus = block_corpus();
    let index = CorpusIndex::build(&corpus);
    let provider = ScriptedProvider::new(&response);

    let report = run_generation("block", &corpus, &index, &MatcherParams::default(), &provider).await;

    match report.outcome {
        GenerationOutcome::Success(generated) => {
            assert_eq!(generated.quality.score, 85);
            assert!(generated.quality.message.contains("adjustments"));
            assert!(!generated.quality.checklist.has_destroy);
        }
        other => panic!("expected success, got {}", other.label()),
    }
}

#[tokio::test]
async fn provider_failure_is_distinct_from_extraction_failure() {
    let corpus = block_corpus();
    let index = CorpusIndex::build(&corpus);
    let params = MatcherParams::default();

    let failed = run_generation("block", &corpus, &index, &params, &FailingProvider).await;
    match failed.outcome {
        GenerationOutcome::ProviderFailure { error } => {
            assert!(error.contains("connection refused"));
        }
        other => panic!("expected provider failure, got {}", other.label()),
    }

    let prose = ScriptedProvider::new("I cannot help with that request.");
    let unextractable = run_generation("block", &corpus, &index, &params, &prose).await;
    match unextractable.outcome {
        GenerationOutcome::ExtractionFailure { raw_response } => {
            assert_eq!(raw_response, "I cannot help with that request.");
        }
        other => panic!("expected extraction failure, got {}", other.label()),
    }
}

#[tokio::test]
async fn explain_hits_cache_on_second_call() {
    let provider = ScriptedProvider::new("This script creates a block feature.");
    let mut cache = MemoryCache::new();

    let first = explain_code(BLOCK_EXAMPLE, &provider, &mut cache).await.unwrap();
    let second = explain_code(BLOCK_EXAMPLE, &provider, &mut cache).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(provider.call_count(), 1, "second call must come from cache");

    // Different text is a different fingerprint
    explain_code("import NXOpen\n", &provider, &mut cache).await.unwrap();
    assert_eq!(provider.call_count(), 2);
}

#[tokio::test]
async fn pipeline_over_a_real_corpus_directory() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("block.py"), BLOCK_EXAMPLE).unwrap();
    fs::write(
        tmp.path().join("fillet.py"),
        "import NXOpen\n\ndef main():\n    s = NXOpen.Session.GetSession()\n    radius = \"{param1}\"\n",
    )
    .unwrap();

    let config = CorpusConfig {
        root: tmp.path().to_path_buf(),
        include_globs: vec!["**/*.py".to_string()],
        exclude_globs: vec![],
    };
    let corpus = load_corpus(&config).unwrap();
    assert_eq!(corpus.len(), 2);

    let index = CorpusIndex::build(&corpus);
    let response = format!("```python\n{}```", BLOCK_EXAMPLE);
    let provider = ScriptedProvider::new(&response);

    let report = run_generation(
        "apply a fillet of radius 5",
        &corpus,
        &index,
        &MatcherParams::default(),
        &provider,
    )
    .await;

    let matched = report.match_result.expect("a match");
    assert_eq!(matched.document_name, "fillet.py");
    assert!(report.prompt.contains("Reference example: fillet.py"));
}
