use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use cadbot_core::matcher::MatcherParams;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub matcher: MatcherConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorpusConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

fn default_include_globs() -> Vec<String> {
    vec!["**/*.py".to_string()]
}

#[derive(Debug, Deserialize, Clone)]
pub struct MatcherConfig {
    #[serde(default = "default_exact_name_confidence")]
    pub exact_name_confidence: f64,
    #[serde(default = "default_keyword_confidence")]
    pub keyword_confidence: f64,
    #[serde(default = "default_rescue_confidence")]
    pub rescue_confidence: f64,
    #[serde(default = "default_keyword_boost")]
    pub keyword_boost: f64,
    #[serde(default = "default_boost_cap")]
    pub boost_cap: f64,
    #[serde(default = "default_rescue_threshold")]
    pub rescue_threshold: f64,
    #[serde(default = "default_short_query_words")]
    pub short_query_words: usize,
}

fn default_exact_name_confidence() -> f64 {
    0.95
}
fn default_keyword_confidence() -> f64 {
    0.85
}
fn default_rescue_confidence() -> f64 {
    0.75
}
fn default_keyword_boost() -> f64 {
    0.30
}
fn default_boost_cap() -> f64 {
    0.95
}
fn default_rescue_threshold() -> f64 {
    0.5
}
fn default_short_query_words() -> usize {
    5
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            exact_name_confidence: default_exact_name_confidence(),
            keyword_confidence: default_keyword_confidence(),
            rescue_confidence: default_rescue_confidence(),
            keyword_boost: default_keyword_boost(),
            boost_cap: default_boost_cap(),
            rescue_threshold: default_rescue_threshold(),
            short_query_words: default_short_query_words(),
        }
    }
}

impl MatcherConfig {
    pub fn to_params(&self) -> MatcherParams {
        MatcherParams {
            exact_name_confidence: self.exact_name_confidence,
            keyword_confidence: self.keyword_confidence,
            rescue_confidence: self.rescue_confidence,
            keyword_boost: self.keyword_boost,
            boost_cap: self.boost_cap,
            rescue_threshold: self.rescue_threshold,
            short_query_words: self.short_query_words,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            url: None,
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    60
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./data/explanations.json")
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate corpus
    if config.corpus.include_globs.is_empty() {
        anyhow::bail!("corpus.include_globs must not be empty");
    }

    // Validate matcher
    let m = &config.matcher;
    for (name, value) in [
        ("exact_name_confidence", m.exact_name_confidence),
        ("keyword_confidence", m.keyword_confidence),
        ("rescue_confidence", m.rescue_confidence),
        ("boost_cap", m.boost_cap),
        ("rescue_threshold", m.rescue_threshold),
    ] {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("matcher.{} must be in [0.0, 1.0]", name);
        }
    }
    if m.keyword_boost < 0.0 {
        anyhow::bail!("matcher.keyword_boost must be >= 0.0");
    }
    if m.short_query_words == 0 {
        anyhow::bail!("matcher.short_query_words must be >= 1");
    }

    // Validate provider
    match config.provider.provider.as_str() {
        "disabled" | "groq" | "ollama" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled, groq, or ollama.",
            other
        ),
    }
    if config.provider.is_enabled() {
        if config.provider.model.is_none() {
            anyhow::bail!(
                "provider.model must be specified when provider is '{}'",
                config.provider.provider
            );
        }
        if config.provider.timeout_secs == 0 {
            anyhow::bail!("provider.timeout_secs must be > 0");
        }
    }

    Ok(config)
}
