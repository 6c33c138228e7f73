//! Persisted explanation cache keyed by content fingerprint.
//!
//! Maps [`content_fingerprint`](cadbot_core::params::content_fingerprint)
//! values to previously generated explanation text, so repeat requests for
//! the same code skip the provider round-trip. The cache is an explicit
//! dependency passed into the pipeline, never ambient process state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Get/put interface for explanation caching.
pub trait ExplanationCache: Send + Sync {
    /// Look up a previously stored explanation.
    fn get(&self, fingerprint: &str) -> Option<String>;

    /// Store an explanation under a fingerprint.
    fn put(&mut self, fingerprint: &str, explanation: &str) -> Result<()>;
}

/// JSON-file-backed cache: a single flat object of fingerprint → text.
///
/// A missing or corrupt file degrades to an empty cache; entries are
/// persisted on every put.
pub struct JsonFileCache {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileCache {
    pub fn open(path: &Path) -> Self {
        let entries = std::fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write cache file: {}", self.path.display()))
    }
}

impl ExplanationCache for JsonFileCache {
    fn get(&self, fingerprint: &str) -> Option<String> {
        self.entries.get(fingerprint).cloned()
    }

    fn put(&mut self, fingerprint: &str, explanation: &str) -> Result<()> {
        self.entries
            .insert(fingerprint.to_string(), explanation.to_string());
        self.persist()
    }
}

/// In-memory cache for tests and cache-disabled runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: BTreeMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExplanationCache for MemoryCache {
    fn get(&self, fingerprint: &str) -> Option<String> {
        self.entries.get(fingerprint).cloned()
    }

    fn put(&mut self, fingerprint: &str, explanation: &str) -> Result<()> {
        self.entries
            .insert(fingerprint.to_string(), explanation.to_string());
        Ok(())
    }
}
