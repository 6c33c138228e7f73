use anyhow::{bail, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use cadbot_core::models::Document;

use crate::config::CorpusConfig;

/// Load the example corpus from the configured directory.
///
/// Returns documents sorted by name; the order is the tie-break contract
/// the matcher relies on. Unreadable or non-UTF-8 files are skipped.
pub fn load_corpus(config: &CorpusConfig) -> Result<Vec<Document>> {
    let root = &config.root;
    if !root.exists() {
        bail!("Corpus root does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.include_globs)?;

    let mut default_excludes = vec![
        "**/.git/**".to_string(),
        "**/__pycache__/**".to_string(),
    ];
    default_excludes.extend(config.exclude_globs.clone());
    let exclude_set = build_globset(&default_excludes)?;

    let mut documents = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => continue,
        };

        documents.push(Document::new(rel_str, text));
    }

    // Sort for deterministic ordering
    documents.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(documents)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn setup(files: &[(&str, &str)]) -> (tempfile::TempDir, CorpusConfig) {
        let tmp = tempfile::TempDir::new().unwrap();
        for (name, text) in files {
            let path = tmp.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, text).unwrap();
        }
        let config = CorpusConfig {
            root: tmp.path().to_path_buf(),
            include_globs: vec!["**/*.py".to_string()],
            exclude_globs: vec![],
        };
        (tmp, config)
    }

    #[test]
    fn test_loads_matching_files_sorted() {
        let (_tmp, config) = setup(&[
            ("fillet.py", "fillet code"),
            ("block.py", "block code"),
            ("notes.txt", "not a script"),
        ]);
        let documents = load_corpus(&config).unwrap();
        let names: Vec<&str> = documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["block.py", "fillet.py"]);
        assert_eq!(documents[0].text, "block code");
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let config = CorpusConfig {
            root: PathBuf::from("/nonexistent/corpus"),
            include_globs: vec!["**/*.py".to_string()],
            exclude_globs: vec![],
        };
        assert!(load_corpus(&config).is_err());
    }

    #[test]
    fn test_exclude_globs_apply() {
        let (_tmp, mut config) = setup(&[
            ("block.py", "keep"),
            ("legacy/old.py", "drop"),
        ]);
        config.exclude_globs = vec!["legacy/**".to_string()];
        let documents = load_corpus(&config).unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, "block.py");
    }

    #[test]
    fn test_empty_directory_is_an_empty_corpus() {
        let (_tmp, config) = setup(&[]);
        assert!(load_corpus(&config).unwrap().is_empty());
    }
}
