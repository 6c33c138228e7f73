//! # cadbot CLI
//!
//! The `cadbot` binary drives the retrieval-augmented generation pipeline
//! from the command line.
//!
//! ## Usage
//!
//! ```bash
//! cadbot --config ./config/cadbot.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cadbot index` | Load the corpus, build the index, print statistics |
//! | `cadbot match "<request>"` | Show the best-matching example with confidence and strategy |
//! | `cadbot generate "<request>"` | Run the full pipeline and print the generated code |
//! | `cadbot explain <file>` | Explain a script via the provider, with caching |
//! | `cadbot score <file>` | Score a script against the quality rubric offline |
//!
//! ## Examples
//!
//! ```bash
//! # Inspect the corpus
//! cadbot index --config ./config/cadbot.toml
//!
//! # Which example would anchor this request?
//! cadbot match "create a block 100 100 50"
//!
//! # Generate code (requires a configured provider)
//! cadbot generate "create a cylinder with diameter 40" --show-prompt
//!
//! # Offline quality check of an existing journal
//! cadbot score ./corpus/block.py
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cadbot::cache::JsonFileCache;
use cadbot::config::{self, Config};
use cadbot::corpus::load_corpus;
use cadbot::pipeline::{explain_code, is_low_quality, run_generation, GenerationOutcome};
use cadbot::provider::create_provider;
use cadbot_core::index::CorpusIndex;
use cadbot_core::quality::score_code;

/// cadbot — retrieval-augmented code generation for CAD automation scripts.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/cadbot.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "cadbot",
    about = "Retrieval-augmented code generation for CAD automation scripts",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cadbot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Load the corpus and print index statistics.
    ///
    /// Useful for verifying configuration and checking what the matcher
    /// can see before issuing requests.
    Index,

    /// Show the best-matching example for a request.
    ///
    /// Prints the matched document, the confidence score, and which of the
    /// four strategies produced the match.
    Match {
        /// The free-text request.
        request: String,
    },

    /// Run the full generation pipeline for a request.
    ///
    /// Matches an example, prompts the configured provider, extracts the
    /// code, substitutes numeric parameters from the request, and prints
    /// the scored result. Requires `[provider]` to be configured.
    Generate {
        /// The free-text request.
        request: String,

        /// Also print the composed prompt (audit/debug output).
        #[arg(long)]
        show_prompt: bool,
    },

    /// Explain a script via the provider, with caching.
    ///
    /// Identical file content hits the explanation cache instead of the
    /// provider.
    Explain {
        /// Path to the script to explain.
        file: PathBuf,
    },

    /// Score a script against the quality rubric, offline.
    Score {
        /// Path to the script to score.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Scoring is offline and needs no configuration
    if let Commands::Score { file } = &cli.command {
        return run_score(file);
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Index => run_index(&cfg),
        Commands::Match { request } => run_match(&cfg, &request),
        Commands::Generate {
            request,
            show_prompt,
        } => run_generate(&cfg, &request, show_prompt).await,
        Commands::Explain { file } => run_explain(&cfg, &file).await,
        Commands::Score { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }
}

fn run_index(cfg: &Config) -> Result<()> {
    let corpus = load_corpus(&cfg.corpus)?;
    let index = CorpusIndex::build(&corpus);

    println!("Corpus root: {}", cfg.corpus.root.display());
    println!("Documents:   {}", index.document_count());
    println!("Vocabulary:  {} terms", index.vocabulary_size());
    for doc in &corpus {
        println!("  {:<32} {} bytes", doc.name, doc.text.len());
    }
    Ok(())
}

fn run_match(cfg: &Config, request: &str) -> Result<()> {
    let corpus = load_corpus(&cfg.corpus)?;
    let index = CorpusIndex::build(&corpus);
    let params = cfg.matcher.to_params();

    match cadbot_core::matcher::best_match(request, &corpus, &index, &params) {
        Some(result) => {
            println!("Matched:    {}", result.document_name);
            println!("Confidence: {:.2}", result.confidence);
            println!("Strategy:   {}", result.strategy.as_str());
        }
        None => {
            println!("No match. The corpus is empty or nothing fit the request.");
        }
    }
    Ok(())
}

async fn run_generate(cfg: &Config, request: &str, show_prompt: bool) -> Result<()> {
    let corpus = load_corpus(&cfg.corpus)?;
    let index = CorpusIndex::build(&corpus);
    let params = cfg.matcher.to_params();
    let provider = create_provider(&cfg.provider)?;

    let report = run_generation(request, &corpus, &index, &params, provider.as_ref()).await;

    match &report.match_result {
        Some(result) => {
            println!(
                "Example: {} (confidence {:.2}, {})",
                result.document_name,
                result.confidence,
                result.strategy.as_str()
            );
        }
        None => println!("Example: none (no-example prompt)"),
    }

    if show_prompt {
        println!("\n--- prompt ---\n{}\n--- end prompt ---\n", report.prompt);
    }

    if is_low_quality(&report.outcome) {
        println!("Warning: generated code is below the quality standard.");
    }

    match report.outcome {
        GenerationOutcome::Success(generated) => {
            println!("\n{}\n", generated.code);
            println!("Quality: {} ({})", generated.quality.score, generated.quality.message);
            for (name, passed, weight) in generated.quality.checklist.entries() {
                println!("  [{}] {:<20} ({})", if passed { "x" } else { " " }, name, weight);
            }
        }
        GenerationOutcome::ProviderFailure { error } => {
            anyhow::bail!("Generation provider failed: {}", error);
        }
        GenerationOutcome::ExtractionFailure { raw_response } => {
            println!("No code block could be extracted. Raw response:\n");
            println!("{}", raw_response);
            anyhow::bail!("Extraction failed");
        }
    }
    Ok(())
}

async fn run_explain(cfg: &Config, file: &PathBuf) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let provider = create_provider(&cfg.provider)?;
    let mut cache = JsonFileCache::open(&cfg.cache.path);

    let explanation = explain_code(&code, provider.as_ref(), &mut cache).await?;
    println!("{}", explanation);
    Ok(())
}

fn run_score(file: &PathBuf) -> Result<()> {
    let code = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let report = score_code(&code);

    println!("Score: {} ({})", report.score, report.message);
    for (name, passed, weight) in report.checklist.entries() {
        println!("  [{}] {:<20} ({})", if passed { "x" } else { " " }, name, weight);
    }
    Ok(())
}
