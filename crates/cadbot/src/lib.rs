//! # cadbot
//!
//! **Retrieval-augmented code generation for CAD automation scripts.**
//!
//! cadbot matches a free-text request against an ordered corpus of example
//! NXOpen journals, few-shot-prompts a text-generation provider with the
//! best match, recovers the code from the response, and scores it against
//! a structural rubric.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────┐   ┌───────────┐
//! │  Corpus   │──▶│ CorpusIndex   │──▶│  Matcher   │
//! │ (scripts) │   │ (TF-IDF)      │   │ 4 strategies│
//! └──────────┘   └───────────────┘   └─────┬─────┘
//!                                          │
//!            ┌─────────────┐   ┌──────────▼─────────┐
//!            │  Provider    │◀──│  PromptComposer    │
//!            │ (Groq/Ollama)│   │ example + patterns │
//!            └──────┬──────┘   └────────────────────┘
//!                   ▼
//!            ┌─────────────┐   ┌────────────────────┐
//!            │  Extractor   │──▶│  QualityScorer     │
//!            │ 4 fallbacks  │   │ 6-check rubric     │
//!            └─────────────┘   └────────────────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **corpus loader** ([`corpus`]) scans the configured directory
//!    into ordered `Document`s.
//! 2. A **[`CorpusIndex`](cadbot_core::index::CorpusIndex)** is built once
//!    per load and treated as read-only; a corpus change means an atomic
//!    swap of a freshly built index.
//! 3. The **pipeline** ([`pipeline`]) runs one request end to end and
//!    returns a request-scoped `PipelineReport`.
//! 4. The **provider** ([`provider`]) and **explanation cache** ([`cache`])
//!    are explicit dependencies constructed at startup and threaded through
//!    parameters, never ambient globals.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing and validation |
//! | [`corpus`] | Filesystem corpus loader (walkdir + globs) |
//! | [`provider`] | Generation provider trait, Groq/Ollama implementations |
//! | [`cache`] | Fingerprint-keyed explanation cache |
//! | [`pipeline`] | Request orchestration and outcome reporting |

pub mod cache;
pub mod config;
pub mod corpus;
pub mod pipeline;
pub mod provider;
