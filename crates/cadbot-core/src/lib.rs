//! # cadbot Core
//!
//! Shared, I/O-free logic for cadbot: data models, the example corpus
//! index, request analysis, example matching, pattern extraction, prompt
//! composition, response extraction, quality scoring, and parameter
//! substitution.
//!
//! This crate contains no tokio, HTTP, filesystem, or other native-only
//! dependencies. Every function is deterministic for fixed inputs; the
//! calling application is responsible for loading the corpus, calling the
//! generation provider, and persisting the explanation cache.

pub mod analyze;
pub mod extract;
pub mod index;
pub mod matcher;
pub mod models;
pub mod params;
pub mod patterns;
pub mod prompt;
pub mod quality;
