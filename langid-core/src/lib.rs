//! Character-level Naive Bayes language identification library.
//!
//! This crate provides a complete language identification pipeline including:
//! - Vocabulary policies (which characters are admitted, alphabet size)
//! - Corpus reading and per-language grouping of training records
//! - Smoothed character frequency counting and log-probability models
//! - Per-message scoring against every known language
//! - Decision, trace emission and evaluation of predictions
//!
//! The model is built once from a training corpus and is immutable afterwards,
//! so a single `Classifier` can be shared freely between threads.

/// Error type shared by every stage of the pipeline.
pub mod error;

/// Vocabulary modes, admission predicates and text cleaning.
pub mod vocabulary;

/// Tab-delimited record parsing and corpus grouping.
pub mod corpus;

/// Frequency counting, probability tables and the classifier.
///
/// This module exposes the high-level model interface while keeping
/// the worker pool private.
pub mod model;

/// Decision policy, trace rows and evaluation metrics.
pub mod report;

/// I/O utilities (file loading, output paths).
///
/// Not exposed
pub(crate) mod io;

pub use error::{LangIdError, Result};
pub use model::classifier::{Classifier, ScoreVector};
pub use model::config::ModelConfig;
pub use vocabulary::VocabularyMode;
