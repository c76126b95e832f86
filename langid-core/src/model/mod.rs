//! Top-level module for the character-level Naive Bayes model.
//!
//! The model is built in three stages:
//! - Smoothed character counts per language (`FrequencyTable`)
//! - Log10 conditional probabilities and priors (`ProbabilityModel`)
//! - Per-message scoring (`Classifier`)
//!
//! All stages take an explicit `ModelConfig`.

/// Immutable run configuration (vocabulary, n, smoothing, priors).
pub mod config;

/// Raw and smoothed character counts per language.
///
/// Counting is chunked across worker threads and merged by summation.
pub mod frequency;

/// Conversion of counts into log10 conditional probabilities, with a
/// catch-all for unobserved characters, and log10 priors.
pub mod probability;

/// Scoring of cleaned messages into per-language score vectors.
pub mod classifier;

/// Chunked worker threads shared by counting and batch scoring.
///
/// This module is not exposed publicly.
mod workers;
