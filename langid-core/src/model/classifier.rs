use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};

use crate::corpus::{TestRecord, TrainingCorpus};
use crate::error::{LangIdError, Result};
use crate::model::config::ModelConfig;
use crate::model::probability::ProbabilityModel;
use crate::model::workers::map_chunks;

/// Cumulative log10 probability of one message under every language.
///
/// Iterates in ascending language order, so two vectors computed from the
/// same model and text are identical, iteration included.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct ScoreVector {
	scores: BTreeMap<String, f64>,
}

impl ScoreVector {
	/// Score of a language.
	pub fn get(&self, language: &str) -> Option<f64> {
		self.scores.get(language).copied()
	}

	/// Iterates over `(language, score)` in ascending label order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
		self.scores.iter().map(|(k, v)| (k.as_str(), *v))
	}

	pub fn len(&self) -> usize {
		self.scores.len()
	}

	pub fn is_empty(&self) -> bool {
		self.scores.is_empty()
	}
}

/// Scores cleaned messages against a trained model.
///
/// The classifier owns an immutable model and never mutates it, so it can be
/// shared between threads (and requests) without locking. It produces full
/// score vectors; choosing a language is left to `report::select_language`.
#[derive(Clone, Debug)]
pub struct Classifier {
	model: ProbabilityModel,
}

impl Classifier {
	/// Wraps an already trained model.
	pub fn new(model: ProbabilityModel) -> Self {
		Self { model }
	}

	/// Trains a model from `corpus` and wraps it.
	pub fn train(corpus: &TrainingCorpus, config: &ModelConfig) -> Result<Self> {
		Ok(Self::new(ProbabilityModel::train(corpus, config)?))
	}

	pub fn model(&self) -> &ProbabilityModel {
		&self.model
	}

	pub fn config(&self) -> &ModelConfig {
		self.model.config()
	}

	/// Scores a cleaned message against every language.
	///
	/// # Behavior
	/// - Each score starts at the language's log-prior (0 when priors are off).
	/// - Every character adds its log-probability, or the catch-all when the
	///   language never observed it.
	/// - An empty message yields the priors (or zeros).
	///
	/// # Errors
	/// `OutOfVocabularyCharacter` if a character is unobserved for a language
	/// that has no catch-all. Cleaned text never triggers it.
	pub fn score(&self, text: &str) -> Result<ScoreVector> {
		let mut scores = BTreeMap::new();
		for (language, distribution) in self.model.iter() {
			let mut score = self.model.prior(language).unwrap_or(0.0);
			for c in text.chars() {
				score += distribution.lookup(c).ok_or_else(|| LangIdError::OutOfVocabularyCharacter {
					language: language.to_owned(),
					character: c,
				})?;
			}
			scores.insert(language.to_owned(), score);
		}
		Ok(ScoreVector { scores })
	}

	/// Scores every record on worker threads.
	///
	/// Scores are returned in input order. Records are independent, so the
	/// result is the same as scoring them one by one.
	///
	/// # Errors
	/// The first failure, in input order, aborts the whole batch.
	pub fn score_batch(&self, records: &[TestRecord]) -> Result<Vec<ScoreVector>> {
		let partials = map_chunks(records, |chunk| {
			chunk.iter().map(|record| self.score(&record.text)).collect::<Result<Vec<_>>>()
		});

		let mut scores = Vec::with_capacity(records.len());
		for partial in partials {
			scores.extend(partial?);
		}
		info!("scored {} records", scores.len());
		Ok(scores)
	}
}
