use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use crate::corpus::TrainingCorpus;
use crate::error::{LangIdError, Result};
use crate::model::config::ModelConfig;
use crate::model::frequency::FrequencyTable;

/// Display key of the catch-all entry.
pub const NOT_APPEAR: &str = "<NOT-APPEAR>";

/// Log10 conditional probabilities of the characters of one language.
///
/// Observed characters map to `log10(count / total)`. When the language did
/// not observe the whole alphabet, `not_appear` holds `log10(s / total)`, the
/// probability of any single unobserved alphabet symbol.
///
/// # Invariants
/// - `not_appear.is_some()` iff `probabilities.len() < V`
/// - `Σ 10^p + (V - distinct) * 10^not_appear == 1`
#[derive(Clone, Debug, PartialEq)]
pub struct CharDistribution {
	probabilities: HashMap<char, f64>,
	not_appear: Option<f64>,
}

impl CharDistribution {
	/// Log-probability stored for `c` itself, without fallback.
	pub fn get(&self, c: char) -> Option<f64> {
		self.probabilities.get(&c).copied()
	}

	/// Log-probability of `c`, falling back to the catch-all.
	///
	/// Returns `None` only when `c` is unobserved and the language has no
	/// catch-all (its training data covered the full alphabet).
	pub fn lookup(&self, c: char) -> Option<f64> {
		self.get(c).or(self.not_appear)
	}

	/// Catch-all log-probability, if any.
	pub fn not_appear(&self) -> Option<f64> {
		self.not_appear
	}

	/// Number of observed characters.
	pub fn distinct(&self) -> usize {
		self.probabilities.len()
	}

	/// Iterates over `(character, log-probability)` pairs, in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (char, f64)> + '_ {
		self.probabilities.iter().map(|(c, p)| (*c, *p))
	}
}

/// The trained model: conditional probabilities and optional priors.
///
/// # Responsibilities
/// - Convert smoothed frequencies into log10 conditional probabilities
/// - Add a catch-all entry for languages that did not cover the alphabet
/// - Estimate log10 priors from training-set proportions
///
/// A model is built once and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct ProbabilityModel {
	config: ModelConfig,
	conditionals: BTreeMap<String, CharDistribution>,
	priors: Option<BTreeMap<String, f64>>,
}

impl ProbabilityModel {
	/// Trains a model from a cleaned corpus.
	///
	/// Counts characters, converts them to probabilities and, if the
	/// configuration enables them, estimates priors.
	///
	/// # Errors
	/// `EmptyModelDenominator` if a language has zero total mass, or if priors
	/// are requested on an empty corpus.
	pub fn train(corpus: &TrainingCorpus, config: &ModelConfig) -> Result<Self> {
		let frequencies = FrequencyTable::count(corpus, config);
		let conditionals = Self::conditionals(&frequencies)?;
		let priors = if config.priors() { Some(Self::priors(corpus)?) } else { None };

		info!(
			"trained model on {} languages (V = {}, s = {}, priors = {})",
			conditionals.len(),
			config.alphabet_size(),
			config.smoothing(),
			config.priors()
		);
		Ok(Self { config: *config, conditionals, priors })
	}

	/// Converts a frequency table into per-language conditional probabilities.
	///
	/// # Behavior
	/// - Each observed character gets `log10((raw + s) / total)`.
	/// - If fewer than `V` characters were observed, the catch-all gets
	///   `log10(s / total)`. With `s = 0` that is negative infinity.
	///
	/// # Errors
	/// `EmptyModelDenominator` if any language has a zero total.
	pub fn conditionals(frequencies: &FrequencyTable) -> Result<BTreeMap<String, CharDistribution>> {
		let smoothing = frequencies.smoothing();
		let alphabet_size = frequencies.alphabet_size();

		let mut conditionals = BTreeMap::new();
		for (language, counts) in frequencies.iter() {
			let total = counts.smoothed_total(smoothing, alphabet_size);
			if total <= 0.0 {
				return Err(LangIdError::EmptyModelDenominator(format!(
					"language '{}' has no character mass",
					language
				)));
			}

			let probabilities: HashMap<char, f64> = counts
				.iter()
				.map(|(c, raw)| (c, ((raw as f64 + smoothing) / total).log10()))
				.collect();
			let not_appear = (probabilities.len() < alphabet_size).then(|| (smoothing / total).log10());

			debug!(
				"'{}': total = {}, {} observed, {} = {:?}",
				language,
				total,
				probabilities.len(),
				NOT_APPEAR,
				not_appear
			);
			conditionals.insert(language.to_owned(), CharDistribution { probabilities, not_appear });
		}
		Ok(conditionals)
	}

	/// Estimates `log10(examples(lang) / examples(all))` for every language.
	///
	/// # Errors
	/// `EmptyModelDenominator` if the corpus has no training example.
	pub fn priors(corpus: &TrainingCorpus) -> Result<BTreeMap<String, f64>> {
		let total = corpus.total_examples();
		if total == 0 {
			return Err(LangIdError::EmptyModelDenominator("training set is empty".to_owned()));
		}

		Ok(corpus
			.iter()
			.map(|(language, texts)| (language.to_owned(), (texts.len() as f64 / total as f64).log10()))
			.collect())
	}

	pub fn config(&self) -> &ModelConfig {
		&self.config
	}

	/// Conditional probabilities of a language.
	pub fn distribution(&self, language: &str) -> Option<&CharDistribution> {
		self.conditionals.get(language)
	}

	/// Log-prior of a language, `None` when priors are disabled.
	pub fn prior(&self, language: &str) -> Option<f64> {
		self.priors.as_ref()?.get(language).copied()
	}

	/// Iterates over `(language, distribution)` in ascending label order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &CharDistribution)> {
		self.conditionals.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Language labels in ascending order.
	pub fn languages(&self) -> Vec<String> {
		self.conditionals.keys().cloned().collect()
	}
}
