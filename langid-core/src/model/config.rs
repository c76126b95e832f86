use serde::Serialize;

use crate::error::{LangIdError, Result};
use crate::vocabulary::VocabularyMode;

/// Immutable run configuration.
///
/// Built once, validated on construction, then handed to the model builder.
/// Nothing in the pipeline reads configuration from anywhere else.
///
/// # Invariants
/// - `smoothing` is finite and >= 0
/// - `ngram` is >= 1
#[derive(Serialize, Clone, Copy, Debug, PartialEq)]
pub struct ModelConfig {
	/// Character admission policy, also the source of the alphabet size `V`.
	vocabulary: VocabularyMode,

	/// Size of the n-gram. Only characters (1) are modeled; the value is kept
	/// for naming output files.
	ngram: usize,

	/// Additive smoothing pseudo-count per alphabet symbol.
	smoothing: f64,

	/// Whether class priors are added to every score.
	priors: bool,
}

impl ModelConfig {
	/// Creates a validated configuration with priors disabled.
	///
	/// # Errors
	/// Returns `InvalidConfiguration` if `smoothing` is negative or not finite,
	/// or if `ngram` is 0.
	pub fn new(vocabulary: VocabularyMode, ngram: usize, smoothing: f64) -> Result<Self> {
		if !smoothing.is_finite() || smoothing < 0.0 {
			return Err(LangIdError::InvalidConfiguration(format!(
				"smoothing must be a finite value >= 0, got {}",
				smoothing
			)));
		}
		if ngram == 0 {
			return Err(LangIdError::InvalidConfiguration("n must be >= 1".to_owned()));
		}
		Ok(Self { vocabulary, ngram, smoothing, priors: false })
	}

	/// Enables or disables class priors.
	pub fn with_priors(mut self, priors: bool) -> Self {
		self.priors = priors;
		self
	}

	pub fn vocabulary(&self) -> VocabularyMode {
		self.vocabulary
	}

	pub fn ngram(&self) -> usize {
		self.ngram
	}

	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	pub fn priors(&self) -> bool {
		self.priors
	}

	/// Alphabet size `V` of the configured vocabulary.
	pub fn alphabet_size(&self) -> usize {
		self.vocabulary.alphabet_size()
	}

	/// Run identifier `{V}_{n}_{s}` used to name output files.
	///
	/// Example: vocabulary 0, n = 1, s = 0.5 → `"0_1_0.5"`
	pub fn run_name(&self) -> String {
		format!("{}_{}_{}", self.vocabulary, self.ngram, self.smoothing)
	}
}
