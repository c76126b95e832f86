use thiserror::Error;

/// Errors raised while building or querying a language model.
///
/// Every variant is fatal for the operation that produced it: no partial
/// model and no partial score vector is ever returned.
#[derive(Debug, Error)]
pub enum LangIdError {
	/// A configuration value is outside its accepted range.
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),

	/// A probability denominator is zero (no character mass for a language,
	/// or no training examples at all when priors are requested).
	#[error("empty model denominator: {0}")]
	EmptyModelDenominator(String),

	/// A test character has no probability for a language whose training data
	/// covered the whole alphabet.
	#[error("character {character:?} is not covered by the model of '{language}'")]
	OutOfVocabularyCharacter { language: String, character: char },

	/// A corpus line could not be split into its fields.
	#[error("malformed record at line {line}: {reason}")]
	MalformedRecord { line: usize, reason: String },

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LangIdError>;
