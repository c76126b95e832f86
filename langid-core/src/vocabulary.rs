use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::LangIdError;

/// Number of code points admitted by the `Alphabetic` vocabulary.
///
/// Counted once from `char::is_alphabetic` over every code point, so `V`
/// always matches the Unicode tables the admission predicate uses.
fn alphabetic_size() -> usize {
	static SIZE: OnceLock<usize> = OnceLock::new();
	*SIZE.get_or_init(|| (0..=char::MAX as u32).filter_map(char::from_u32).filter(|c| c.is_alphabetic()).count())
}

/// Character admission policy.
///
/// A vocabulary mode decides which characters survive cleaning, and thus
/// which symbols the model may ever see, and reports the size `V` of the
/// admitted alphabet (used for smoothing mass and catch-all eligibility).
///
/// # Variants
/// - `Lowercase` (0): text is folded to lowercase, only `a`-`z` survive.
/// - `Letters` (1): case-sensitive, only `a`-`z` and `A`-`Z` survive.
/// - `Alphabetic` (2): any alphabetic code point survives, case preserved.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VocabularyMode {
	Lowercase,
	Letters,
	Alphabetic,
}

impl VocabularyMode {
	/// Returns the size `V` of the admitted alphabet, i.e. the number of
	/// characters for which `admits` is `true`.
	pub fn alphabet_size(self) -> usize {
		match self {
			VocabularyMode::Lowercase => 26,
			VocabularyMode::Letters => 52,
			VocabularyMode::Alphabetic => alphabetic_size(),
		}
	}

	/// Numeric code of the mode, as used on the command line and in file names.
	pub fn code(self) -> u8 {
		match self {
			VocabularyMode::Lowercase => 0,
			VocabularyMode::Letters => 1,
			VocabularyMode::Alphabetic => 2,
		}
	}

	/// Returns `true` if `c` belongs to the alphabet of this mode.
	///
	/// Cleaning only ever keeps admitted characters, so a cleaned string
	/// contains nothing else.
	pub fn admits(self, c: char) -> bool {
		match self {
			VocabularyMode::Lowercase => c.is_ascii_lowercase(),
			VocabularyMode::Letters => c.is_ascii_alphabetic(),
			VocabularyMode::Alphabetic => c.is_alphabetic(),
		}
	}

	/// Cleans a raw message, keeping only admitted characters.
	///
	/// # Notes
	/// - `Lowercase` folds case before filtering, so `"Hé Lo"` becomes `"hlo"`.
	/// - Cleaning is idempotent.
	pub fn clean(self, raw: &str) -> String {
		match self {
			VocabularyMode::Lowercase => raw
				.chars()
				.flat_map(|c| c.to_lowercase())
				.filter(|c| c.is_ascii_lowercase())
				.collect(),
			_ => raw.chars().filter(|c| self.admits(*c)).collect(),
		}
	}
}

impl TryFrom<u8> for VocabularyMode {
	type Error = LangIdError;

	fn try_from(code: u8) -> Result<Self, Self::Error> {
		match code {
			0 => Ok(VocabularyMode::Lowercase),
			1 => Ok(VocabularyMode::Letters),
			2 => Ok(VocabularyMode::Alphabetic),
			other => Err(LangIdError::InvalidConfiguration(format!(
				"vocabulary mode must be 0, 1 or 2, got {}",
				other
			))),
		}
	}
}

impl FromStr for VocabularyMode {
	type Err = LangIdError;

	/// Accepts the numeric code (`"0"`) or the mode name (`"lowercase"`).
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"lowercase" => Ok(VocabularyMode::Lowercase),
			"letters" => Ok(VocabularyMode::Letters),
			"alphabetic" => Ok(VocabularyMode::Alphabetic),
			other => match other.parse::<u8>() {
				Ok(code) => VocabularyMode::try_from(code),
				Err(_) => Err(LangIdError::InvalidConfiguration(format!(
					"unknown vocabulary mode '{}'",
					s
				))),
			},
		}
	}
}

impl fmt::Display for VocabularyMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.code())
	}
}
