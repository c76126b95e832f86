use std::collections::{BTreeMap, HashMap};

use log::debug;

use crate::corpus::TrainingCorpus;
use crate::model::config::ModelConfig;
use crate::model::workers::map_chunks;

/// Raw character occurrences of a single language.
///
/// Counts are kept unsmoothed as integers; smoothing is applied by formula
/// when they are read (`raw + s`). Summing integers makes the counts
/// independent of the order in which strings are fed, and lets partial
/// counts built on different threads be merged exactly.
///
/// ## Invariants
/// - Every stored count is >= 1 (unobserved characters are absent)
/// - `total` is the sum of all stored counts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CharCounts {
	/// Occurrences per observed character.
	/// Example: { 'l' => 2, 'h' => 1 }
	counts: HashMap<char, usize>,
	/// Total number of characters seen.
	total: usize,
}

impl CharCounts {
	/// Creates an empty set of counts.
	pub fn new() -> Self {
		Self::default()
	}

	/// Counts every character of an already-cleaned string.
	pub fn add_text(&mut self, text: &str) {
		for c in text.chars() {
			*self.counts.entry(c).or_insert(0) += 1;
			self.total += 1;
		}
	}

	/// Counts a sequence of strings.
	pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
		let mut counts = Self::new();
		for text in texts {
			counts.add_text(text.as_ref());
		}
		counts
	}

	/// Merges another set of counts into this one by summing occurrences.
	pub fn merge(&mut self, other: &Self) {
		for (c, occurrence) in &other.counts {
			*self.counts.entry(*c).or_insert(0) += *occurrence;
		}
		self.total += other.total;
	}

	/// Raw occurrences of `c` (0 if never seen).
	pub fn raw(&self, c: char) -> usize {
		self.counts.get(&c).copied().unwrap_or(0)
	}

	/// Total number of characters seen.
	pub fn raw_total(&self) -> usize {
		self.total
	}

	/// Number of distinct observed characters.
	pub fn distinct(&self) -> usize {
		self.counts.len()
	}

	/// Smoothed count `raw + s` of an observed character, `None` if unobserved.
	pub fn smoothed(&self, c: char, smoothing: f64) -> Option<f64> {
		self.counts.get(&c).map(|raw| *raw as f64 + smoothing)
	}

	/// Total smoothed mass `raw_total + s * V`.
	///
	/// The `s * V` term already covers the pseudo-mass of every unobserved
	/// character of the alphabet.
	pub fn smoothed_total(&self, smoothing: f64, alphabet_size: usize) -> f64 {
		self.total as f64 + smoothing * alphabet_size as f64
	}

	/// Iterates over `(character, raw count)` pairs, in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = (char, usize)> + '_ {
		self.counts.iter().map(|(c, raw)| (*c, *raw))
	}
}

/// Smoothed frequency and total-mass tables for every language.
///
/// # Responsibilities
/// - Count characters of each language (in parallel for large corpora)
/// - Expose smoothed counts (`raw + s`) and smoothed totals (`raw + s * V`)
#[derive(Clone, Debug)]
pub struct FrequencyTable {
	smoothing: f64,
	alphabet_size: usize,
	languages: BTreeMap<String, CharCounts>,
}

impl FrequencyTable {
	/// Counts the characters of every language of the corpus.
	///
	/// # Behavior
	/// - Each language's strings are split into chunks counted on worker threads.
	/// - Partial counts are merged by summation.
	/// - A language with no strings (or only empty ones) gets empty counts.
	pub fn count(corpus: &TrainingCorpus, config: &ModelConfig) -> Self {
		let mut languages = BTreeMap::new();
		for (language, texts) in corpus.iter() {
			let mut counts = CharCounts::new();
			for partial in map_chunks(texts, CharCounts::from_texts) {
				counts.merge(&partial);
			}
			debug!(
				"'{}': {} strings, {} characters, {} distinct",
				language,
				texts.len(),
				counts.raw_total(),
				counts.distinct()
			);
			languages.insert(language.to_owned(), counts);
		}

		Self { smoothing: config.smoothing(), alphabet_size: config.alphabet_size(), languages }
	}

	pub fn smoothing(&self) -> f64 {
		self.smoothing
	}

	pub fn alphabet_size(&self) -> usize {
		self.alphabet_size
	}

	/// Raw counts of a language.
	pub fn counts(&self, language: &str) -> Option<&CharCounts> {
		self.languages.get(language)
	}

	/// Smoothed count of `c` for `language`, `None` if the language is unknown
	/// or the character was never observed for it.
	pub fn frequency(&self, language: &str, c: char) -> Option<f64> {
		self.languages.get(language)?.smoothed(c, self.smoothing)
	}

	/// Total smoothed mass of `language`.
	pub fn total(&self, language: &str) -> Option<f64> {
		self.languages
			.get(language)
			.map(|counts| counts.smoothed_total(self.smoothing, self.alphabet_size))
	}

	/// Iterates over `(language, counts)` in ascending label order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &CharCounts)> {
		self.languages.iter().map(|(k, v)| (k.as_str(), v))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::vocabulary::VocabularyMode;
	use rand::seq::SliceRandom;

	fn config(s: f64) -> ModelConfig {
		ModelConfig::new(VocabularyMode::Lowercase, 1, s).unwrap()
	}

	#[test]
	fn counts_hello_and_bonjour() {
		let corpus: TrainingCorpus = [("en", "hello"), ("fr", "bonjour")].into_iter().collect();
		let table = FrequencyTable::count(&corpus, &config(1.0));

		assert_eq!(table.total("en"), Some(31.0));
		assert_eq!(table.total("fr"), Some(33.0));
		assert_eq!(table.frequency("en", 'l'), Some(3.0));
		assert_eq!(table.frequency("en", 'h'), Some(2.0));
		assert_eq!(table.frequency("fr", 'o'), Some(3.0));
		assert_eq!(table.frequency("en", 'z'), None);
		assert_eq!(table.counts("en").unwrap().distinct(), 4);
	}

	#[test]
	fn smoothing_is_added_once_per_character() {
		let corpus: TrainingCorpus = [("en", "aaa"), ("en", "ab"), ("en", "")].into_iter().collect();
		let table = FrequencyTable::count(&corpus, &config(0.5));
		assert_eq!(table.frequency("en", 'a'), Some(4.5));
		assert_eq!(table.frequency("en", 'b'), Some(1.5));
		assert_eq!(table.total("en"), Some(5.0 + 0.5 * 26.0));
	}

	#[test]
	fn empty_language_has_only_pseudo_mass() {
		let mut corpus = TrainingCorpus::new();
		corpus.add("xx", String::new());
		let table = FrequencyTable::count(&corpus, &config(2.0));
		assert_eq!(table.counts("xx").unwrap().distinct(), 0);
		assert_eq!(table.total("xx"), Some(52.0));
	}

	#[test]
	fn merge_sums_counts() {
		let mut left = CharCounts::from_texts(&["abc"]);
		let right = CharCounts::from_texts(&["cc", "d"]);
		left.merge(&right);
		assert_eq!(left.raw('c'), 3);
		assert_eq!(left.raw('d'), 1);
		assert_eq!(left.raw_total(), 6);
		assert_eq!(left.distinct(), 4);
	}

	#[test]
	fn order_of_strings_does_not_matter() {
		let mut texts: Vec<String> = (0..500)
			.map(|i| "thequickbrownfoxjumpsoverthelazydog".chars().cycle().skip(i % 35).take(i % 17 + 1).collect())
			.collect();
		let reference = CharCounts::from_texts(&texts);

		let mut rng = rand::rng();
		for _ in 0..5 {
			texts.shuffle(&mut rng);
			let corpus: TrainingCorpus = texts.iter().map(|t| ("en", t.clone())).collect();
			let table = FrequencyTable::count(&corpus, &config(0.1));
			let counts = table.counts("en").unwrap();
			assert_eq!(counts, &reference);
			assert_eq!(table.total("en"), Some(reference.raw_total() as f64 + 0.1 * 26.0));
		}
	}
}
