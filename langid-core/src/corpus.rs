//! Corpus ingestion.
//!
//! Raw corpora are UTF-8 files with one record per line:
//!
//! ```text
//! identifier \t user \t language \t text
//! ```
//!
//! The text is everything after the third tab. Records are cleaned with a
//! `VocabularyMode` before they reach the model.

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};

use crate::error::{LangIdError, Result};
use crate::io::read_file;
use crate::vocabulary::VocabularyMode;

/// A record as read from disk, before cleaning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawRecord {
	pub id: String,
	/// Second column of the file; never used by the model.
	pub user: String,
	/// Language label, empty when the record carries no ground truth.
	pub language: String,
	pub text: String,
}

/// Parses a single tab-delimited line.
///
/// # Errors
/// Returns `MalformedRecord` (with the 1-based `line_number`) if the line has
/// fewer than four fields or an empty identifier.
pub fn parse_record(line: &str, line_number: usize) -> Result<RawRecord> {
	let mut fields = line.splitn(4, '\t');
	let mut next = |name: &str| {
		fields.next().ok_or_else(|| LangIdError::MalformedRecord {
			line: line_number,
			reason: format!("missing {} field", name),
		})
	};

	let id = next("identifier")?.trim();
	let user = next("user")?.trim();
	let language = next("language")?.trim();
	let text = next("text")?;

	if id.is_empty() {
		return Err(LangIdError::MalformedRecord { line: line_number, reason: "empty identifier".to_owned() });
	}

	Ok(RawRecord {
		id: id.to_owned(),
		user: user.to_owned(),
		language: language.to_owned(),
		text: text.trim_end_matches('\r').to_owned(),
	})
}

/// Reads every record of a corpus file. Blank lines are skipped.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
	let lines = read_file(&path)?;
	let records = lines
		.iter()
		.enumerate()
		.filter(|(_, line)| !line.trim().is_empty())
		.map(|(index, line)| parse_record(line, index + 1))
		.collect::<Result<Vec<_>>>()?;

	info!("read {} records from {}", records.len(), path.as_ref().display());
	Ok(records)
}

/// Cleaned training strings grouped by language label.
///
/// Languages are kept in ascending label order; strings keep file order.
/// A record whose cleaned text is empty still counts as a training example
/// for its language (it contributes to the prior but not to character mass).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingCorpus {
	languages: BTreeMap<String, Vec<String>>,
}

impl TrainingCorpus {
	/// Creates an empty corpus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Cleans and groups raw records.
	///
	/// Records without a language label cannot be learned from and are skipped.
	pub fn from_records(records: &[RawRecord], vocabulary: VocabularyMode) -> Self {
		let mut corpus = Self::new();
		let mut unlabeled = 0;
		for record in records {
			if record.language.is_empty() {
				unlabeled += 1;
				continue;
			}
			corpus.add(&record.language, vocabulary.clean(&record.text));
		}
		if unlabeled > 0 {
			warn!("skipped {} training records without a language label", unlabeled);
		}
		corpus
	}

	/// Adds an already-cleaned string to `language`.
	pub fn add(&mut self, language: &str, text: String) {
		self.languages.entry(language.to_owned()).or_default().push(text);
	}

	/// Iterates over `(language, strings)` in ascending label order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.languages.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
	}

	/// Returns the strings of a language, if it is known.
	pub fn strings(&self, language: &str) -> Option<&[String]> {
		self.languages.get(language).map(Vec::as_slice)
	}

	/// Language labels in ascending order.
	pub fn languages(&self) -> Vec<String> {
		self.languages.keys().cloned().collect()
	}

	/// Number of training examples for `language` (0 if unknown).
	pub fn example_count(&self, language: &str) -> usize {
		self.languages.get(language).map_or(0, Vec::len)
	}

	/// Number of training examples across all languages.
	pub fn total_examples(&self) -> usize {
		self.languages.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.languages.is_empty()
	}
}

impl<L: Into<String>, T: Into<String>> FromIterator<(L, T)> for TrainingCorpus {
	/// Builds a corpus from already-cleaned `(language, text)` pairs.
	fn from_iter<I: IntoIterator<Item = (L, T)>>(iter: I) -> Self {
		let mut corpus = Self::new();
		for (language, text) in iter {
			corpus.languages.entry(language.into()).or_default().push(text.into());
		}
		corpus
	}
}

/// A test message ready for scoring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestRecord {
	pub id: String,
	/// Ground-truth language, `None` when the file leaves it empty.
	pub label: Option<String>,
	/// Cleaned text.
	pub text: String,
}

impl TestRecord {
	/// Cleans a raw record into a test record.
	pub fn from_raw(record: &RawRecord, vocabulary: VocabularyMode) -> Self {
		Self {
			id: record.id.clone(),
			label: (!record.language.is_empty()).then(|| record.language.clone()),
			text: vocabulary.clean(&record.text),
		}
	}
}

/// Cleans every raw record into a test record, keeping file order.
pub fn test_records(records: &[RawRecord], vocabulary: VocabularyMode) -> Vec<TestRecord> {
	records.iter().map(|record| TestRecord::from_raw(record, vocabulary)).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn raw(id: &str, language: &str, text: &str) -> RawRecord {
		RawRecord { id: id.to_owned(), user: "user".to_owned(), language: language.to_owned(), text: text.to_owned() }
	}

	#[test]
	fn parses_four_fields() {
		let record = parse_record("42\tjdoe\ten\tHello\tthere\r", 1).unwrap();
		assert_eq!(record.id, "42");
		assert_eq!(record.user, "jdoe");
		assert_eq!(record.language, "en");
		assert_eq!(record.text, "Hello\tthere");
	}

	#[test]
	fn rejects_short_lines_with_line_number() {
		match parse_record("42\tjdoe\ten", 7) {
			Err(LangIdError::MalformedRecord { line, reason }) => {
				assert_eq!(line, 7);
				assert!(reason.contains("text"));
			}
			other => panic!("unexpected result: {:?}", other),
		}
		assert!(matches!(parse_record("\tu\ten\tx", 2), Err(LangIdError::MalformedRecord { line: 2, .. })));
	}

	#[test]
	fn reads_file_skipping_blank_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("train.txt");
		std::fs::write(&path, "1\ta\ten\tHello\n\n2\tb\tfr\tBonjour\n").unwrap();
		let records = read_records(&path).unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[1].language, "fr");
	}

	#[test]
	fn reports_line_of_bad_record() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("train.txt");
		std::fs::write(&path, "1\ta\ten\tHello\n\nbroken line\n").unwrap();
		assert!(matches!(read_records(&path), Err(LangIdError::MalformedRecord { line: 3, .. })));
	}

	#[test]
	fn groups_and_cleans_training_records() {
		let records = vec![raw("1", "en", "Hi!"), raw("2", "fr", "Oui"), raw("3", "en", "42"), raw("4", "", "x")];
		let corpus = TrainingCorpus::from_records(&records, VocabularyMode::Lowercase);
		assert_eq!(corpus.languages(), vec!["en", "fr"]);
		assert_eq!(corpus.strings("en").unwrap(), &["hi".to_owned(), String::new()]);
		assert_eq!(corpus.example_count("en"), 2);
		assert_eq!(corpus.total_examples(), 3);
	}

	#[test]
	fn test_records_keep_missing_labels() {
		let records = vec![raw("1", "", "Hola"), raw("2", "es", "Adiós")];
		let tests = test_records(&records, VocabularyMode::Letters);
		assert_eq!(tests[0].label, None);
		assert_eq!(tests[0].text, "Hola");
		assert_eq!(tests[1].label.as_deref(), Some("es"));
		assert_eq!(tests[1].text, "Adis");
	}
}
