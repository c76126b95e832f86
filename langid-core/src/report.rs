//! Decision, trace rows and evaluation.
//!
//! Turns score vectors into predictions, writes one trace row per test
//! record and summarizes the predictions against their ground truth:
//!
//! ```text
//! trace_{V}_{n}_{s}.txt   id  predicted  score  actual  verdict
//! eval_{V}_{n}_{s}.txt    accuracy / precision / recall / F1 / macro & weighted F1
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::Serialize;

use crate::corpus::TestRecord;
use crate::error::Result;
use crate::io::{normalize_folder, write_files_atomically};
use crate::model::classifier::ScoreVector;
use crate::model::config::ModelConfig;

/// Picks the winning language of a score vector.
///
/// The highest score wins. Ties (including every score being negative
/// infinity) go to the smallest language label. Returns `None` for an empty
/// vector.
pub fn select_language(scores: &ScoreVector) -> Option<(&str, f64)> {
	scores.iter().fold(None, |best, (language, score)| match best {
		// Strictly greater: on ties the earlier (smaller) label is kept
		Some((_, best_score)) if score <= best_score => best,
		_ => Some((language, score)),
	})
}

/// Outcome of one test record.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Prediction {
	pub id: String,
	pub predicted: String,
	pub score: f64,
	pub actual: Option<String>,
}

impl Prediction {
	/// Builds the prediction of `record` from its score vector.
	///
	/// Returns `None` when the model knows no language.
	pub fn new(record: &TestRecord, scores: &ScoreVector) -> Option<Self> {
		let (language, score) = select_language(scores)?;
		Some(Self {
			id: record.id.clone(),
			predicted: language.to_owned(),
			score,
			actual: record.label.clone(),
		})
	}

	/// `Some(true)` if the prediction matches the ground truth, `None` when the
	/// record is unlabeled.
	pub fn is_correct(&self) -> Option<bool> {
		self.actual.as_ref().map(|actual| *actual == self.predicted)
	}

	/// Trace row: `id  predicted  score  actual  verdict`.
	///
	/// The score is printed in scientific notation (`-1.23E1`). Unlabeled
	/// records print `-` and `n/a`.
	pub fn trace_line(&self) -> String {
		let verdict = match self.is_correct() {
			Some(true) => "correct",
			Some(false) => "wrong",
			None => "n/a",
		};
		format!(
			"{}  {}  {:.2E}  {}  {}",
			self.id,
			self.predicted,
			self.score,
			self.actual.as_deref().unwrap_or("-"),
			verdict
		)
	}
}

/// Predictions for a batch, in record order.
pub fn predictions(records: &[TestRecord], scores: &[ScoreVector]) -> Vec<Prediction> {
	records
		.iter()
		.zip(scores)
		.filter_map(|(record, scores)| Prediction::new(record, scores))
		.collect()
}

/// Precision, recall and F1 of one class.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ClassMetrics {
	pub language: String,
	pub precision: f64,
	pub recall: f64,
	pub f1: f64,
	/// Number of labeled records whose ground truth is this class.
	pub support: usize,
}

/// Summary of a batch of predictions against their ground truth.
///
/// Only labeled predictions are taken into account. Every ratio with a zero
/// denominator is reported as 0.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Evaluation {
	pub labeled: usize,
	pub correct: usize,
	pub accuracy: f64,
	/// One entry per class, in ascending label order.
	pub classes: Vec<ClassMetrics>,
	pub macro_f1: f64,
	pub weighted_f1: f64,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
	if denominator == 0 { 0.0 } else { numerator as f64 / denominator as f64 }
}

impl Evaluation {
	/// Evaluates predictions over `languages` plus every label that appears
	/// in the predictions.
	pub fn new(predictions: &[Prediction], languages: &[String]) -> Self {
		let labeled: Vec<(&str, &str)> = predictions
			.iter()
			.filter_map(|p| p.actual.as_deref().map(|actual| (p.predicted.as_str(), actual)))
			.collect();
		if labeled.len() < predictions.len() {
			warn!("{} predictions have no ground truth", predictions.len() - labeled.len());
		}

		let mut classes: BTreeSet<&str> = languages.iter().map(String::as_str).collect();
		for &(predicted, actual) in &labeled {
			classes.insert(predicted);
			if classes.insert(actual) {
				warn!("ground truth '{}' is not a trained language", actual);
			}
		}

		let correct = labeled.iter().filter(|(predicted, actual)| predicted == actual).count();

		let classes: Vec<ClassMetrics> = classes
			.into_iter()
			.map(|class| {
				let true_positive = labeled.iter().filter(|(p, a)| *p == class && *a == class).count();
				let predicted = labeled.iter().filter(|(p, _)| *p == class).count();
				let support = labeled.iter().filter(|(_, a)| *a == class).count();

				let precision = ratio(true_positive, predicted);
				let recall = ratio(true_positive, support);
				let f1 = if precision + recall > 0.0 { 2.0 * precision * recall / (precision + recall) } else { 0.0 };
				ClassMetrics { language: class.to_owned(), precision, recall, f1, support }
			})
			.collect();

		let macro_f1 = if classes.is_empty() {
			0.0
		} else {
			classes.iter().map(|c| c.f1).sum::<f64>() / classes.len() as f64
		};
		let weighted_f1 = if labeled.is_empty() {
			0.0
		} else {
			classes.iter().map(|c| c.f1 * c.support as f64).sum::<f64>() / labeled.len() as f64
		};

		Self { labeled: labeled.len(), correct, accuracy: ratio(correct, labeled.len()), classes, macro_f1, weighted_f1 }
	}

	/// Evaluation file content, one line per metric group, values with four
	/// decimals separated by two spaces.
	pub fn lines(&self) -> Vec<String> {
		let join = |values: Vec<f64>| values.iter().map(|v| format!("{:.4}", v)).collect::<Vec<_>>().join("  ");
		vec![
			format!("{:.4}", self.accuracy),
			join(self.classes.iter().map(|c| c.precision).collect()),
			join(self.classes.iter().map(|c| c.recall).collect()),
			join(self.classes.iter().map(|c| c.f1).collect()),
			join(vec![self.macro_f1, self.weighted_f1]),
		]
	}
}

/// Path of the trace file of a run inside `folder`.
pub fn trace_path(folder: &Path, config: &ModelConfig) -> PathBuf {
	normalize_folder(folder).join(format!("trace_{}.txt", config.run_name()))
}

/// Path of the evaluation file of a run inside `folder`.
pub fn eval_path(folder: &Path, config: &ModelConfig) -> PathBuf {
	normalize_folder(folder).join(format!("eval_{}.txt", config.run_name()))
}

/// Writes the trace and evaluation files of a run.
///
/// Both files are rendered in memory and committed together: if either one
/// cannot be written, neither is left on disk.
///
/// Returns the paths written, trace first.
pub fn write_report(
	folder: &Path,
	config: &ModelConfig,
	predictions: &[Prediction],
	evaluation: &Evaluation,
) -> Result<(PathBuf, PathBuf)> {
	let trace = trace_path(folder, config);
	let eval = eval_path(folder, config);
	let trace_lines: Vec<String> = predictions.iter().map(Prediction::trace_line).collect();
	write_files_atomically(&[(trace.clone(), trace_lines), (eval.clone(), evaluation.lines())])?;

	info!("wrote {} and {}", trace.display(), eval.display());
	Ok((trace, eval))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::corpus::TrainingCorpus;
	use crate::model::classifier::Classifier;
	use crate::vocabulary::VocabularyMode;

	fn prediction(id: &str, predicted: &str, actual: Option<&str>) -> Prediction {
		Prediction { id: id.to_owned(), predicted: predicted.to_owned(), score: -1.0, actual: actual.map(str::to_owned) }
	}

	fn classifier() -> Classifier {
		let corpus: TrainingCorpus = [("en", "hello"), ("fr", "bonjour")].into_iter().collect();
		Classifier::train(&corpus, &ModelConfig::new(VocabularyMode::Lowercase, 1, 1.0).unwrap()).unwrap()
	}

	#[test]
	fn highest_score_wins() {
		let scores = classifier().score("bonjour").unwrap();
		assert_eq!(select_language(&scores).map(|(l, _)| l), Some("fr"));
		let scores = classifier().score("hello").unwrap();
		assert_eq!(select_language(&scores).map(|(l, _)| l), Some("en"));
	}

	#[test]
	fn ties_go_to_smallest_label() {
		// Empty text: every score is 0
		let scores = classifier().score("").unwrap();
		assert_eq!(select_language(&scores), Some(("en", 0.0)));
		assert_eq!(select_language(&ScoreVector::default()), None);
	}

	#[test]
	fn negative_infinity_ties_are_deterministic() {
		let corpus: TrainingCorpus = [("b", "ab"), ("a", "ab")].into_iter().collect();
		let config = ModelConfig::new(VocabularyMode::Lowercase, 1, 0.0).unwrap();
		let scores = Classifier::train(&corpus, &config).unwrap().score("z").unwrap();
		assert_eq!(select_language(&scores), Some(("a", f64::NEG_INFINITY)));
	}

	#[test]
	fn trace_lines() {
		let record = TestRecord { id: "7".to_owned(), label: Some("fr".to_owned()), text: "bonjour".to_owned() };
		let scores = classifier().score(&record.text).unwrap();
		let line = Prediction::new(&record, &scores).unwrap().trace_line();
		assert!(line.starts_with("7  fr  "));
		assert!(line.ends_with("  fr  correct"));

		assert_eq!(prediction("1", "en", Some("fr")).trace_line(), "1  en  -1.00E0  fr  wrong");
		assert_eq!(prediction("2", "en", None).trace_line(), "2  en  -1.00E0  -  n/a");
	}

	#[test]
	fn evaluates_confusion_matrix() {
		let predictions = vec![
			prediction("1", "en", Some("en")),
			prediction("2", "en", Some("en")),
			prediction("3", "en", Some("fr")),
			prediction("4", "fr", Some("fr")),
			prediction("5", "fr", None),
		];
		let evaluation = Evaluation::new(&predictions, &["en".to_owned(), "es".to_owned(), "fr".to_owned()]);

		assert_eq!(evaluation.labeled, 4);
		assert_eq!(evaluation.correct, 3);
		assert_eq!(evaluation.accuracy, 0.75);

		let en = &evaluation.classes[0];
		assert_eq!((en.language.as_str(), en.support), ("en", 2));
		assert!((en.precision - 2.0 / 3.0).abs() < 1e-12);
		assert_eq!(en.recall, 1.0);
		assert!((en.f1 - 0.8).abs() < 1e-12);

		let es = &evaluation.classes[1];
		assert_eq!((es.precision, es.recall, es.f1, es.support), (0.0, 0.0, 0.0, 0));

		let fr = &evaluation.classes[2];
		assert_eq!((fr.precision, fr.recall), (1.0, 0.5));
		assert!((fr.f1 - 2.0 / 3.0).abs() < 1e-12);

		assert!((evaluation.macro_f1 - (0.8 + 2.0 / 3.0) / 3.0).abs() < 1e-12);
		assert!((evaluation.weighted_f1 - (0.8 * 2.0 + 2.0 / 3.0 * 2.0) / 4.0).abs() < 1e-12);

		assert_eq!(
			evaluation.lines(),
			vec!["0.7500", "0.6667  0.0000  1.0000", "1.0000  0.0000  0.5000", "0.8000  0.0000  0.6667", "0.4889  0.7333"]
		);
	}

	#[test]
	fn unknown_ground_truth_becomes_a_class() {
		let evaluation = Evaluation::new(&[prediction("1", "en", Some("pt"))], &["en".to_owned()]);
		assert_eq!(evaluation.classes.len(), 2);
		assert_eq!(evaluation.classes[1].language, "pt");
		assert_eq!(evaluation.accuracy, 0.0);
	}

	#[test]
	fn writes_named_files() {
		let dir = tempfile::tempdir().unwrap();
		let config = ModelConfig::new(VocabularyMode::Letters, 1, 0.5).unwrap();
		let predictions = vec![prediction("1", "en", Some("en"))];
		let evaluation = Evaluation::new(&predictions, &["en".to_owned()]);

		let (trace, eval) = write_report(dir.path(), &config, &predictions, &evaluation).unwrap();
		assert_eq!(trace.file_name().unwrap(), "trace_1_1_0.5.txt");
		assert_eq!(eval.file_name().unwrap(), "eval_1_1_0.5.txt");
		assert_eq!(std::fs::read_to_string(trace).unwrap(), "1  en  -1.00E0  en  correct\n");
		assert!(std::fs::read_to_string(eval).unwrap().starts_with("1.0000\n"));
	}

	#[test]
	fn failed_eval_write_leaves_no_trace() {
		let dir = tempfile::tempdir().unwrap();
		let config = ModelConfig::new(VocabularyMode::Lowercase, 1, 1.0).unwrap();
		let predictions = vec![prediction("1", "en", Some("en"))];
		let evaluation = Evaluation::new(&predictions, &["en".to_owned()]);

		std::fs::create_dir(eval_path(dir.path(), &config)).unwrap();
		assert!(write_report(dir.path(), &config, &predictions, &evaluation).is_err());
		assert!(!trace_path(dir.path(), &config).exists());
		assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
	}
}
