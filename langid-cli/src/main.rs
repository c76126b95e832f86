use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use log::info;

use langid_core::corpus::{TrainingCorpus, read_records, test_records};
use langid_core::report::{Evaluation, predictions, write_report};
use langid_core::{Classifier, ModelConfig, VocabularyMode};

/// Character-level Naive Bayes language identification of tweets.
///
/// Trains on a tab-delimited corpus, scores every test record and writes
/// `trace_{V}_{n}_{s}.txt` and `eval_{V}_{n}_{s}.txt` to the output folder.
#[derive(Parser, Debug)]
#[command(name = "langid", version)]
struct Args {
	/// Vocabulary: 0 (lowercase a-z), 1 (a-z and A-Z) or 2 (any alphabetic character)
	#[arg(short, long)]
	vocabulary: VocabularyMode,

	/// Size of the n-gram, only used to name output files
	#[arg(short, long, default_value_t = 1)]
	ngram: usize,

	/// Additive smoothing value (>= 0)
	#[arg(short, long)]
	smoothing: f64,

	/// Training corpus
	#[arg(long, env = "LANGID_TRAIN")]
	train: PathBuf,

	/// Test corpus
	#[arg(long, env = "LANGID_TEST")]
	test: PathBuf,

	/// Folder receiving the trace and evaluation files
	#[arg(short, long, default_value = ".")]
	output_dir: PathBuf,

	/// Add class priors to every score
	#[arg(long)]
	priors: bool,
}

/// Runs a full batch. Nothing is written unless every record was scored.
fn run(args: &Args) -> Result<Evaluation> {
	let config = ModelConfig::new(args.vocabulary, args.ngram, args.smoothing)?.with_priors(args.priors);
	info!("run {} (priors = {})", config.run_name(), config.priors());

	let training = read_records(&args.train)
		.with_context(|| format!("failed to read training corpus {}", args.train.display()))?;
	let corpus = TrainingCorpus::from_records(&training, config.vocabulary());
	if corpus.is_empty() {
		bail!("training corpus {} has no labeled record", args.train.display());
	}

	let classifier = Classifier::train(&corpus, &config).context("failed to train the model")?;

	let tests = read_records(&args.test)
		.with_context(|| format!("failed to read test corpus {}", args.test.display()))?;
	let records = test_records(&tests, config.vocabulary());
	let scores = classifier.score_batch(&records).context("failed to score test records")?;

	let predictions = predictions(&records, &scores);
	let evaluation = Evaluation::new(&predictions, &classifier.model().languages());
	write_report(&args.output_dir, &config, &predictions, &evaluation)
		.with_context(|| format!("failed to write results to {}", args.output_dir.display()))?;

	Ok(evaluation)
}

fn main() -> Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let evaluation = run(&args)?;
	println!("{:.4}", evaluation.accuracy);
	Ok(())
}
