use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware, web};
use clap::Parser;
use log::{error, info};
use serde::{Deserialize, Serialize};

use langid_core::corpus::{TrainingCorpus, read_records};
use langid_core::report::select_language;
use langid_core::{Classifier, ModelConfig, ScoreVector, VocabularyMode};

/// Language identification service.
///
/// Trains a model from a corpus at start-up, then answers classification
/// requests from the immutable model.
#[derive(Parser, Debug)]
#[command(name = "langid-server", version)]
struct Args {
	/// Training corpus
	#[arg(long, env = "LANGID_TRAIN")]
	train: PathBuf,

	/// Vocabulary: 0 (lowercase a-z), 1 (a-z and A-Z) or 2 (any alphabetic character)
	#[arg(short, long, default_value = "0")]
	vocabulary: VocabularyMode,

	/// Additive smoothing value (>= 0)
	#[arg(short, long, default_value_t = 0.5)]
	smoothing: f64,

	/// Add class priors to every score
	#[arg(long)]
	priors: bool,

	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	#[arg(long, default_value_t = 5000)]
	port: u16,
}

/// Query parameters of the `/v1/classify` endpoint
#[derive(Deserialize)]
struct ClassifyParams {
	text: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct ClassifyResponse {
	/// Winning language, `None` when the model knows no language
	language: Option<String>,
	scores: ScoreVector,
}

/// HTTP GET endpoint `/v1/classify`
///
/// Cleans the raw `text` with the configured vocabulary and returns the
/// winning language together with the full score vector.
#[get("/v1/classify")]
async fn get_classify(data: web::Data<Classifier>, query: web::Query<ClassifyParams>) -> impl Responder {
	let raw = match &query.text {
		Some(text) => text,
		None => return HttpResponse::BadRequest().body("Missing 'text' parameter"),
	};

	let text = data.config().vocabulary().clean(raw);
	let scores = match data.score(&text) {
		Ok(scores) => scores,
		Err(e) => {
			error!("failed to score {:?}: {}", text, e);
			return HttpResponse::InternalServerError().body(e.to_string());
		}
	};

	let language = select_language(&scores).map(|(language, _)| language.to_owned());
	HttpResponse::Ok().json(ClassifyResponse { language, scores })
}

#[get("/v1/languages")]
async fn get_languages(data: web::Data<Classifier>) -> impl Responder {
	HttpResponse::Ok().json(data.model().languages())
}

#[get("/v1/config")]
async fn get_config(data: web::Data<Classifier>) -> impl Responder {
	HttpResponse::Ok().json(data.config())
}

/// Reads, cleans and trains on the training corpus.
fn build_classifier(args: &Args) -> langid_core::Result<Classifier> {
	let config = ModelConfig::new(args.vocabulary, 1, args.smoothing)?.with_priors(args.priors);
	let records = read_records(&args.train)?;
	let corpus = TrainingCorpus::from_records(&records, config.vocabulary());
	Classifier::train(&corpus, &config)
}

/// Main entry point for the server.
///
/// Trains the model once, shares it read-only between workers, and starts
/// an Actix-web HTTP server.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let classifier = build_classifier(&args).map_err(|e| {
		error!("failed to build the model from {}: {}", args.train.display(), e);
		std::io::Error::other(e)
	})?;
	let shared_classifier = web::Data::new(classifier);

	info!("listening on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(middleware::Logger::default())
			.wrap(Cors::permissive())
			.app_data(shared_classifier.clone())
			.service(get_classify)
			.service(get_languages)
			.service(get_config)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}
