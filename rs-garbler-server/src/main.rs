use std::path::Path;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};
use log::{info, warn};
use regex::Regex;
use serde::Deserialize;

use rs_garbler_core::analysis::DecaySchedule;
use rs_garbler_core::io::{get_filename, list_files, LoadError};
use rs_garbler_core::{DefaultScript, GarblerError, Library, LibraryConfig, SelfFeed, Translator};

const DATA_DIR: &str = "./data";

/// Query parameters of `/v1/init`, mapped onto [`LibraryConfig`].
#[derive(Deserialize)]
struct InitParams {
	lirad: Option<usize>,
	lifactor: Option<f32>,
	decay: Option<DecaySchedule>,
	cemin: Option<usize>,
	cerad: Option<usize>,
	endrad: Option<usize>,
	repeat: Option<usize>,
	/// `0` disables self-feeding, a negative value removes the limit.
	selffeed: Option<i64>,
}

#[derive(Deserialize)]
struct FeedParams {
	delim: Option<String>,
	count: Option<usize>,
}

#[derive(Deserialize)]
struct CorpusQuery {
	name: Option<String>,
}

#[derive(Deserialize)]
struct FilterQuery {
	mode: Option<String>,
	name: Option<String>,
}

#[derive(Deserialize)]
struct GenerateParams {
	words: Option<usize>,
	separator: Option<String>,
}

struct SharedData {
	library: Option<Library>,
}

impl InitParams {
	fn config(&self) -> LibraryConfig {
		let defaults = LibraryConfig::default();
		LibraryConfig {
			letter_radius: self.lirad.unwrap_or(defaults.letter_radius),
			letter_influence: self.lifactor.unwrap_or(defaults.letter_influence),
			decay: self.decay.unwrap_or(defaults.decay),
			ending_min_radius: self.cemin.unwrap_or(defaults.ending_min_radius),
			ending_radius: self.cerad.unwrap_or(defaults.ending_radius),
			end_radius: self.endrad.unwrap_or(defaults.end_radius),
			repeat_max_run: self.repeat.unwrap_or(defaults.repeat_max_run),
			self_feed: match self.selffeed {
				None | Some(0) => SelfFeed::Disabled,
				Some(n) if n < 0 => SelfFeed::Unlimited,
				Some(n) => SelfFeed::Runs(u32::try_from(n).unwrap_or(u32::MAX)),
			},
		}
	}
}

fn error_response(e: GarblerError) -> HttpResponse {
	match e {
		GarblerError::NothingAnalyzed => HttpResponse::Conflict().body(e.to_string()),
		_ => HttpResponse::BadRequest().body(e.to_string()),
	}
}

fn load_error_response(e: LoadError) -> HttpResponse {
	match e {
		LoadError::Io(_) => HttpResponse::InternalServerError().body(e.to_string()),
		LoadError::BadFormat { .. } => HttpResponse::BadRequest().body(e.to_string()),
	}
}

macro_rules! lock_library {
	($data:expr, $guard:ident, $library:ident) => {
		let mut $guard = match $data.lock() {
			Ok(m) => m,
			Err(_) => return HttpResponse::InternalServerError().body("Library lock failed"),
		};
		let $library = match $guard.library.as_mut() {
			Some(l) => l,
			None => return HttpResponse::Conflict().body("Library not initialized, call /v1/init first"),
		};
	};
}

/// HTTP PUT endpoint `/v1/init`
///
/// Replaces the shared library with a fresh one holding the default analyzers.
#[put("/v1/init")]
async fn put_init(data: web::Data<Mutex<SharedData>>, query: web::Query<InitParams>) -> impl Responder {
	let library = match Library::with_defaults(&query.config()) {
		Ok(l) => l,
		Err(e) => {
			warn!("Rejected configuration: {e}");
			return error_response(e);
		}
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Library lock failed"),
	};
	shared_data.library = Some(library);
	HttpResponse::Ok().body("Library initialized")
}

#[get("/v1/info")]
async fn get_info(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	lock_library!(data, shared_data, library);
	HttpResponse::Ok().body(format!(
		"analyzers: {}\nwords: {}\nsealed: {}\nself-feeding: {}",
		library.analyzer_names().join(", "),
		library.analyzed_word_count(),
		library.is_sealed(),
		library.is_self_feeding()
	))
}

/// HTTP PUT endpoint `/v1/feed`
///
/// Analyzes the request body. `delim` overrides the word delimiter pattern,
/// `count` caps the number of words.
#[put("/v1/feed")]
async fn put_feed(data: web::Data<Mutex<SharedData>>, query: web::Query<FeedParams>, body: String) -> impl Responder {
	let delimiter = match query.delim.as_deref().map(Regex::new).transpose() {
		Ok(d) => d,
		Err(e) => return HttpResponse::BadRequest().body(format!("Invalid delimiter: {e}")),
	};

	lock_library!(data, shared_data, library);
	let count = library.analyze_with(&body, delimiter.as_ref(), query.count);
	HttpResponse::Ok().body(count.to_string())
}

#[put("/v1/feed_corpus")]
async fn put_feed_corpus(data: web::Data<Mutex<SharedData>>, query: web::Query<CorpusQuery>) -> impl Responder {
	let name = match &query.name {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty corpus name"),
	};
	let path = Path::new(DATA_DIR).join(format!("{name}.dat"));

	lock_library!(data, shared_data, library);
	match library.analyze_from_file(&path, None, None) {
		Ok(count) => HttpResponse::Ok().body(count.to_string()),
		Err(e) => load_error_response(e),
	}
}

#[get("/v1/corpora")]
async fn get_corpora() -> impl Responder {
	let names: std::io::Result<Vec<String>> = list_files(DATA_DIR, "dat")
		.and_then(|files| files.iter().map(get_filename).collect());
	match names {
		Ok(names) => HttpResponse::Ok().body(names.join("\n")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora"),
	}
}

/// HTTP PUT endpoint `/v1/filter`
///
/// Sets the filter applied to training text. `mode` is `none`, `case` or
/// `table`; tables are read from `./data/<name>.gtf`.
#[put("/v1/filter")]
async fn put_filter(data: web::Data<Mutex<SharedData>>, query: web::Query<FilterQuery>) -> impl Responder {
	let translator = match query.mode.as_deref().map(str::to_lowercase).as_deref() {
		None | Some("none") => Translator::Identity,
		Some("case") => Translator::CaseInsensitive,
		Some("table") => {
			let name = match &query.name {
				Some(s) if !s.trim().is_empty() => s.trim(),
				_ => return HttpResponse::BadRequest().body("Missing or empty table name"),
			};
			match Translator::from_file(Path::new(DATA_DIR).join(format!("{name}.gtf"))) {
				Ok(t) => t,
				Err(e) => return load_error_response(e),
			}
		}
		Some(other) => return HttpResponse::BadRequest().body(format!("Unknown filter mode '{other}'")),
	};

	lock_library!(data, shared_data, library);
	library.set_filter(translator);
	HttpResponse::Ok().body("Filter set")
}

#[put("/v1/clear")]
async fn put_clear(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	lock_library!(data, shared_data, library);
	library.clear();
	HttpResponse::Ok().body("Library cleared")
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates one line of `words` words (default 1) joined with `separator`
/// (default a single space).
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let words = query.words.unwrap_or(1);
	let separator = query.separator.as_deref().unwrap_or(" ");

	lock_library!(data, shared_data, library);
	match library.run(&mut DefaultScript::new(), words, separator) {
		Ok(line) => HttpResponse::Ok().body(line),
		Err(e) => error_response(e),
	}
}

/// Main entry point for the server.
///
/// Starts with no library; clients call `/v1/init` first, then feed text and
/// generate. Verbosity follows `RUST_LOG`.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Corpora (`.dat`) and translator tables (`.gtf`) are read from `./data`.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = web::Data::new(Mutex::new(SharedData { library: None }));
	info!("Listening on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_data.clone())
			.service(put_init)
			.service(get_info)
			.service(put_feed)
			.service(put_feed_corpus)
			.service(get_corpora)
			.service(put_filter)
			.service(put_clear)
			.service(get_generated)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
