use std::collections::BTreeMap;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Instant;

use log::{debug, info};
use rand::RngCore;
use regex::Regex;

use crate::analyzer::{Analyzer, Distribution};
use crate::config::{LibraryConfig, SelfFeed};
use crate::error::{GarblerError, Result};
use crate::io::{self, LoadError};
use crate::script::{create_word, Script};
use crate::translator::Translator;

/// Characters splitting training text into words.
pub const DEFAULT_DELIMITER: &str = r#"[\s_;:"„0-9\[\]()<>]+"#;

pub(crate) static DELIMITER: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(DEFAULT_DELIMITER).expect("default delimiter is a valid pattern"));

/// Named set of analyzers trained together and queried by scripts.
///
/// # Lifecycle
/// - The library is open on creation: analyzers can be registered.
/// - The first call to `analyze*` seals it; registering then fails with
///   [`GarblerError::SealedLibrary`].
/// - [`Library::clear`] wipes every analyzer and reopens the library.
///
/// Analyzer names are case-insensitive (stored upper-cased).
pub struct Library {
	analyzers: BTreeMap<String, Box<dyn Analyzer>>,
	sealed: bool,
	analyzed_words: usize,
	filter: Translator,
	self_feed: SelfFeed,
	self_fed: u32,
}

impl Library {
	/// Creates an empty, open library that folds training text to lowercase.
	pub fn new() -> Self {
		Self {
			analyzers: BTreeMap::new(),
			sealed: false,
			analyzed_words: 0,
			filter: Translator::CaseInsensitive,
			self_feed: SelfFeed::default(),
			self_fed: 0,
		}
	}

	/// Creates a library holding the default analyzer set.
	pub fn with_defaults(config: &LibraryConfig) -> Result<Self> {
		let mut library = Self::new();
		library.load_defaults(config)?;
		Ok(library)
	}

	/// Registers the default analyzer set and applies the self-feed policy.
	///
	/// # Errors
	/// - `InvalidConfiguration` if `config` holds out of range values
	/// - `SealedLibrary` if the library already analyzed text
	pub fn load_defaults(&mut self, config: &LibraryConfig) -> Result<()> {
		if self.sealed {
			return Err(GarblerError::SealedLibrary);
		}
		for (name, analyzer) in config.build_analyzers()? {
			self.insert(name, analyzer);
		}
		self.self_feed = config.self_feed;
		Ok(())
	}

	/// Registers `analyzer` under `name`, replacing any analyzer of the same name.
	pub fn add_analyzer<A: Analyzer + 'static>(&mut self, name: &str, analyzer: A) -> Result<()> {
		if self.sealed {
			return Err(GarblerError::SealedLibrary);
		}
		self.insert(name, Box::new(analyzer));
		Ok(())
	}

	fn insert(&mut self, name: &str, analyzer: Box<dyn Analyzer>) {
		self.analyzers.insert(name.to_uppercase(), analyzer);
	}

	pub fn analyzer(&self, name: &str) -> Option<&dyn Analyzer> {
		self.analyzers.get(&name.to_uppercase()).map(|a| a.as_ref())
	}

	/// Queries one analyzer; `None` when it is missing or has nothing to say.
	pub fn next(&self, name: &str, context: &str, prefix: &str) -> Option<Distribution> {
		self.analyzer(name)?.next(context, prefix)
	}

	/// Feeds `text` split with the default delimiter. Returns the number of words analyzed.
	pub fn analyze(&mut self, text: &str) -> usize {
		self.analyze_with(text, None, None)
	}

	/// Feeds `text` to every analyzer, word by word.
	///
	/// - Text goes through the library filter first
	/// - `delimiter` defaults to [`DEFAULT_DELIMITER`]
	/// - Empty fragments are not words and are not counted
	/// - At most `max_words` words are analyzed when set
	///
	/// Seals the library.
	pub fn analyze_with(&mut self, text: &str, delimiter: Option<&Regex>, max_words: Option<usize>) -> usize {
		let start = Instant::now();
		self.sealed = true;

		let text = self.filter.translate(text);
		let delimiter = delimiter.unwrap_or(&DELIMITER);
		let count = self.feed(delimiter.split(&text), max_words);

		info!(
			"Parsed {} [{}] words across {} modules in {}ms",
			count,
			self.analyzed_words,
			self.analyzers.len(),
			start.elapsed().as_millis()
		);
		count
	}

	/// Hands words to every analyzer, skipping empty ones. Returns the number fed.
	fn feed<'w, I>(&mut self, words: I, max_words: Option<usize>) -> usize
	where
		I: IntoIterator<Item = &'w str>,
	{
		let mut count = 0;
		for word in words
			.into_iter()
			.filter(|w| !w.is_empty())
			.take(max_words.unwrap_or(usize::MAX))
		{
			for analyzer in self.analyzers.values_mut() {
				analyzer.analyze(word);
			}
			count += 1;
		}
		self.analyzed_words += count;
		count
	}

	/// Feeds a text file line by line, skipping empty lines.
	///
	/// `max_words` caps the total over the whole file.
	pub fn analyze_from_file<P: AsRef<Path>>(
		&mut self,
		path: P,
		delimiter: Option<&Regex>,
		max_words: Option<usize>,
	) -> std::result::Result<usize, LoadError> {
		let lines = io::read_file(path)?;
		let mut total = 0;
		for line in lines.iter().filter(|l| !l.is_empty()) {
			let remaining = match max_words {
				Some(max) if total >= max => break,
				Some(max) => Some(max - total),
				None => None,
			};
			total += self.analyze_with(line, delimiter, remaining);
		}
		Ok(total)
	}

	/// Generates a line of `word_count` words joined with `separator`.
	pub fn run<S: Script + ?Sized>(&mut self, script: &mut S, word_count: usize, separator: &str) -> Result<String> {
		let mut rng = rand::rng();
		self.run_with_rng(script, word_count, separator, &mut rng)
	}

	/// Same as [`Library::run`] with a caller supplied generator.
	///
	/// The script's `on_start` runs first. Each word sees the line generated so
	/// far as its context. Once the line is complete the script's `on_complete`
	/// runs, then the generated words are fed back as they are, without going
	/// through the library filter, when the self-feed policy allows it.
	///
	/// # Errors
	/// `NothingAnalyzed` if no word was ever analyzed.
	pub fn run_with_rng<S: Script + ?Sized>(
		&mut self,
		script: &mut S,
		word_count: usize,
		separator: &str,
		rng: &mut dyn RngCore,
	) -> Result<String> {
		if self.analyzed_words == 0 {
			return Err(GarblerError::NothingAnalyzed);
		}

		script.on_start();
		let mut words = Vec::with_capacity(word_count);
		let mut line = String::new();
		for i in 0..word_count {
			let word = create_word(script, self, &line, rng);
			if i > 0 {
				line.push_str(separator);
			}
			line.push_str(&word);
			words.push(word);
		}
		script.on_complete(&line);
		info!("Generated {} words", word_count);

		if self.self_feed.allows(self.self_fed) {
			self.self_fed += 1;
			self.sealed = true;
			let fed = self.feed(words.iter().map(String::as_str), Some(word_count));
			debug!("Fed back {} generated words ({} lines so far)", fed, self.self_fed);
		}
		Ok(line)
	}

	/// Wipes every analyzer and reopens the library. Analyzers stay registered.
	pub fn clear(&mut self) {
		for analyzer in self.analyzers.values_mut() {
			analyzer.clear();
		}
		self.sealed = false;
		self.analyzed_words = 0;
		self.self_fed = 0;
		info!("Library cleared");
	}

	/// Translator applied to training text. Generated words go through the
	/// script's output filter instead.
	pub fn set_filter(&mut self, filter: Translator) {
		self.filter = filter;
	}

	pub fn filter(&self) -> &Translator {
		&self.filter
	}

	pub fn set_self_feed(&mut self, policy: SelfFeed) {
		self.self_feed = policy;
	}

	pub fn analyzer_count(&self) -> usize {
		self.analyzers.len()
	}

	/// Registered names, upper-cased and sorted.
	pub fn analyzer_names(&self) -> Vec<String> {
		self.analyzers.keys().cloned().collect()
	}

	pub fn analyzed_word_count(&self) -> usize {
		self.analyzed_words
	}

	pub fn is_self_feeding(&self) -> bool {
		self.self_feed != SelfFeed::Disabled
	}

	pub fn is_sealed(&self) -> bool {
		self.sealed
	}
}

impl Default for Library {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::analyzer::{names, Alphabet, InitialCharDistribution};

	#[test]
	fn names_are_case_insensitive() {
		let mut library = Library::new();
		library.add_analyzer("charBegin", InitialCharDistribution::new()).unwrap();
		library.analyze("xylophone");
		assert_eq!(library.analyzer_names(), vec!["CHARBEGIN"]);
		assert!(library.next(names::CHAR_BEGIN, "", "").is_some());
		assert!(library.next("missing", "", "").is_none());
	}

	#[test]
	fn empty_fragments_are_not_words() {
		let mut library = Library::new();
		library.add_analyzer(names::ALPHABET, Alphabet::new()).unwrap();
		assert_eq!(library.analyze("  one, 2 two;;three  "), 3);
		assert_eq!(library.analyze(""), 0);
		assert_eq!(library.analyzed_word_count(), 3);
	}

	#[test]
	fn custom_delimiter_and_word_cap() {
		let mut library = Library::new();
		library.add_analyzer(names::ALPHABET, Alphabet::new()).unwrap();
		let dash = Regex::new("-").unwrap();
		assert_eq!(library.analyze_with("a b-c d-e", Some(&dash), None), 3);
		assert_eq!(library.analyze_with("a b c d", None, Some(2)), 2);
	}

	#[test]
	fn new_libraries_fold_case() {
		let mut library = Library::new();
		assert_eq!(library.filter(), &Translator::CaseInsensitive);
		library.add_analyzer(names::CHAR_BEGIN, InitialCharDistribution::new()).unwrap();
		library.analyze("Zebra zone");
		let map = library.next(names::CHAR_BEGIN, "", "").and_then(Distribution::into_chars).unwrap();
		assert_eq!(map.keys(), &['z']);

		library.clear();
		library.set_filter(Translator::Identity);
		library.analyze("Zebra zone");
		let map = library.next(names::CHAR_BEGIN, "", "").and_then(Distribution::into_chars).unwrap();
		assert_eq!(map.keys(), &['Z', 'z']);
	}

	#[test]
	fn filter_applies_before_analysis() {
		let mut library = Library::new();
		library.add_analyzer(names::CHAR_BEGIN, InitialCharDistribution::new()).unwrap();
		library.set_filter(Translator::CaseInsensitive);
		library.analyze("Apple apricot");
		let map = library.next(names::CHAR_BEGIN, "", "").and_then(Distribution::into_chars).unwrap();
		assert_eq!(map.keys(), &['a']);
	}

	#[test]
	fn load_defaults_requires_open_library() {
		let mut library = Library::with_defaults(&LibraryConfig::default()).unwrap();
		assert_eq!(library.analyzer_count(), 9);
		library.analyze("lorem ipsum");
		assert_eq!(
			library.load_defaults(&LibraryConfig::default()),
			Err(GarblerError::SealedLibrary)
		);
	}
}
