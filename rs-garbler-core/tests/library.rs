use std::env;
use std::fs;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use regex::Regex;

use rs_garbler_core::analyzer::{names, Alphabet, InitialCharDistribution};
use rs_garbler_core::io::LoadError;
use rs_garbler_core::{DefaultScript, Distribution, GarblerError, Library, LibraryConfig, SelfFeed, Translator};

const CORPUS: &str = "lorem ipsum dolor sit amet consectetur adipiscing elit sed do eiusmod tempor \
	incididunt ut labore et dolore magna aliqua";

fn trained(config: &LibraryConfig) -> Library {
	let mut library = Library::with_defaults(config).unwrap();
	library.analyze(CORPUS);
	library
}

#[test]
fn sealing_follows_analysis() {
	let mut library = Library::new();
	library.add_analyzer("first", InitialCharDistribution::new()).unwrap();
	assert!(!library.is_sealed());

	assert_eq!(library.analyze("a b c"), 3);
	assert!(library.is_sealed());
	assert_eq!(
		library.add_analyzer("second", Alphabet::new()),
		Err(GarblerError::SealedLibrary)
	);

	library.clear();
	assert!(!library.is_sealed());
	library.add_analyzer("second", Alphabet::new()).unwrap();
	assert_eq!(library.analyzer_count(), 2);
}

#[test]
fn untrained_library_refuses_to_generate() {
	let mut library = Library::with_defaults(&LibraryConfig::default()).unwrap();
	let result = library.run(&mut DefaultScript::new(), 3, " ");
	assert_eq!(result, Err(GarblerError::NothingAnalyzed));

	// analyzing nothing but delimiters does not count either
	library.analyze("  12 ;; ");
	assert_eq!(library.run(&mut DefaultScript::new(), 3, " "), Err(GarblerError::NothingAnalyzed));
}

#[test]
fn clearing_twice_is_clearing_once() {
	let mut library = trained(&LibraryConfig::default());
	library.clear();
	let names_once = library.analyzer_names();
	let words_once = library.analyzed_word_count();
	library.clear();

	assert_eq!(library.analyzer_names(), names_once);
	assert_eq!(library.analyzed_word_count(), words_once);
	assert_eq!(words_once, 0);
	for name in library.analyzer_names() {
		assert!(library.next(&name, "", "lo").is_none(), "{name} kept data");
	}
}

#[test]
fn same_seed_same_line() {
	let mut a = trained(&LibraryConfig::default());
	let mut b = trained(&LibraryConfig::default());
	let mut script = DefaultScript::new();

	let line_a = a.run_with_rng(&mut script, 8, " ", &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
	let line_b = b.run_with_rng(&mut script, 8, " ", &mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
	assert_eq!(line_a, line_b);
	assert_eq!(line_a.split(' ').count(), 8);
}

#[test]
fn generated_words_use_the_corpus_alphabet() {
	let mut library = trained(&LibraryConfig::default());
	let mut rng = ChaCha8Rng::seed_from_u64(11);
	for _ in 0..20 {
		let line = library.run_with_rng(&mut DefaultScript::new(), 4, "_", &mut rng).unwrap();
		for word in line.split('_') {
			assert!(!word.is_empty());
			assert!(word.chars().all(|c| CORPUS.contains(c)), "unexpected letter in {word}");
		}
	}
}

#[test]
fn self_feeding_is_capped() {
	let config = LibraryConfig {
		self_feed: SelfFeed::Runs(1),
		..LibraryConfig::default()
	};
	let mut library = trained(&config);
	assert!(library.is_self_feeding());
	let before = library.analyzed_word_count();
	let mut rng = ChaCha8Rng::seed_from_u64(5);

	library.run_with_rng(&mut DefaultScript::new(), 3, " ", &mut rng).unwrap();
	assert_eq!(library.analyzed_word_count(), before + 3);

	library.run_with_rng(&mut DefaultScript::new(), 3, " ", &mut rng).unwrap();
	assert_eq!(library.analyzed_word_count(), before + 3);
}

#[test]
fn self_feeding_disabled_by_default() {
	let mut library = trained(&LibraryConfig::default());
	let before = library.analyzed_word_count();
	library.run(&mut DefaultScript::new(), 5, " ").unwrap();
	assert_eq!(library.analyzed_word_count(), before);
	assert!(!library.is_self_feeding());
}

#[test]
fn self_feeding_keeps_the_requested_word_count() {
	let config = LibraryConfig {
		self_feed: SelfFeed::Unlimited,
		..LibraryConfig::default()
	};
	let mut library = trained(&config);
	let before = library.analyzed_word_count();
	let mut rng = ChaCha8Rng::seed_from_u64(1);

	// '-' is not a delimiter, the words still go back one by one
	let line = library.run_with_rng(&mut DefaultScript::new(), 3, "-", &mut rng).unwrap();
	assert_eq!(line.split('-').count(), 3);
	assert_eq!(library.analyzed_word_count(), before + 3);
}

#[test]
fn fed_back_words_skip_the_input_filter() {
	let mut library = Library::with_defaults(&LibraryConfig {
		self_feed: SelfFeed::Unlimited,
		..LibraryConfig::default()
	})
	.unwrap();
	library.set_filter(Translator::parse_table("a=b\nb=c").unwrap());
	library.analyze("aaaa aaaa aaaa");

	let mut rng = ChaCha8Rng::seed_from_u64(1);
	for _ in 0..5 {
		library.run_with_rng(&mut DefaultScript::new(), 3, " ", &mut rng).unwrap();
	}
	let alphabet = library.next(names::ALPHABET, "", "").and_then(Distribution::into_chars).unwrap();
	assert_eq!(alphabet.keys(), &['b']);
}

#[test]
fn input_filter_is_not_applied_to_output() {
	let mut library = Library::with_defaults(&LibraryConfig::default()).unwrap();
	library.set_filter(Translator::parse_table("a=b\nb=c").unwrap());
	library.analyze("aaaa aaaa aaaa");

	let line = library
		.run_with_rng(&mut DefaultScript::new(), 3, " ", &mut ChaCha8Rng::seed_from_u64(1))
		.unwrap();
	assert!(line.contains('b'), "{line}");
	assert!(line.chars().all(|c| c == 'b' || c == ' '), "{line}");
}

#[test]
fn output_filter_applies_to_generated_words() {
	let mut library = trained(&LibraryConfig::default());
	let mut script = DefaultScript::new().with_output_filter(Translator::parse_table("a,e,i,o,u=y").unwrap());
	let line = library
		.run_with_rng(&mut script, 10, " ", &mut ChaCha8Rng::seed_from_u64(3))
		.unwrap();
	assert!(!line.chars().any(|c| "aeiou".contains(c)), "{line}");
	assert!(line.contains('y'), "{line}");
}

#[test]
fn corpus_files_are_read_line_by_line() {
	let dir = env::temp_dir().join(format!("rs-garbler-corpus-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let path = dir.join("latin.dat");
	fs::write(&path, "lorem ipsum\n\ndolor sit amet\nconsectetur\n").unwrap();

	let mut library = Library::new();
	library.add_analyzer(names::ALPHABET, Alphabet::new()).unwrap();
	assert_eq!(library.analyze_from_file(&path, None, None).unwrap(), 6);
	assert_eq!(library.analyze_from_file(&path, None, Some(4)).unwrap(), 4);

	let on_o = Regex::new("o").unwrap();
	assert_eq!(library.analyze_from_file(&path, Some(&on_o), Some(1)).unwrap(), 1);

	assert!(matches!(
		library.analyze_from_file(dir.join("missing.dat"), None, None),
		Err(LoadError::Io(_))
	));
	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn translator_tables_load_from_disk() {
	let dir = env::temp_dir().join(format!("rs-garbler-table-{}", std::process::id()));
	fs::create_dir_all(&dir).unwrap();
	let path = dir.join("soft.gtf");
	fs::write(&path, "c,k=q\n").unwrap();
	fs::write(dir.join("broken.gtf"), "ok=k\nbroken\n").unwrap();

	let translator = Translator::from_file(&path).unwrap();
	assert_eq!(translator.translate("cake"), "qaqe");
	assert!(matches!(
		Translator::from_file(dir.join("broken.gtf")),
		Err(LoadError::BadFormat { line: 2, .. })
	));
	fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn queries_return_owned_snapshots() {
	let mut library = Library::new();
	library.add_analyzer(names::CHAR_BEGIN, InitialCharDistribution::new()).unwrap();
	library.analyze("cat car can");
	let snapshot = library.next(names::CHAR_BEGIN, "", "").and_then(Distribution::into_chars).unwrap();

	library.clear();
	library.analyze("dog");
	assert_eq!(snapshot.keys(), &['c']);
	assert!((snapshot.value(&'c') - 1.0).abs() < 1e-6);
}
