use log::info;
use rs_garbler_core::analyzer::{names, Alphabet};
use rs_garbler_core::{DefaultScript, GarblerError, Library, LibraryConfig, SelfFeed, Translator};

const LOREM: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit, sed do eiusmod \
    tempor incididunt ut labore et dolore magna aliqua. Ut enim ad minim veniam, quis nostrud \
    exercitation ullamco laboris nisi ut aliquip ex ea commodo consequat. Duis aute irure dolor \
    in reprehenderit in voluptate velit esse cillum dolore eu fugiat nulla pariatur. Excepteur \
    sint occaecat cupidatat non proident, sunt in culpa qui officia deserunt mollit anim id est \
    laborum.";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Verbosity follows RUST_LOG (try RUST_LOG=debug)
    env_logger::init();

    // Default analyzers, with the generated lines fed back twice
    let config = LibraryConfig {
        self_feed: SelfFeed::Runs(2),
        ..LibraryConfig::default()
    };
    let mut library = Library::with_defaults(&config)?;

    // Generating before any training fails
    match library.run(&mut DefaultScript::new(), 5, " ") {
        Err(GarblerError::NothingAnalyzed) => println!("Nothing analyzed yet, as expected"),
        other => println!("Should not happen: {other:?}"),
    }

    // Punctuation is not in the default delimiter, so strip it first
    let text: String = LOREM.chars().filter(|c| !c.is_ascii_punctuation()).collect();
    let words = library.analyze(&text);
    info!("{} analyzers trained on {} words", library.analyzer_count(), words);

    // The library is sealed once trained
    match library.add_analyzer(names::ALPHABET, Alphabet::new()) {
        Err(GarblerError::SealedLibrary) => println!("Library sealed, analyzers are locked in"),
        other => println!("Should not happen: {other:?}"),
    }

    // Training text is folded to lowercase by default; the output gets its own filter
    let mut script = DefaultScript::new().with_output_filter(Translator::parse_table("c=k")?);
    for i in 0..5 {
        println!("Line {}: {}", i + 1, library.run(&mut script, 6, " ")?);
    }
    println!("{} words known after self-feeding", library.analyzed_word_count());

    // Clearing unseals the library
    library.clear();
    library.add_analyzer(names::ALPHABET, Alphabet::new())?;
    println!("Cleared, {} analyzers registered", library.analyzer_count());

    Ok(())
}
