//! Statistical collectors fed word by word during training.
//!
//! Every analyzer answers the same question at generation time: given the
//! line generated so far (`context`) and the word being built (`prefix`),
//! what is the distribution over the next unit? The unit differs per analyzer
//! (a character, a length, an ending), so answers come back as a
//! [`Distribution`] and the caller picks the variant it expects.

use serde::Serialize;

use crate::heatmap::HeatMap;

mod alphabet;
mod char_end_position;
mod common_ending;
mod initial_char;
mod letter_influence;
mod repeat_letter;
mod word_length;

pub use alphabet::Alphabet;
pub use char_end_position::CharEndPosition;
pub use common_ending::CommonEnding;
pub use initial_char::InitialCharDistribution;
pub use letter_influence::LetterInfluence;
pub use repeat_letter::RepeatLetter;
pub use word_length::{SequentialWordLength, WordLengthCorrelation, WordLengthDistribution};

/// Registry names used by [`crate::Library::load_defaults`] and the default script.
pub mod names {
	pub const INFLUENCE: &str = "Influence";
	pub const COMMON_ENDINGS: &str = "CommonEndings";
	pub const WORD_LENGTH: &str = "WordLength";
	pub const LENGTH_CORRELATION: &str = "LengthCorrelation";
	pub const CHAR_BEGIN: &str = "CharBegin";
	pub const CHAR_END: &str = "CharEnd";
	pub const ALPHABET: &str = "Alphabet";
	pub const REPETITIONS: &str = "Repetitions";
	pub const SEQUENTIAL_LENGTH: &str = "SequentialLength";
}

/// A statistical model trained one word at a time.
///
/// Analyzers must be `Send` so that a library can be shared behind a mutex.
pub trait Analyzer: Send {
	/// Folds one word into the statistics. Empty words are ignored.
	fn analyze(&mut self, word: &str);

	/// Distribution over the next unit, or `None` when the analyzer has
	/// nothing to say for this prefix.
	///
	/// The returned maps are owned snapshots.
	fn next(&self, context: &str, prefix: &str) -> Option<Distribution>;

	/// Restores the state of a freshly constructed analyzer.
	fn clear(&mut self);
}

/// Answer of [`Analyzer::next`], tagged by the kind of unit it ranks.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub enum Distribution {
	Chars(HeatMap<char>),
	Lengths(HeatMap<usize>),
	Endings(HeatMap<String>),
}

impl Distribution {
	pub fn into_chars(self) -> Option<HeatMap<char>> {
		match self {
			Distribution::Chars(map) => Some(map),
			_ => None,
		}
	}

	pub fn into_lengths(self) -> Option<HeatMap<usize>> {
		match self {
			Distribution::Lengths(map) => Some(map),
			_ => None,
		}
	}

	pub fn into_endings(self) -> Option<HeatMap<String>> {
		match self {
			Distribution::Endings(map) => Some(map),
			_ => None,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			Distribution::Chars(map) => map.len(),
			Distribution::Lengths(map) => map.len(),
			Distribution::Endings(map) => map.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

/// Wraps a non-empty map, `None` otherwise.
fn non_empty<K: Ord + Clone>(map: &HeatMap<K>, wrap: fn(HeatMap<K>) -> Distribution) -> Option<Distribution> {
	(!map.is_empty()).then(|| wrap(map.clone()))
}
