use serde::{Deserialize, Serialize};

use crate::analysis::{DecaySchedule, SQRT_HALF};
use crate::analyzer::{
	names, Alphabet, Analyzer, CharEndPosition, CommonEnding, InitialCharDistribution, LetterInfluence,
	RepeatLetter, SequentialWordLength, WordLengthCorrelation, WordLengthDistribution,
};
use crate::error::Result;

/// Whether generated lines are fed back into the library.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SelfFeed {
	#[default]
	Disabled,
	Unlimited,
	/// Feeds back at most this many generated lines.
	Runs(u32),
}

impl SelfFeed {
	/// Whether a line may be fed back after `done` lines already were.
	pub fn allows(self, done: u32) -> bool {
		match self {
			SelfFeed::Disabled => false,
			SelfFeed::Unlimited => true,
			SelfFeed::Runs(limit) => done < limit,
		}
	}
}

/// Parameters of the default analyzer set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct LibraryConfig {
	/// How many preceding letters influence the next one.
	pub letter_radius: usize,
	/// Weight of the nearest letter, in `(0, 1]`.
	pub letter_influence: f32,
	pub decay: DecaySchedule,
	pub ending_min_radius: usize,
	/// Longest ending learned.
	pub ending_radius: usize,
	pub end_radius: usize,
	pub repeat_max_run: usize,
	pub self_feed: SelfFeed,
}

impl Default for LibraryConfig {
	fn default() -> Self {
		Self {
			letter_radius: LetterInfluence::DEFAULT_RADIUS,
			letter_influence: SQRT_HALF,
			decay: DecaySchedule::default(),
			ending_min_radius: CommonEnding::DEFAULT_MIN_RADIUS,
			ending_radius: CommonEnding::DEFAULT_MAX_RADIUS,
			end_radius: CharEndPosition::DEFAULT_RADIUS,
			repeat_max_run: RepeatLetter::DEFAULT_MAX_RUN,
			self_feed: SelfFeed::default(),
		}
	}
}

impl LibraryConfig {
	/// Fails with `InvalidConfiguration` when any analyzer would reject its parameters.
	pub fn validate(&self) -> Result<()> {
		self.build_analyzers().map(drop)
	}

	/// The default analyzer set, named with [`names`].
	pub(crate) fn build_analyzers(&self) -> Result<Vec<(&'static str, Box<dyn Analyzer>)>> {
		Ok(vec![
			entry(
				names::INFLUENCE,
				LetterInfluence::with_schedule(self.letter_radius, self.letter_influence, self.decay)?,
			),
			entry(names::COMMON_ENDINGS, CommonEnding::new(self.ending_min_radius, self.ending_radius)?),
			entry(names::CHAR_END, CharEndPosition::new(self.end_radius)?),
			entry(names::REPETITIONS, RepeatLetter::new(self.repeat_max_run)?),
			entry(names::CHAR_BEGIN, InitialCharDistribution::new()),
			entry(names::LENGTH_CORRELATION, WordLengthCorrelation::new()),
			entry(names::WORD_LENGTH, WordLengthDistribution::new()),
			entry(names::SEQUENTIAL_LENGTH, SequentialWordLength::new()),
			entry(names::ALPHABET, Alphabet::new()),
		])
	}
}

fn entry<A: Analyzer + 'static>(name: &'static str, analyzer: A) -> (&'static str, Box<dyn Analyzer>) {
	(name, Box::new(analyzer))
}
