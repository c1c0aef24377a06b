use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::analysis::{power_series, DecaySchedule, SQRT_HALF};
use crate::error::{GarblerError, Result};
use crate::heatmap::HeatMap;
use super::{Analyzer, Distribution};

/// How strongly each letter pulls the letters that follow it.
///
/// For every character `c` and distance `d` in `1..=radius`, records which
/// characters appear `d` positions after `c`. Queries merge the histograms of
/// the last `radius` characters of the prefix, the nearest ones weighing the
/// most.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct LetterInfluence {
	radius: usize,
	influence: f32,
	schedule: DecaySchedule,
	followers: HashMap<char, Vec<HeatMap<char>>>,
}

impl LetterInfluence {
	pub const DEFAULT_RADIUS: usize = 3;

	/// Fails when `radius` is zero or `influence` is outside `(0, 1]`.
	pub fn new(radius: usize, influence: f32) -> Result<Self> {
		Self::with_schedule(radius, influence, DecaySchedule::default())
	}

	pub fn with_schedule(radius: usize, influence: f32, schedule: DecaySchedule) -> Result<Self> {
		if radius == 0 {
			return Err(GarblerError::InvalidConfiguration("letter influence radius must be positive".into()));
		}
		if !influence.is_finite() || influence <= 0.0 || influence > 1.0 {
			return Err(GarblerError::InvalidConfiguration(format!(
				"letter influence must be in (0, 1], got {influence}"
			)));
		}
		Ok(Self {
			radius,
			influence,
			schedule,
			followers: HashMap::new(),
		})
	}

	pub fn radius(&self) -> usize {
		self.radius
	}

	pub fn influence(&self) -> f32 {
		self.influence
	}

	/// Characters seen `distance` positions after `c` (`distance` starts at 1).
	pub fn followers(&self, c: char, distance: usize) -> Option<&HeatMap<char>> {
		self.followers.get(&c)?.get(distance.checked_sub(1)?)
	}
}

impl Default for LetterInfluence {
	fn default() -> Self {
		Self {
			radius: Self::DEFAULT_RADIUS,
			influence: SQRT_HALF,
			schedule: DecaySchedule::default(),
			followers: HashMap::new(),
		}
	}
}

impl Analyzer for LetterInfluence {
	/// Words of two characters or less are skipped.
	fn analyze(&mut self, word: &str) {
		let chars: Vec<char> = word.chars().collect();
		let len = chars.len();
		if len <= 2 {
			return;
		}

		for i in 0..len - 1 {
			let reach = (len - i - 1).min(self.radius);
			let maps = self.followers.entry(chars[i]).or_default();
			if maps.len() < reach {
				maps.resize_with(reach, HeatMap::new);
			}
			for (d, map) in maps.iter_mut().take(reach).enumerate() {
				map.increment(chars[i + d + 1]);
			}
		}
	}

	fn next(&self, _context: &str, prefix: &str) -> Option<Distribution> {
		let chars: Vec<char> = prefix.chars().collect();
		let span = chars.len().min(self.radius);
		let sources: Vec<Option<&HeatMap<char>>> = chars
			.iter()
			.rev()
			.take(span)
			.enumerate()
			.map(|(d, c)| self.followers(*c, d + 1))
			.collect();
		if sources.iter().all(Option::is_none) {
			return None;
		}

		let merged = power_series(&sources, self.influence, self.schedule);
		(!merged.is_empty()).then(|| Distribution::Chars(merged.bind()))
	}

	fn clear(&mut self) {
		self.followers.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rejects_bad_parameters() {
		assert!(matches!(LetterInfluence::new(0, 0.5), Err(GarblerError::InvalidConfiguration(_))));
		assert!(LetterInfluence::new(3, 0.0).is_err());
		assert!(LetterInfluence::new(3, 1.5).is_err());
		assert!(LetterInfluence::new(3, f32::NAN).is_err());
		assert!(LetterInfluence::new(3, 1.0).is_ok());
	}

	#[test]
	fn short_words_are_skipped() {
		let mut analyzer = LetterInfluence::default();
		analyzer.analyze("ab");
		assert!(analyzer.next("", "a").is_none());
	}

	#[test]
	fn records_followers_by_distance() {
		let mut analyzer = LetterInfluence::new(2, 0.5).unwrap();
		analyzer.analyze("abc");
		assert_eq!(analyzer.followers('a', 1).unwrap().keys(), &['b']);
		assert_eq!(analyzer.followers('a', 2).unwrap().keys(), &['c']);
		assert_eq!(analyzer.followers('b', 1).unwrap().keys(), &['c']);
		assert!(analyzer.followers('b', 2).is_none());
		assert!(analyzer.followers('c', 1).is_none());
		assert!(analyzer.followers('a', 0).is_none());
	}

	#[test]
	fn nearest_letter_weighs_most() {
		let mut analyzer = LetterInfluence::new(2, 0.5).unwrap();
		analyzer.analyze("xay");
		analyzer.analyze("abz");

		// 'b' at distance 1 says z, 'a' at distance 2 says z: all agree.
		let map = analyzer.next("", "ab").and_then(Distribution::into_chars).unwrap();
		assert_eq!(map.keys(), &['z']);

		// 'a' at distance 1 says {y, b}, 'x' at distance 2 says y.
		let map = analyzer.next("", "xa").and_then(Distribution::into_chars).unwrap();
		assert!(map.value(&'y') > map.value(&'b'));
		assert!((map.total() - 1.0).abs() < 1e-5);
	}

	#[test]
	fn weaker_influence_favors_the_nearest_letter() {
		use crate::analysis::SQRT_THIRD;

		let b_share = |influence: f32| {
			let mut analyzer = LetterInfluence::new(2, influence).unwrap();
			analyzer.analyze("xay");
			analyzer.analyze("abz");
			let map = analyzer.next("", "xa").and_then(Distribution::into_chars).unwrap();
			map.value(&'b')
		};

		// 'b' only comes from the nearest letter: 0.5 * k / (k + k^2)
		assert!((b_share(SQRT_THIRD) - 0.5 / (1.0 + SQRT_THIRD)).abs() < 1e-5);
		assert!(b_share(SQRT_THIRD) > b_share(SQRT_HALF));
	}

	#[test]
	fn unknown_prefix_gives_nothing() {
		let mut analyzer = LetterInfluence::default();
		analyzer.analyze("garbler");
		assert!(analyzer.next("", "").is_none());
		assert!(analyzer.next("", "qq").is_none());
		analyzer.clear();
		assert!(analyzer.next("", "g").is_none());
	}
}
