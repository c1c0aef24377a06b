use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use crate::heatmap::HeatMap;
use super::{non_empty, Analyzer, Distribution};

/// Distance to the end of the word for every character occurrence.
///
/// Distances are clamped to `radius`, so the last bucket gathers every
/// occurrence far from the end. Key `0` of a character's distribution is the
/// probability that the word stops right after that character.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CharEndPosition {
	radius: usize,
	positions: HashMap<char, HeatMap<usize>>,
}

impl CharEndPosition {
	pub const DEFAULT_RADIUS: usize = 1;

	pub fn new(radius: usize) -> Result<Self> {
		if radius == 0 {
			return Err(GarblerError::InvalidConfiguration("end position radius must be positive".into()));
		}
		Ok(Self {
			radius,
			positions: HashMap::new(),
		})
	}

	/// Probability that a word ends right after `c`.
	pub fn end_probability(&self, c: char) -> f32 {
		self.positions.get(&c).map_or(0.0, |map| map.value(&0))
	}
}

impl Default for CharEndPosition {
	fn default() -> Self {
		Self {
			radius: Self::DEFAULT_RADIUS,
			positions: HashMap::new(),
		}
	}
}

impl Analyzer for CharEndPosition {
	fn analyze(&mut self, word: &str) {
		for (distance, c) in word.chars().rev().enumerate() {
			self.positions.entry(c).or_default().increment(distance.min(self.radius));
		}
	}

	/// End distances recorded for the last character of `prefix`.
	fn next(&self, _context: &str, prefix: &str) -> Option<Distribution> {
		let last = prefix.chars().last()?;
		non_empty(self.positions.get(&last)?, Distribution::Lengths)
	}

	fn clear(&mut self) {
		self.positions.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn zero_radius_is_rejected() {
		assert!(CharEndPosition::new(0).is_err());
	}

	#[test]
	fn end_probability_per_char() {
		let mut analyzer = CharEndPosition::default();
		analyzer.analyze("as");
		analyzer.analyze("sa");
		analyzer.analyze("ass");

		// 's': end, next-to-end, then both in "ass"
		assert!((analyzer.end_probability('s') - 0.5).abs() < 1e-6);
		// 'a': next-to-end, end, then clamped to the radius in "ass"
		assert!((analyzer.end_probability('a') - 1.0 / 3.0).abs() < 1e-6);
		assert_eq!(analyzer.end_probability('z'), 0.0);

		let map = analyzer.next("", "mas").and_then(Distribution::into_lengths).unwrap();
		assert_eq!(map.keys(), &[0, 1]);
	}

	#[test]
	fn wider_radius_reaches_further() {
		let mut analyzer = CharEndPosition::new(2).unwrap();
		analyzer.analyze("abc");
		let map = analyzer.next("", "a").and_then(Distribution::into_lengths).unwrap();
		assert_eq!(map.keys(), &[2]);
		analyzer.clear();
		assert!(analyzer.next("", "a").is_none());
	}
}
