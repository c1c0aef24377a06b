use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::heatmap::HeatMap;
use crate::library::DELIMITER;
use super::{non_empty, Analyzer, Distribution};

/// Word length distribution conditioned on the first character.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WordLengthCorrelation {
	lengths: HashMap<char, HeatMap<usize>>,
}

impl WordLengthCorrelation {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Analyzer for WordLengthCorrelation {
	fn analyze(&mut self, word: &str) {
		let mut chars = word.chars();
		let Some(first) = chars.next() else {
			return;
		};
		let length = 1 + chars.count();
		self.lengths.entry(first).or_default().increment(length);
	}

	/// Lengths of the words sharing the first character of `prefix`.
	fn next(&self, _context: &str, prefix: &str) -> Option<Distribution> {
		let first = prefix.chars().next()?;
		non_empty(self.lengths.get(&first)?, Distribution::Lengths)
	}

	fn clear(&mut self) {
		self.lengths.clear();
	}
}

/// Plain word length distribution.
///
/// Used when the first character of a word was never seen at the start of a
/// training word.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct WordLengthDistribution {
	lengths: HeatMap<usize>,
}

impl WordLengthDistribution {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Analyzer for WordLengthDistribution {
	fn analyze(&mut self, word: &str) {
		let length = word.chars().count();
		if length > 0 {
			self.lengths.increment(length);
		}
	}

	fn next(&self, _context: &str, _prefix: &str) -> Option<Distribution> {
		non_empty(&self.lengths, Distribution::Lengths)
	}

	fn clear(&mut self) {
		self.lengths.clear();
	}
}

/// Length of the next word given the length of the previous one.
///
/// Words are chained in the order they are analyzed, across calls. At query
/// time the previous word is the last word of the context, split on the
/// default delimiter.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct SequentialWordLength {
	lengths: BTreeMap<usize, HeatMap<usize>>,
	previous: Option<usize>,
}

impl SequentialWordLength {
	pub fn new() -> Self {
		Self::default()
	}

	/// Lengths seen right after a word of `length` characters.
	pub fn after(&self, length: usize) -> Option<&HeatMap<usize>> {
		self.lengths.get(&length)
	}
}

impl Analyzer for SequentialWordLength {
	fn analyze(&mut self, word: &str) {
		let length = word.chars().count();
		if length == 0 {
			return;
		}
		if let Some(previous) = self.previous {
			self.lengths.entry(previous).or_default().increment(length);
		}
		self.previous = Some(length);
	}

	fn next(&self, context: &str, _prefix: &str) -> Option<Distribution> {
		let last = DELIMITER.split(context).filter(|w| !w.is_empty()).last()?;
		non_empty(self.after(last.chars().count())?, Distribution::Lengths)
	}

	fn clear(&mut self) {
		self.lengths.clear();
		self.previous = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn lengths_follow_first_char() {
		let mut analyzer = WordLengthCorrelation::new();
		for word in ["cat", "crane", "dog", "déjà"] {
			analyzer.analyze(word);
		}

		let c = analyzer.next("", "c").and_then(Distribution::into_lengths).unwrap();
		assert_eq!(c.keys(), &[3, 5]);
		assert!((c.value(&3) - 0.5).abs() < 1e-6);

		let d = analyzer.next("", "dx").and_then(Distribution::into_lengths).unwrap();
		assert_eq!(d.keys(), &[3, 4]);

		assert!(analyzer.next("", "z").is_none());
		assert!(analyzer.next("", "").is_none());
	}

	#[test]
	fn distribution_ignores_prefix() {
		let mut analyzer = WordLengthDistribution::new();
		for word in ["a", "bb", "cc", ""] {
			analyzer.analyze(word);
		}
		let map = analyzer.next("", "").and_then(Distribution::into_lengths).unwrap();
		assert!((map.value(&2) - 2.0 / 3.0).abs() < 1e-6);
		analyzer.clear();
		assert!(analyzer.next("", "").is_none());
	}

	#[test]
	fn lengths_follow_the_previous_word() {
		let mut analyzer = SequentialWordLength::new();
		for word in ["a", "bcd", "ef", "ghi", "j", ""] {
			analyzer.analyze(word);
		}
		// 1 -> 3, 3 -> 2, 2 -> 3, 3 -> 1
		let after_one = analyzer.after(1).unwrap();
		assert_eq!(after_one.keys(), &[3]);
		assert_eq!(after_one.sample_count(), 1);

		let map = analyzer.next("xx yyy", "q").and_then(Distribution::into_lengths).unwrap();
		assert_eq!(map.keys(), &[1, 2]);
		assert!((map.value(&2) - 0.5).abs() < 1e-6);

		assert!(analyzer.next("", "q").is_none());
		assert!(analyzer.next("xxxxxxx", "").is_none());
	}

	#[test]
	fn chain_restarts_after_clear() {
		let mut analyzer = SequentialWordLength::new();
		analyzer.analyze("ab");
		analyzer.clear();
		analyzer.analyze("abc");
		assert!(analyzer.after(2).is_none());
		analyzer.analyze("d");
		assert_eq!(analyzer.after(3).unwrap().keys(), &[1]);
		// trailing separators in the context are skipped
		assert!(analyzer.next("xy, abc  ", "").is_some());
	}
}
