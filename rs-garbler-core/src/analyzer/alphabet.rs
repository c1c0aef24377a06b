use serde::{Deserialize, Serialize};

use crate::heatmap::HeatMap;
use super::{non_empty, Analyzer, Distribution};

/// Frequency of every character of the corpus, regardless of position.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Alphabet {
	letters: HeatMap<char>,
}

impl Alphabet {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Analyzer for Alphabet {
	fn analyze(&mut self, word: &str) {
		for c in word.chars() {
			self.letters.increment(c);
		}
	}

	fn next(&self, _context: &str, _prefix: &str) -> Option<Distribution> {
		non_empty(&self.letters, Distribution::Chars)
	}

	fn clear(&mut self) {
		self.letters.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn counts_every_occurrence() {
		let mut analyzer = Alphabet::new();
		analyzer.analyze("abba");
		analyzer.analyze("c");
		let map = analyzer.next("", "xyz").and_then(Distribution::into_chars).unwrap();
		assert!((map.value(&'a') - 0.4).abs() < 1e-6);
		assert!((map.value(&'c') - 0.2).abs() < 1e-6);
		assert_eq!(map.sample_count(), 5);
	}
}
