use serde::{Deserialize, Serialize};

use crate::heatmap::HeatMap;
use super::{non_empty, Analyzer, Distribution};

/// Distribution of the first character of every word.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct InitialCharDistribution {
	first: HeatMap<char>,
}

impl InitialCharDistribution {
	pub fn new() -> Self {
		Self::default()
	}
}

impl Analyzer for InitialCharDistribution {
	fn analyze(&mut self, word: &str) {
		if let Some(c) = word.chars().next() {
			self.first.increment(c);
		}
	}

	fn next(&self, _context: &str, _prefix: &str) -> Option<Distribution> {
		non_empty(&self.first, Distribution::Chars)
	}

	fn clear(&mut self) {
		self.first.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn same_initial_gets_all_the_mass() {
		let mut analyzer = InitialCharDistribution::new();
		for word in ["cat", "car", "can"] {
			analyzer.analyze(word);
		}
		let map = analyzer.next("", "").and_then(Distribution::into_chars).unwrap();
		assert_eq!(map.keys(), &['c']);
		assert!((map.value(&'c') - 1.0).abs() < 1e-6);
	}

	#[test]
	fn untrained_has_nothing_to_say() {
		let mut analyzer = InitialCharDistribution::new();
		analyzer.analyze("");
		assert!(analyzer.next("", "").is_none());
	}
}
