use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use crate::heatmap::HeatMap;
use super::{Analyzer, Distribution};

/// Learns the endings shared by the words of the corpus.
///
/// Endings are stored reversed, bucketed by the character that precedes them
/// in the word. When a new ending overlaps already stored ones on at least
/// `min_radius` characters, all of them are cut back to their common tail and
/// re-bucketed under the character preceding that tail, so that buckets
/// converge toward the suffixes the corpus really shares.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CommonEnding {
	min_radius: usize,
	max_radius: usize,
	endings: BTreeMap<char, Vec<String>>,
}

impl CommonEnding {
	pub const DEFAULT_MIN_RADIUS: usize = 2;
	pub const DEFAULT_MAX_RADIUS: usize = 3;

	/// Fails unless `0 < min_radius <= max_radius`.
	pub fn new(min_radius: usize, max_radius: usize) -> Result<Self> {
		if min_radius == 0 || min_radius > max_radius {
			return Err(GarblerError::InvalidConfiguration(format!(
				"ending radii must satisfy 0 < min <= max, got {min_radius} and {max_radius}"
			)));
		}
		Ok(Self {
			min_radius,
			max_radius,
			endings: BTreeMap::new(),
		})
	}

	/// Endings currently stored under `c`, in reading order.
	pub fn endings_for(&self, c: char) -> Vec<String> {
		self.endings
			.get(&c)
			.map(|list| list.iter().map(|s| s.chars().rev().collect()).collect())
			.unwrap_or_default()
	}

	fn store(&mut self, key: char, reversed: String) {
		let list = self.endings.entry(key).or_default();
		if !list.contains(&reversed) {
			list.push(reversed);
		}
	}

	fn discard(&mut self, key: char, reversed: &str) {
		if let Some(list) = self.endings.get_mut(&key) {
			list.retain(|s| s != reversed);
			if list.is_empty() {
				self.endings.remove(&key);
			}
		}
	}
}

impl Default for CommonEnding {
	fn default() -> Self {
		Self {
			min_radius: Self::DEFAULT_MIN_RADIUS,
			max_radius: Self::DEFAULT_MAX_RADIUS,
			endings: BTreeMap::new(),
		}
	}
}

fn common_prefix_len(a: &str, b: &[char]) -> usize {
	a.chars().zip(b).take_while(|(x, y)| x == *y).count()
}

impl Analyzer for CommonEnding {
	/// Words of `min_radius` characters or less are skipped.
	fn analyze(&mut self, word: &str) {
		let chars: Vec<char> = word.chars().collect();
		let len = chars.len();
		if len <= self.min_radius {
			return;
		}

		// the ending never swallows the first character
		let ending_len = if len <= self.max_radius { len - 1 } else { self.max_radius };
		let key = chars[len - ending_len - 1];
		let reversed: Vec<char> = chars[len - ending_len..].iter().rev().copied().collect();
		let head = &reversed[..self.min_radius];

		let related: Vec<(char, String)> = self
			.endings
			.iter()
			.flat_map(|(k, list)| {
				list.iter()
					.filter(move |s| common_prefix_len(s, head) == head.len())
					.map(move |s| (*k, s.clone()))
			})
			.collect();

		let common = related
			.iter()
			.map(|(_, s)| common_prefix_len(s, &reversed))
			.min()
			.unwrap_or(reversed.len());
		if common == reversed.len() {
			self.store(key, reversed.into_iter().collect());
			return;
		}

		let shared: String = reversed[..common].iter().collect();
		self.store(reversed[common], shared.clone());
		for (k, s) in related {
			if s == shared {
				continue;
			}
			self.discard(k, &s);
			if let Some(next) = s.chars().nth(common) {
				self.store(next, shared.clone());
			}
		}
	}

	/// Endings stored under the last character of `prefix`.
	fn next(&self, _context: &str, prefix: &str) -> Option<Distribution> {
		let last = prefix.chars().last()?;
		let list = self.endings.get(&last)?;
		let mut map = HeatMap::new();
		for reversed in list {
			map.increment(reversed.chars().rev().collect::<String>());
		}
		Some(Distribution::Endings(map))
	}

	fn clear(&mut self) {
		self.endings.clear();
	}
}
