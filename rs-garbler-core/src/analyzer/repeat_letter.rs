use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use crate::heatmap::HeatMap;
use super::{Analyzer, Distribution};

/// Which letters tend to repeat, and how many times in a row.
///
/// Bucket `i` counts the runs of length `i + 2`; the last bucket absorbs every
/// longer run.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RepeatLetter {
	max_run: usize,
	buckets: Vec<HeatMap<char>>,
}

impl RepeatLetter {
	pub const DEFAULT_MAX_RUN: usize = 3;

	pub fn new(max_run: usize) -> Result<Self> {
		if max_run == 0 {
			return Err(GarblerError::InvalidConfiguration("repetition buckets must be positive".into()));
		}
		Ok(Self {
			max_run,
			buckets: vec![HeatMap::new(); max_run],
		})
	}

	/// Histogram of the runs of `run_length` letters, `None` under two.
	pub fn bucket(&self, run_length: usize) -> Option<&HeatMap<char>> {
		if run_length < 2 {
			return None;
		}
		self.buckets.get((run_length - 1).min(self.max_run) - 1)
	}

	fn record(&mut self, c: char, run_length: usize) {
		if run_length >= 2 {
			let index = (run_length - 1).min(self.max_run) - 1;
			self.buckets[index].increment(c);
		}
	}
}

impl Default for RepeatLetter {
	fn default() -> Self {
		Self {
			max_run: Self::DEFAULT_MAX_RUN,
			buckets: vec![HeatMap::new(); Self::DEFAULT_MAX_RUN],
		}
	}
}

impl Analyzer for RepeatLetter {
	fn analyze(&mut self, word: &str) {
		let mut chars = word.chars();
		let Some(mut current) = chars.next() else {
			return;
		};
		let mut run = 1;
		for c in chars {
			if c == current {
				run += 1;
			} else {
				self.record(current, run);
				current = c;
				run = 1;
			}
		}
		self.record(current, run);
	}

	/// Runs one letter longer than the one ending `prefix`.
	fn next(&self, _context: &str, prefix: &str) -> Option<Distribution> {
		let last = prefix.chars().last()?;
		let run = prefix.chars().rev().take_while(|c| *c == last).count();
		let bucket = self.bucket(run + 1)?;
		(!bucket.is_empty()).then(|| Distribution::Chars(bucket.clone()))
	}

	fn clear(&mut self) {
		for bucket in &mut self.buckets {
			bucket.clear();
		}
	}
}
