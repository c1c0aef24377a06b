use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use super::heatlist::Heatlist;

/// A raw accumulator with the shape of a [`Heatlist`].
///
/// Cumulative sums, pairwise sums and scalar products land here. Nothing about
/// the total is guaranteed, so turning one back into a distribution goes
/// through [`Heatlist::make_from`] or [`Heatlist::bind_from`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UnboundHeatlist {
	values: Vec<f32>,
	samples: u32,
}

impl UnboundHeatlist {
	/// Creates a zeroed accumulator of `size` slots.
	///
	/// # Errors
	/// Returns `InvalidSize` if `size` is 0.
	pub fn new(size: usize) -> Result<Self> {
		if size == 0 {
			return Err(GarblerError::InvalidSize(size));
		}
		Ok(Self { values: vec![0.0; size], samples: 0 })
	}

	pub(crate) fn empty() -> Self {
		Self { values: Vec::new(), samples: 0 }
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn sample_count(&self) -> u32 {
		self.samples
	}

	pub fn values(&self) -> &[f32] {
		&self.values
	}

	pub fn value(&self, index: usize) -> Result<f32> {
		self.values
			.get(index)
			.copied()
			.ok_or(GarblerError::IndexOutOfRange { index, len: self.values.len() })
	}

	pub fn total(&self) -> f32 {
		self.values.iter().sum()
	}

	pub(crate) fn values_mut(&mut self) -> &mut [f32] {
		&mut self.values
	}

	pub(crate) fn insert_slot(&mut self, index: usize, value: f32) {
		self.values.insert(index, value);
	}

	pub(crate) fn add_samples(&mut self, samples: u32) {
		self.samples += samples;
	}

	/// Running sum of every slot of `source`.
	pub fn cumulative(source: &Heatlist) -> Result<Self> {
		Self::cumulative_range(source, 0, source.len())
	}

	/// Running sum of `count` slots of `source` starting at `start`.
	pub fn cumulative_range(source: &Heatlist, start: usize, count: usize) -> Result<Self> {
		let mut list = Self::extract(source, start, count)?;
		let mut sum = 0.0;
		for value in list.values.iter_mut() {
			sum += *value;
			*value = sum;
		}
		Ok(list)
	}

	/// Copies `count` slots of `source` starting at `start`.
	pub fn extract(source: &Heatlist, start: usize, count: usize) -> Result<Self> {
		let len = source.len();
		if start >= len || start + count > len {
			return Err(GarblerError::IndexOutOfRange { index: start + count, len });
		}
		let mut list = Self::new(count)?;
		list.values.copy_from_slice(&source.values()[start..start + count]);
		list.samples = source.sample_count();
		Ok(list)
	}

	/// Slot-wise sum of two lists of the same length.
	pub fn sum(a: &Heatlist, b: &Heatlist) -> Result<Self> {
		if a.len() != b.len() {
			return Err(GarblerError::SizeMismatch { left: a.len(), right: b.len() });
		}
		Ok(Self {
			values: a.values().iter().zip(b.values()).map(|(x, y)| x + y).collect(),
			samples: a.sample_count() + b.sample_count(),
		})
	}

	/// Every slot of `a` scaled by `factor`.
	pub fn product(a: &Heatlist, factor: f32) -> Self {
		Self {
			values: a.values().iter().map(|v| v * factor).collect(),
			samples: (a.sample_count() as f32 * factor).max(0.0) as u32,
		}
	}
}

impl fmt::Display for UnboundHeatlist {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<")?;
		for (i, value) in self.values.iter().enumerate() {
			if i > 0 {
				write!(f, ",")?;
			}
			write!(f, "{value}")?;
		}
		write!(f, ">")
	}
}
