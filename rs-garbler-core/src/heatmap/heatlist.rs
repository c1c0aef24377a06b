use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use super::unbound::UnboundHeatlist;

/// Allowed drift of a normalized total around 1.0.
pub const TOLERANCE: f32 = 1e-5;

/// Removed mass below this value does not affect normalization.
const NEGLIGIBLE: f32 = 1e-6;

/// A normalized histogram of `f32` weights over a dense index range.
///
/// Every weighted update rescales the existing weights so that the total stays
/// at 1.0 without ever re-reading previous samples:
///
/// ```text
/// samples' = samples + amount
/// w        = amount / samples'
/// values   = values * (1 - w)
/// values[index] += w
/// ```
///
/// ## Invariants
/// - While `normalized` is set, the total is either 0 (nothing sampled) or
///   within [`TOLERANCE`] of 1.0
/// - The length of a list built through [`Heatlist::new`] never changes
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Heatlist {
	/// Weight of every index.
	values: Vec<f32>,
	/// Number of samples folded into `values`.
	samples: u32,
	/// Cleared by operations that break the sum-to-one invariant.
	normalized: bool,
}

impl Heatlist {
	/// Creates a zeroed list of `size` slots.
	///
	/// # Errors
	/// Returns `InvalidSize` if `size` is 0.
	pub fn new(size: usize) -> Result<Self> {
		if size == 0 {
			return Err(GarblerError::InvalidSize(size));
		}
		Ok(Self { values: vec![0.0; size], samples: 0, normalized: true })
	}

	/// Zero-length list used as the growable backing store of a `HeatMap`.
	pub(crate) fn empty() -> Self {
		Self { values: Vec::new(), samples: 0, normalized: true }
	}

	pub fn sample_count(&self) -> u32 {
		self.samples
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	/// Returns `true` when the list has no slot at all.
	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	/// Returns `true` once at least one sample has been recorded.
	pub fn has_samples(&self) -> bool {
		self.samples > 0
	}

	pub fn values(&self) -> &[f32] {
		&self.values
	}

	/// Returns the weight stored at `index`.
	///
	/// # Errors
	/// Returns `IndexOutOfRange` if `index >= len`.
	pub fn value(&self, index: usize) -> Result<f32> {
		self.values
			.get(index)
			.copied()
			.ok_or(GarblerError::IndexOutOfRange { index, len: self.values.len() })
	}

	pub fn total(&self) -> f32 {
		self.values.iter().sum()
	}

	/// Sum of the weights in `range`.
	pub fn sum(&self, range: Range<usize>) -> Result<f32> {
		let len = self.values.len();
		if range.start > len || range.end > len {
			return Err(GarblerError::IndexOutOfRange { index: range.start.max(range.end), len });
		}
		Ok(self.values[range].iter().sum())
	}

	pub fn max(&self) -> Option<f32> {
		self.values.iter().copied().reduce(f32::max)
	}

	pub fn min(&self) -> Option<f32> {
		self.values.iter().copied().reduce(f32::min)
	}

	/// Records `amount` samples at `index` and returns the new weight there.
	///
	/// # Errors
	/// - `IndexOutOfRange` if `index >= len`
	/// - `InvalidAmount` if `amount` is 0
	pub fn increment(&mut self, index: usize, amount: u32) -> Result<f32> {
		if index >= self.values.len() {
			return Err(GarblerError::IndexOutOfRange { index, len: self.values.len() });
		}
		if amount == 0 {
			return Err(GarblerError::InvalidAmount);
		}

		Ok(self.apply_weight(index, amount))
	}

	/// Weighted update behind [`Heatlist::increment`]. `index` must be in
	/// range and `amount` non-zero.
	pub(crate) fn apply_weight(&mut self, index: usize, amount: u32) -> f32 {
		self.samples += amount;
		let weight = amount as f32 / self.samples as f32;
		let inverse = 1.0 - weight;
		for value in self.values.iter_mut() {
			*value *= inverse;
		}
		self.values[index] += weight;
		self.values[index]
	}

	/// Rescales every weight by `1 / total`. A zero total is left untouched.
	pub fn normalize(&mut self) {
		let total = self.total();
		if total > 0.0 {
			let factor = 1.0 / total;
			for value in self.values.iter_mut() {
				*value *= factor;
			}
		}
		self.normalized = true;
	}

	/// Sets every slot to `1 / len` and returns that value.
	pub fn equalize(&mut self) -> f32 {
		let value = 1.0 / self.values.len().max(1) as f32;
		self.values.fill(value);
		self.normalized = true;
		value
	}

	/// Zeroes the weights but keeps the sample count.
	///
	/// The next increment will not restore a total of 1.0, so the list is
	/// marked dirty.
	pub fn reset(&mut self) {
		self.values.fill(0.0);
		if self.samples > 0 {
			self.normalized = false;
		}
	}

	/// Zeroes the weights and forgets every sample.
	pub fn clear(&mut self) {
		self.values.fill(0.0);
		self.samples = 0;
		self.normalized = true;
	}

	pub fn is_normalized(&self) -> bool {
		self.normalized
	}

	pub fn mark_dirty(&mut self) {
		self.normalized = false;
	}

	/// Recomputes the normalization flag from the actual total.
	pub fn verify_normalization(&mut self) -> bool {
		let total = self.total();
		self.normalized = total == 0.0 || (total - 1.0).abs() <= TOLERANCE * self.values.len().max(1) as f32;
		self.normalized
	}

	/// Inserts a zero slot at `index`, shifting the following slots right.
	/// `index` must not exceed the current length.
	pub(crate) fn insert_slot(&mut self, index: usize) {
		self.values.insert(index, 0.0);
	}

	/// Removes the slot at `index` and spreads its weight over the remaining
	/// slots, proportionally to their current weight.
	pub(crate) fn delete_slot(&mut self, index: usize) -> Result<f32> {
		if index >= self.values.len() {
			return Err(GarblerError::IndexOutOfRange { index, len: self.values.len() });
		}
		let removed = self.values.remove(index);
		if removed >= NEGLIGIBLE {
			let remaining = self.total();
			if remaining > 0.0 {
				let factor = (remaining + removed) / remaining;
				for value in self.values.iter_mut() {
					*value *= factor;
				}
			} else {
				// All the mass was in the removed slot
				self.values.fill(0.0);
				self.samples = 0;
			}
		}
		Ok(removed)
	}

	/// Removes the slot at `index` without redistributing its weight.
	pub(crate) fn delete_slot_unsafe(&mut self, index: usize) -> Result<f32> {
		if index >= self.values.len() {
			return Err(GarblerError::IndexOutOfRange { index, len: self.values.len() });
		}
		let removed = self.values.remove(index);
		if removed >= NEGLIGIBLE {
			self.normalized = false;
		}
		Ok(removed)
	}

	/// Returns `t * b + (1 - t) * a` slot by slot, like [`crate::analysis::lerp`].
	///
	/// # Errors
	/// - `SizeMismatch` if the lists differ in length
	/// - `InvalidInterpolation` if `t` is outside `[0, 1]`
	pub fn interpolate(a: &Heatlist, b: &Heatlist, t: f32) -> Result<Heatlist> {
		if a.values.len() != b.values.len() {
			return Err(GarblerError::SizeMismatch { left: a.values.len(), right: b.values.len() });
		}
		if !(0.0..=1.0).contains(&t) {
			return Err(GarblerError::InvalidInterpolation(t));
		}

		let values = a.values
			.iter()
			.zip(&b.values)
			.map(|(va, vb)| vb * t + va * (1.0 - t))
			.collect();
		Ok(Heatlist {
			values,
			samples: a.samples + b.samples,
			normalized: a.normalized && b.normalized,
		})
	}

	pub fn average(a: &Heatlist, b: &Heatlist) -> Result<Heatlist> {
		Self::interpolate(a, b, 0.5)
	}

	/// Copies an unbound list that is already normalized.
	///
	/// # Errors
	/// Returns `NotNormalized` if the source total drifts from 1.0 by more than
	/// [`TOLERANCE`]. An unsampled source is accepted as is.
	pub fn make_from(source: &UnboundHeatlist) -> Result<Heatlist> {
		let mut list = Self::new(source.len())?;
		if source.sample_count() == 0 {
			return Ok(list);
		}
		let total = source.total();
		if !(1.0 - TOLERANCE..1.0 + TOLERANCE).contains(&total) {
			return Err(GarblerError::NotNormalized(total));
		}
		list.values.copy_from_slice(source.values());
		list.samples = source.sample_count();
		Ok(list)
	}

	/// Same as [`Heatlist::make_from`] but returns `None` instead of an error.
	pub fn try_make_from(source: &UnboundHeatlist) -> Option<Heatlist> {
		Self::make_from(source).ok()
	}

	/// Builds a normalized copy of any unbound list.
	pub fn bind_from(source: &UnboundHeatlist) -> Heatlist {
		let mut list = Heatlist {
			values: source.values().to_vec(),
			samples: source.sample_count(),
			normalized: true,
		};
		list.normalize();
		list
	}
}

impl fmt::Display for Heatlist {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (open, close) = if self.normalized { ('{', '}') } else { ('<', '>') };
		write!(f, "{open}")?;
		for (i, value) in self.values.iter().enumerate() {
			if i > 0 {
				write!(f, ",")?;
			}
			write!(f, "{value}")?;
		}
		write!(f, "{close}")
	}
}
