use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GarblerError, Result};
use super::heatlist::Heatlist;
use super::unbound_map::UnboundHeatMap;

/// Read access shared by every keyed histogram: sorted keys and the weight of
/// each key at the same index.
///
/// The merge combinators of [`crate::analysis`] accept anything implementing
/// it, bounded or not.
pub trait Weights<K> {
	/// Keys in strictly ascending order.
	fn keys(&self) -> &[K];
	/// Weight of `keys()[i]` at index `i`.
	fn weights(&self) -> &[f32];
	/// Number of samples behind the weights.
	fn sample_count(&self) -> u32;
}

/// A normalized histogram over arbitrary ordered keys.
///
/// Keys are kept sorted in a `Vec`, so a lookup is a binary search and the
/// index it lands on addresses the backing [`Heatlist`] directly.
///
/// ## Invariants
/// - `keys` is strictly ascending
/// - `keys.len() == values.len()`
/// - A key that is not stored reads as 0
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HeatMap<K> {
	keys: Vec<K>,
	values: Heatlist,
}

impl<K: Ord + Clone> HeatMap<K> {
	pub fn new() -> Self {
		Self { keys: Vec::new(), values: Heatlist::empty() }
	}

	pub(crate) fn from_parts(keys: Vec<K>, values: Heatlist) -> Self {
		debug_assert_eq!(keys.len(), values.len());
		Self { keys, values }
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub fn sample_count(&self) -> u32 {
		self.values.sample_count()
	}

	pub fn total(&self) -> f32 {
		self.values.total()
	}

	pub fn is_normalized(&self) -> bool {
		self.values.is_normalized()
	}

	pub fn normalize_all(&mut self) {
		self.values.normalize();
	}

	pub fn verify_normalization(&mut self) -> bool {
		self.values.verify_normalization()
	}

	/// Read-only view of the backing list.
	pub fn heatlist(&self) -> &Heatlist {
		&self.values
	}

	/// First index whose key is not less than `key` (its insertion point).
	pub fn position_of(&self, key: &K) -> usize {
		self.keys.partition_point(|k| k < key)
	}

	fn index_of(&self, key: &K) -> Option<usize> {
		let index = self.position_of(key);
		(index < self.keys.len() && self.keys[index] == *key).then_some(index)
	}

	/// Inserts `key` with a weight of 0 if it is absent.
	///
	/// No weighted update happens, every other weight keeps its value.
	/// Returns `true` if the key was inserted.
	pub fn touch(&mut self, key: K) -> bool {
		let index = self.position_of(&key);
		if index < self.keys.len() && self.keys[index] == key {
			return false;
		}
		self.insert_at(index, key);
		true
	}

	fn insert_at(&mut self, index: usize, key: K) {
		// index <= len by construction of position_of
		self.keys.insert(index, key);
		self.values.insert_slot(index);
	}

	/// Records one sample of `key` and returns its new weight.
	pub fn increment(&mut self, key: K) -> f32 {
		let index = match self.index_of(&key) {
			Some(index) => index,
			None => {
				let index = self.position_of(&key);
				self.insert_at(index, key);
				index
			}
		};
		self.values.apply_weight(index, 1)
	}

	/// Records `amount` samples of `key` and returns its new weight.
	///
	/// # Errors
	/// Returns `InvalidAmount` if `amount` is 0; the map is left untouched.
	pub fn increment_by(&mut self, key: K, amount: u32) -> Result<f32> {
		if amount == 0 {
			return Err(GarblerError::InvalidAmount);
		}
		self.touch(key.clone());
		let index = self.position_of(&key);
		Ok(self.values.apply_weight(index, amount))
	}

	/// Records one sample of `key` only if the key is already stored.
	pub fn increment_if_exists(&mut self, key: &K) -> Option<f32> {
		let index = self.index_of(key)?;
		Some(self.values.apply_weight(index, 1))
	}

	/// Removes `key` and spreads its weight over the remaining keys.
	pub fn remove_key(&mut self, key: &K) -> bool {
		match self.index_of(key) {
			Some(index) => {
				self.keys.remove(index);
				self.values.delete_slot(index).is_ok()
			}
			None => false,
		}
	}

	/// Removes `key` without redistributing its weight; the map becomes dirty.
	pub fn remove_key_unsafe(&mut self, key: &K) -> bool {
		match self.index_of(key) {
			Some(index) => {
				self.keys.remove(index);
				self.values.delete_slot_unsafe(index).is_ok()
			}
			None => false,
		}
	}

	pub fn contains(&self, key: &K) -> bool {
		self.index_of(key).is_some()
	}

	/// Weight of `key`, 0 when the key is unknown.
	pub fn value(&self, key: &K) -> f32 {
		self.index_of(key)
			.and_then(|index| self.values.value(index).ok())
			.unwrap_or(0.0)
	}

	pub fn key_at(&self, index: usize) -> Option<&K> {
		self.keys.get(index)
	}

	pub fn value_at(&self, index: usize) -> Option<f32> {
		self.values.values().get(index).copied()
	}

	pub fn keys(&self) -> &[K] {
		&self.keys
	}

	pub fn weights(&self) -> &[f32] {
		self.values.values()
	}

	pub fn entries(&self) -> impl Iterator<Item = (&K, f32)> {
		self.keys.iter().zip(self.values.values().iter().copied())
	}

	/// Running sum of the weights in key order.
	pub fn cumulative(&self) -> UnboundHeatMap<K> {
		crate::analysis::cumulative(self)
	}

	pub fn clear(&mut self) {
		self.keys.clear();
		self.values = Heatlist::empty();
	}
}

impl<K: Ord + Clone> Default for HeatMap<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K> Weights<K> for HeatMap<K> {
	fn keys(&self) -> &[K] {
		&self.keys
	}

	fn weights(&self) -> &[f32] {
		self.values.values()
	}

	fn sample_count(&self) -> u32 {
		self.values.sample_count()
	}
}

impl<K: fmt::Display> fmt::Display for HeatMap<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let (open, close) = if self.values.is_normalized() { ('{', '}') } else { ('<', '>') };
		write!(f, "{open}")?;
		for (i, (key, value)) in self.keys.iter().zip(self.values.values()).enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{key}={value}")?;
		}
		write!(f, "{close}")
	}
}
