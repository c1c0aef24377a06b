use std::fmt;

use serde::{Deserialize, Serialize};

use super::heatlist::Heatlist;
use super::map::{HeatMap, Weights};
use super::unbound::UnboundHeatlist;

/// Keyed raw accumulator produced by the merge combinators.
///
/// Unlike [`HeatMap`], values are written directly and may sum to anything.
/// [`UnboundHeatMap::bind`] turns it into a distribution.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UnboundHeatMap<K> {
	keys: Vec<K>,
	values: UnboundHeatlist,
}

impl<K: Ord + Clone> UnboundHeatMap<K> {
	pub fn new() -> Self {
		Self { keys: Vec::new(), values: UnboundHeatlist::empty() }
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub fn keys(&self) -> &[K] {
		&self.keys
	}

	pub fn weights(&self) -> &[f32] {
		self.values.values()
	}

	pub fn total(&self) -> f32 {
		self.values.total()
	}

	pub fn sample_count(&self) -> u32 {
		self.values.sample_count()
	}

	pub fn entries(&self) -> impl Iterator<Item = (&K, f32)> {
		self.keys.iter().zip(self.values.values().iter().copied())
	}

	fn slot(&mut self, key: &K) -> usize {
		let index = self.keys.partition_point(|k| k < key);
		if index >= self.keys.len() || self.keys[index] != *key {
			self.keys.insert(index, key.clone());
			self.values.insert_slot(index, 0.0);
		}
		index
	}

	/// Value of `key`, 0 when absent.
	pub fn value(&self, key: &K) -> f32 {
		let index = self.keys.partition_point(|k| k < key);
		match self.keys.get(index) {
			Some(k) if k == key => self.values.values()[index],
			_ => 0.0,
		}
	}

	/// Adds `amount` to the value of `key`, inserting the key if needed.
	pub fn add(&mut self, key: &K, amount: f32) {
		let index = self.slot(key);
		self.values.values_mut()[index] += amount;
	}

	/// Overwrites the value of `key`, inserting the key if needed.
	pub fn set(&mut self, key: &K, value: f32) {
		let index = self.slot(key);
		self.values.values_mut()[index] = value;
	}

	/// Multiplies every value by `factor`.
	pub fn scale(&mut self, factor: f32) {
		for value in self.values.values_mut() {
			*value *= factor;
		}
	}

	pub(crate) fn add_samples(&mut self, samples: u32) {
		self.values.add_samples(samples);
	}

	/// Normalizes the accumulated values into a [`HeatMap`].
	///
	/// A zero total keeps every key with a weight of 0.
	pub fn bind(self) -> HeatMap<K> {
		HeatMap::from_parts(self.keys, Heatlist::bind_from(&self.values))
	}
}

impl<K: Ord + Clone> Default for UnboundHeatMap<K> {
	fn default() -> Self {
		Self::new()
	}
}

impl<K> Weights<K> for UnboundHeatMap<K> {
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

impl<K: fmt::Display> fmt::Display for UnboundHeatMap<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<")?;
		for (i, (key, value)) in self.keys.iter().zip(self.values.values()).enumerate() {
			if i > 0 {
				write!(f, ", ")?;
			}
			write!(f, "{key}={value}")?;
		}
		write!(f, ">")
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn add_accumulates_per_key() {
		let mut map = UnboundHeatMap::new();
		map.add(&'b', 0.5);
		map.add(&'a', 1.0);
		map.add(&'b', 0.5);
		assert_eq!(map.keys(), &['a', 'b']);
		assert_eq!(map.value(&'b'), 1.0);
		assert_eq!(map.total(), 2.0);
	}

	#[test]
	fn bind_normalizes() {
		let mut map = UnboundHeatMap::new();
		map.set(&1usize, 3.0);
		map.set(&2usize, 1.0);
		let bound = map.bind();
		assert!(bound.is_normalized());
		assert!((bound.value(&1) - 0.75).abs() < 1e-6);
		assert!((bound.total() - 1.0).abs() < 1e-6);
	}
}
