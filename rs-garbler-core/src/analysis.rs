//! Stateless combinators over keyed histograms.
//!
//! Every function reads through the [`Weights`] trait and returns a freshly
//! allocated [`UnboundHeatMap`]; callers bind the result when they need a
//! distribution. Sampling helpers return `None` on empty input, which callers
//! treat as "nothing to contribute" rather than as an error.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::heatmap::{UnboundHeatMap, Weights};

/// sqrt(1/2), the default letter influence.
pub const SQRT_HALF: f32 = 0.707_106_78;

/// sqrt(1/3).
pub const SQRT_THIRD: f32 = 0.547_722_56;

/// How the weight of successive histograms decays in [`power_series`].
///
/// `Geometric` weighs distance `d` with `k^d`. `Squared` squares the weight at
/// every step (`k, k^2, k^4, ...`), which reproduces the output of an older
/// merge routine and is kept for comparisons against reference output.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecaySchedule {
	#[default]
	Geometric,
	Squared,
}

impl DecaySchedule {
	fn next(self, current: f32, k: f32) -> f32 {
		match self {
			DecaySchedule::Geometric => current * k,
			DecaySchedule::Squared => current * current,
		}
	}
}

fn entries<'a, K, W: Weights<K>>(map: &'a W) -> impl Iterator<Item = (&'a K, f32)>
where
	K: 'a,
{
	map.keys().iter().zip(map.weights().iter().copied())
}

/// Returns `t * b + (1 - t) * a` key by key over the union of both key sets.
///
/// `t` is clamped to `[0, 1]`.
pub fn lerp<K, A, B>(a: &A, b: &B, t: f32) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	A: Weights<K>,
	B: Weights<K>,
{
	let t = t.clamp(0.0, 1.0);
	let mut result = UnboundHeatMap::new();
	for (key, value) in entries(b) {
		result.add(key, value * t);
	}
	for (key, value) in entries(a) {
		result.add(key, value * (1.0 - t));
	}
	result.add_samples(a.sample_count() + b.sample_count());
	result
}

pub fn average<K, A, B>(a: &A, b: &B) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	A: Weights<K>,
	B: Weights<K>,
{
	lerp(a, b, 0.5)
}

/// Mean of every present map; missing entries are ignored.
pub fn average_all<K, W>(maps: &[Option<&W>]) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	let present = maps.iter().flatten().count();
	let mut result = sum_all(maps);
	if present > 0 {
		result.scale(1.0 / present as f32);
	}
	result
}

/// Key-wise sum of every present map.
pub fn sum_all<K, W>(maps: &[Option<&W>]) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	let mut result = UnboundHeatMap::new();
	for map in maps.iter().flatten() {
		for (key, value) in entries(*map) {
			result.add(key, value);
		}
		result.add_samples(map.sample_count());
	}
	result
}

/// Merges distance-indexed histograms with a decaying weight.
///
/// `maps[i]` holds the statistics at distance `i + 1` and is weighted with the
/// `i`-th term of `schedule` (starting at `k`). Missing maps still consume
/// their term. The sum is divided by the total weight actually applied.
pub fn power_series<K, W>(maps: &[Option<&W>], k: f32, schedule: DecaySchedule) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	let k = k.clamp(0.0, 1.0);
	let mut result = UnboundHeatMap::new();
	let mut weight = k;
	let mut applied = 0.0;
	for map in maps {
		if let Some(map) = map {
			for (key, value) in entries(*map) {
				result.add(key, value * weight);
			}
			result.add_samples(map.sample_count());
			applied += weight;
		}
		weight = schedule.next(weight, k);
	}
	if applied > 0.0 {
		result.scale(1.0 / applied);
	}
	result
}

/// Keeps the entries whose weight is at least `threshold`.
pub fn trim<K, W>(map: &W, threshold: f32) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	filter(map, |value| value >= threshold)
}

/// Keeps the entries whose weight is at most `threshold`.
pub fn trim_upper<K, W>(map: &W, threshold: f32) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	filter(map, |value| value <= threshold)
}

fn filter<K, W, F>(map: &W, keep: F) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
	F: Fn(f32) -> bool,
{
	let mut result = UnboundHeatMap::new();
	for (key, value) in entries(map).filter(|(_, value)| keep(*value)) {
		result.set(key, value);
	}
	result.add_samples(map.sample_count());
	result
}

/// Running sum of the weights in ascending key order.
pub fn cumulative<K, W>(map: &W) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	let mut result = UnboundHeatMap::new();
	let mut sum = 0.0;
	for (key, value) in entries(map) {
		sum += value;
		result.set(key, sum);
	}
	result.add_samples(map.sample_count());
	result
}

/// Cumulative distribution: running sum of the weights divided by their total.
///
/// A zero total yields the raw (all zero) running sum.
pub fn cdf<K, W>(map: &W) -> UnboundHeatMap<K>
where
	K: Ord + Clone,
	W: Weights<K>,
{
	let mut result = cumulative(map);
	let total: f32 = map.weights().iter().sum();
	if total > 0.0 {
		result.scale(1.0 / total);
	}
	result
}

/// Picks a key with a probability proportional to its weight.
///
/// Draws `u` in `[0, 1)` and returns the first key whose CDF value is strictly
/// greater than `u`, or the last key when rounding leaves none.
/// Returns `None` for an empty map or a zero total.
pub fn random_from_cdf<K, W, R>(map: &W, rng: &mut R) -> Option<K>
where
	K: Clone,
	W: Weights<K>,
	R: Rng + ?Sized,
{
	let keys = map.keys();
	let total: f32 = map.weights().iter().sum();
	if keys.is_empty() || !total.is_finite() || total <= 0.0 {
		return None;
	}

	let u: f32 = rng.random();
	let mut sum = 0.0;
	for (key, value) in keys.iter().zip(map.weights()) {
		sum += value / total;
		if sum > u {
			return Some(key.clone());
		}
	}
	keys.last().cloned()
}

/// Picks a key uniformly, ignoring weights.
pub fn random_key<K, W, R>(map: &W, rng: &mut R) -> Option<K>
where
	K: Clone,
	W: Weights<K>,
	R: Rng + ?Sized,
{
	let keys = map.keys();
	if keys.is_empty() {
		return None;
	}
	Some(keys[rng.random_range(0..keys.len())].clone())
}
