//! Online-normalized histograms.
//!
//! - [`Heatlist`]: dense index histogram kept at a total of 1.0 by weighted updates
//! - [`UnboundHeatlist`]: raw accumulator of the same shape (cumulative sums, products)
//! - [`HeatMap`]: sorted-key wrapper over a `Heatlist`
//! - [`UnboundHeatMap`]: sorted-key raw accumulator returned by merges
//!
//! Bounded and unbound types are distinct so that an intermediate sum cannot be
//! handed out as a probability distribution by mistake.

mod heatlist;
mod map;
mod unbound;
mod unbound_map;

pub use heatlist::{Heatlist, TOLERANCE};
pub use map::{HeatMap, Weights};
pub use unbound::UnboundHeatlist;
pub use unbound_map::UnboundHeatMap;
