/// Errors raised by the statistical core.
///
/// Histogram contract violations (`InvalidSize`, `IndexOutOfRange`,
/// `SizeMismatch`, ...) are returned to direct callers of the histogram API.
/// Analyzers only reach them with indices they validated themselves.
///
/// File and translator-table errors are not part of this taxonomy, see
/// [`crate::io::LoadError`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GarblerError {
	/// Non-positive radius, malformed decay weight, inconsistent bounds.
	#[error("invalid configuration: {0}")]
	InvalidConfiguration(String),

	/// An analyzer was added after training started.
	#[error("analyzers may only be added before analysis")]
	SealedLibrary,

	/// Generation was requested before any word was analyzed.
	#[error("nothing has been analyzed")]
	NothingAnalyzed,

	#[error("unable to make a heatlist of size {0}")]
	InvalidSize(usize),

	#[error("index {index} out of range for length {len}")]
	IndexOutOfRange { index: usize, len: usize },

	#[error("referenced heatlists must be of same size ({left} != {right})")]
	SizeMismatch { left: usize, right: usize },

	#[error("increment amount has to be greater than zero")]
	InvalidAmount,

	#[error("interpolation value must be between 0 and 1, got {0}")]
	InvalidInterpolation(f32),

	/// A checked conversion found a total outside the normalization tolerance.
	#[error("source total {0} is outside the allowable range")]
	NotNormalized(f32),
}

pub type Result<T> = std::result::Result<T, GarblerError>;
