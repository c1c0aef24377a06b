//! Statistical word garbler.
//!
//! This crate learns the texture of a corpus and generates new words that
//! look like they belong to it:
//! - Online normalized histograms (`heatmap`)
//! - Merge and sampling combinators over histograms (`analysis`)
//! - Word analyzers collecting letter, length and ending statistics
//! - A library driving the analyzers and script-based word generation
//!
//! Typical use:
//! build a [`Library`] with [`LibraryConfig`], feed it text with
//! [`Library::analyze`], then call [`Library::run`] with a [`DefaultScript`].

/// Normalized and unbound histograms, plain and keyed.
pub mod heatmap;

/// Stateless combinators (interpolation, power series, CDF sampling).
pub mod analysis;

/// Statistical collectors and their common interface.
pub mod analyzer;

/// Core error taxonomy.
pub mod error;

/// Library and analyzer configuration.
pub mod config;

/// Analyzer registry, training and line generation.
pub mod library;

/// Generation engine and the default script.
pub mod script;

/// Character filters applied to input and output.
pub mod translator;

/// File loading helpers (corpora, translator tables, folder listing).
pub mod io;

pub use analyzer::{Analyzer, Distribution};
pub use config::{LibraryConfig, SelfFeed};
pub use error::{GarblerError, Result};
pub use library::Library;
pub use script::{DefaultScript, Script, ScriptContext};
pub use translator::Translator;
