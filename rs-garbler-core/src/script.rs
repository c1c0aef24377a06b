//! Word generation driven by scripts.
//!
//! A [`Script`] decides how a word is built out of the distributions of a
//! [`Library`]. The engine ([`create_word`]) calls its hooks in a fixed order:
//!
//! 1. `pre_iterate` seeds the buffer and sets the iteration budget
//! 2. `on_iterate` runs once per budgeted iteration, until the budget is spent
//!    or the script terminates
//! 3. `post_iterate` finishes the word
//!
//! The budget is read once, right after `pre_iterate`.

use log::debug;
use rand::{Rng, RngCore};

use crate::analysis::{random_from_cdf, random_key, trim};
use crate::analyzer::{names, Distribution};
use crate::heatmap::HeatMap;
use crate::library::Library;
use crate::translator::Translator;

/// Where the engine currently stands for the word being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	PreIterate,
	Iterate(usize),
	PostIterate,
	Done,
}

/// Everything a script may read or change while building one word.
pub struct ScriptContext<'a> {
	library: &'a Library,
	context: &'a str,
	buffer: String,
	iterations: usize,
	terminated: bool,
	phase: Phase,
	rng: &'a mut dyn RngCore,
}

impl<'a> ScriptContext<'a> {
	fn new(library: &'a Library, context: &'a str, rng: &'a mut dyn RngCore) -> Self {
		Self {
			library,
			context,
			buffer: String::new(),
			iterations: 0,
			terminated: false,
			phase: Phase::PreIterate,
			rng,
		}
	}

	/// The line generated before this word.
	pub fn context(&self) -> &str {
		self.context
	}

	pub fn buffer(&self) -> &str {
		&self.buffer
	}

	pub fn last_char(&self) -> Option<char> {
		self.buffer.chars().last()
	}

	pub fn push(&mut self, c: char) {
		self.buffer.push(c);
	}

	pub fn push_str(&mut self, s: &str) {
		self.buffer.push_str(s);
	}

	pub fn iterations(&self) -> usize {
		self.iterations
	}

	/// Only effective during `pre_iterate`.
	pub fn set_iterations(&mut self, iterations: usize) {
		self.iterations = iterations;
	}

	/// Skips the remaining iterations.
	pub fn terminate(&mut self) {
		self.terminated = true;
	}

	pub fn is_terminated(&self) -> bool {
		self.terminated
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	pub fn rng(&mut self) -> &mut dyn RngCore {
		&mut *self.rng
	}

	/// Uniform draw in `[0, 1)`.
	pub fn draw(&mut self) -> f32 {
		self.rng.random()
	}

	/// Asks analyzer `name` about the current buffer.
	pub fn next(&self, name: &str) -> Option<Distribution> {
		self.library.next(name, self.context, &self.buffer)
	}

	pub fn next_chars(&self, name: &str) -> Option<HeatMap<char>> {
		self.next(name)?.into_chars()
	}

	pub fn next_lengths(&self, name: &str) -> Option<HeatMap<usize>> {
		self.next(name)?.into_lengths()
	}

	pub fn next_endings(&self, name: &str) -> Option<HeatMap<String>> {
		self.next(name)?.into_endings()
	}

	/// Samples a character from analyzer `name` weighted by its distribution.
	pub fn sample_char(&mut self, name: &str) -> Option<char> {
		let map = self.next_chars(name)?;
		random_from_cdf(&map, &mut *self.rng)
	}
}

/// Hooks called by [`create_word`].
pub trait Script {
	/// Called by [`Library::run`] before the first word of a line.
	fn on_start(&mut self) {}

	fn pre_iterate(&mut self, ctx: &mut ScriptContext<'_>);

	fn on_iterate(&mut self, ctx: &mut ScriptContext<'_>);

	fn post_iterate(&mut self, ctx: &mut ScriptContext<'_>);

	/// Called by [`Library::run`] once the whole line is generated.
	fn on_complete(&mut self, _line: &str) {}

	/// Translator applied to every finished word. `None` leaves words untouched.
	fn output_filter(&self) -> Option<&Translator> {
		None
	}
}

/// Builds one word with `script`.
///
/// `context` is the line generated so far. The returned word has already
/// gone through the output filter.
pub fn create_word<S: Script + ?Sized>(
	script: &mut S,
	library: &Library,
	context: &str,
	rng: &mut dyn RngCore,
) -> String {
	let mut ctx = ScriptContext::new(library, context, rng);

	script.pre_iterate(&mut ctx);
	let budget = ctx.iterations;
	debug!("pre-iterate: {:?}, {} iterations", ctx.buffer, budget);

	for i in 0..budget {
		if ctx.terminated {
			debug!("terminated after {} iterations", i);
			break;
		}
		ctx.phase = Phase::Iterate(i);
		script.on_iterate(&mut ctx);
	}

	ctx.phase = Phase::PostIterate;
	script.post_iterate(&mut ctx);
	ctx.phase = Phase::Done;

	let word = std::mem::take(&mut ctx.buffer);
	debug!("word: {:?}", word);
	match script.output_filter() {
		Some(filter) => filter.translate(&word),
		None => word,
	}
}

/// The stock generation strategy.
///
/// - First letter from the initial character distribution.
/// - Target length from the first-letter length correlation (or the plain
///   length distribution), ignoring lengths rarer than `length_threshold`.
/// - Following letters from the letter influence (or the alphabet), with
///   rare repetitions re-drawn and a chance to stop early on letters that
///   usually end words.
/// - A learned ending to finish.
#[derive(Clone, Debug)]
pub struct DefaultScript {
	/// Letters left for the ending.
	pub padding: usize,
	pub length_threshold: f32,
	pub repeat_threshold: f32,
	pub end_threshold: f32,
	pub output: Translator,
}

impl Default for DefaultScript {
	fn default() -> Self {
		Self {
			padding: 2,
			length_threshold: 0.05,
			repeat_threshold: 0.25,
			end_threshold: 0.5,
			output: Translator::Identity,
		}
	}
}

impl DefaultScript {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_output_filter(mut self, output: Translator) -> Self {
		self.output = output;
		self
	}

	fn candidate(ctx: &mut ScriptContext<'_>) -> Option<char> {
		ctx.sample_char(names::INFLUENCE).or_else(|| ctx.sample_char(names::ALPHABET))
	}

	fn target_length(&self, ctx: &mut ScriptContext<'_>) -> Option<usize> {
		let lengths = ctx
			.next_lengths(names::LENGTH_CORRELATION)
			.or_else(|| ctx.next_lengths(names::WORD_LENGTH))?;
		let trimmed = trim(&lengths, self.length_threshold).bind();
		if trimmed.is_empty() {
			random_from_cdf(&lengths, ctx.rng())
		} else {
			random_from_cdf(&trimmed, ctx.rng())
		}
	}
}

impl Script for DefaultScript {
	fn pre_iterate(&mut self, ctx: &mut ScriptContext<'_>) {
		let Some(first) = ctx.sample_char(names::CHAR_BEGIN) else {
			ctx.terminate();
			return;
		};
		ctx.push(first);
		let length = self.target_length(ctx).unwrap_or(0);
		ctx.set_iterations(length.saturating_sub(self.padding));
	}

	fn on_iterate(&mut self, ctx: &mut ScriptContext<'_>) {
		let Some(mut candidate) = Self::candidate(ctx) else {
			return;
		};

		if ctx.last_char() == Some(candidate) {
			let p = ctx
				.next_chars(names::REPETITIONS)
				.map_or(0.0, |bucket| bucket.value(&candidate));
			if p > 0.0 && p < self.repeat_threshold && ctx.draw() <= p {
				if let Some(other) = Self::candidate(ctx) {
					candidate = other;
				}
			}
		}
		ctx.push(candidate);

		let p_end = ctx.next_lengths(names::CHAR_END).map_or(0.0, |map| map.value(&0));
		if p_end > self.end_threshold && ctx.draw() < p_end {
			ctx.terminate();
		}
	}

	fn post_iterate(&mut self, ctx: &mut ScriptContext<'_>) {
		if ctx.is_terminated() {
			return;
		}
		let ending = ctx
			.next_endings(names::COMMON_ENDINGS)
			.and_then(|endings| random_key(&endings, ctx.rng()));
		if let Some(ending) = ending {
			ctx.push_str(&ending);
		}
	}

	fn output_filter(&self) -> Option<&Translator> {
		Some(&self.output)
	}
}
