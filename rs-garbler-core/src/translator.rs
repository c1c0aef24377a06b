use std::collections::HashMap;
use std::path::Path;

use crate::io::{self, LoadError};

/// Character mapping applied to training text and to generated words.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Translator {
	#[default]
	Identity,
	/// Folds every character to lowercase when it has a single-char lowercase form.
	CaseInsensitive,
	/// Explicit table; unmapped characters pass through.
	Table(HashMap<char, char>),
}

impl Translator {
	pub fn translate_char(&self, c: char) -> char {
		match self {
			Translator::Identity => c,
			Translator::CaseInsensitive => {
				let mut lower = c.to_lowercase();
				match (lower.next(), lower.next()) {
					(Some(l), None) => l,
					_ => c,
				}
			}
			Translator::Table(table) => table.get(&c).copied().unwrap_or(c),
		}
	}

	pub fn translate(&self, text: &str) -> String {
		match self {
			Translator::Identity => text.to_owned(),
			_ => text.chars().map(|c| self.translate_char(c)).collect(),
		}
	}

	/// Parses a translation table.
	///
	/// Each non-empty line reads `k1,k2,...=v`: keys sit at even offsets before
	/// the `=` and exactly one value character follows it. For example `c,k=q`
	/// maps both `c` and `k` to `q`.
	pub fn parse_table(content: &str) -> Result<Self, LoadError> {
		let mut table = HashMap::new();
		for (number, line) in content.lines().enumerate() {
			if line.is_empty() {
				continue;
			}
			let bad = |reason: &str| LoadError::BadFormat {
				line: number + 1,
				reason: reason.to_owned(),
			};

			let (keys, value) = line.split_once('=').ok_or_else(|| bad("missing '='"))?;
			let mut value_chars = value.chars();
			let value = match (value_chars.next(), value_chars.next()) {
				(Some(v), None) => v,
				(None, _) => return Err(bad("missing value after '='")),
				_ => return Err(bad("more than one value character")),
			};
			for key in keys.chars().step_by(2) {
				table.insert(key, value);
			}
		}
		Ok(Translator::Table(table))
	}

	/// Loads a translation table from a file (see [`Translator::parse_table`]).
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
		let lines = io::read_file(path)?;
		Self::parse_table(&lines.join("\n"))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn identity_and_case() {
		assert_eq!(Translator::Identity.translate("AbC"), "AbC");
		assert_eq!(Translator::CaseInsensitive.translate("AbÇ"), "abç");
		// 'İ' lowercases to two chars and is left alone
		assert_eq!(Translator::CaseInsensitive.translate_char('İ'), 'İ');
	}

	#[test]
	fn table_maps_listed_keys() {
		let translator = Translator::parse_table("c,k=q\n\nx=z").unwrap();
		assert_eq!(translator.translate("kick box"), "qiqq boz");
	}

	#[test]
	fn malformed_lines_report_their_number() {
		match Translator::parse_table("a=b\nno equals") {
			Err(LoadError::BadFormat { line, .. }) => assert_eq!(line, 2),
			other => panic!("unexpected {other:?}"),
		}
		assert!(matches!(Translator::parse_table("a=bc"), Err(LoadError::BadFormat { line: 1, .. })));
		assert!(matches!(Translator::parse_table("\n\na="), Err(LoadError::BadFormat { line: 3, .. })));
	}
}
