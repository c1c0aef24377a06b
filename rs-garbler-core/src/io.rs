use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::{fs, io};

/// Failures while loading corpora or translator tables from disk.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	#[error("i/o error: {0}")]
	Io(#[from] io::Error),

	#[error("malformed line {line}: {reason}")]
	BadFormat { line: usize, reason: String },
}

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/latin.dat"` → `"latin"`
/// - `"latin.dat"` → `"latin"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory, sorted by name.
///
/// Returns file names only (no paths).
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;

	fn scratch_dir(name: &str) -> std::path::PathBuf {
		let dir = env::temp_dir().join(format!("rs-garbler-io-{name}-{}", std::process::id()));
		let _ = fs::remove_dir_all(&dir);
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn filename_drops_folder_and_extension() {
		assert_eq!(get_filename("./data/latin.dat").unwrap(), "latin");
		assert_eq!(get_filename("latin").unwrap(), "latin");
	}

	#[test]
	fn lists_matching_files_only() {
		let dir = scratch_dir("list");
		fs::write(dir.join("b.dat"), "beta").unwrap();
		fs::write(dir.join("a.dat"), "alpha").unwrap();
		fs::write(dir.join("c.gtf"), "a=b").unwrap();

		assert_eq!(list_files(&dir, "dat").unwrap(), vec!["a.dat", "b.dat"]);
		assert_eq!(read_file(dir.join("a.dat")).unwrap(), vec!["alpha"]);
		fs::remove_dir_all(&dir).unwrap();
	}

	#[test]
	fn missing_file_is_an_io_error() {
		let err: LoadError = read_file("/definitely/not/here.dat").unwrap_err().into();
		assert!(matches!(err, LoadError::Io(_)));
	}
}
