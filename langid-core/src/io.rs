use std::ffi::OsString;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Reads a text file and returns all its lines as a `Vec<String>`.
///
/// - Reads the entire file into memory
/// - Splits on `\n` / `\r\n`
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	Ok(contents.lines().map(str::to_owned).collect())
}

/// Writes `lines` to `path`, one per line, creating parent folders if needed.
pub(crate) fn write_lines<P: AsRef<Path>>(path: P, lines: &[String]) -> io::Result<()> {
	let path = path.as_ref();
	if let Some(parent) = path.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}

	let mut file = io::BufWriter::new(File::create(path)?);
	for line in lines {
		writeln!(file, "{}", line)?;
	}
	file.flush()
}

/// Sibling path a file is staged under before being renamed into place.
fn staging_path(path: &Path) -> PathBuf {
	let mut name = path.file_name().map(OsString::from).unwrap_or_default();
	name.push(".tmp");
	path.with_file_name(name)
}

/// Writes several files, either all of them or none.
///
/// Every file is first written to a `.tmp` sibling. Only when all staged
/// writes succeeded are they renamed onto their final paths.
///
/// # Errors
/// On any failure the staged files are removed, as are the final files
/// already renamed into place, and the first error is returned.
pub(crate) fn write_files_atomically(files: &[(PathBuf, Vec<String>)]) -> io::Result<()> {
	let staged: Vec<PathBuf> = files.iter().map(|(path, _)| staging_path(path)).collect();
	let result = stage_then_rename(files, &staged);
	if result.is_err() {
		for path in &staged {
			let _ = fs::remove_file(path);
		}
	}
	result
}

fn stage_then_rename(files: &[(PathBuf, Vec<String>)], staged: &[PathBuf]) -> io::Result<()> {
	for ((_, lines), tmp) in files.iter().zip(staged) {
		write_lines(tmp, lines)?;
	}
	for (i, ((path, _), tmp)) in files.iter().zip(staged).enumerate() {
		if let Err(e) = fs::rename(tmp, path) {
			for (committed, _) in &files[..i] {
				let _ = fs::remove_file(committed);
			}
			return Err(e);
		}
	}
	Ok(())
}

/// Normalize a folder path.
///
/// - `"."` or `"./"` resolves to the current working directory
/// - Other paths are returned as-is (not canonicalized)
pub(crate) fn normalize_folder(input: &Path) -> PathBuf {
	if input == Path::new(".") || input == Path::new("./") {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		input.to_path_buf()
	}
}
