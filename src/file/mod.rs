//! Reading and writing the target script.

use crate::error::{LambdaFixError, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// How the rewritten text is put back on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
	/// Truncate and overwrite the file. A failure mid-write can leave it partial.
	#[default]
	InPlace,

	/// Write a temporary file next to the target, then rename it over the target.
	Atomic,
}

/// Read the whole file as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String> {
	std::fs::read_to_string(path).map_err(|source| LambdaFixError::SourceReadError {
		path: path.to_path_buf(),
		source,
	})
}

/// Replace the file's content with `content`.
pub fn write_source(path: &Path, content: &str, mode: WriteMode) -> Result<()> {
	let written = match mode {
		WriteMode::InPlace => std::fs::write(path, content),
		WriteMode::Atomic => write_atomic(path, content),
	};

	written.map_err(|source| LambdaFixError::SourceWriteError {
		path: path.to_path_buf(),
		source,
	})
}

fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	// Carry the original permissions over to the replacement.
	let permissions = std::fs::metadata(path)?.permissions();

	let mut temp = NamedTempFile::new_in(dir)?;
	temp.write_all(content.as_bytes())?;
	temp.as_file().sync_all()?;
	temp.as_file().set_permissions(permissions)?;
	temp.persist(path).map_err(|e| e.error)?;
	Ok(())
}
