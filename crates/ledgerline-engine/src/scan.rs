//! Ledger directory scanning and partitioning.

use crate::error::EngineError;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// List the ledger files of a directory.
///
/// Keeps regular files with the given extension and drops the file named
/// `exclude` (the report's own output), so a previous report written next to
/// the ledgers never feeds back into the input. The result is sorted by file
/// name, which makes partitioning deterministic.
pub fn scan_ledger_dir(
    dir: &Path,
    extension: &str,
    exclude: &str,
) -> Result<Vec<PathBuf>, EngineError> {
    let read_error = |source| EngineError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension() != Some(OsStr::new(extension)) {
            continue;
        }
        if path.file_name() == Some(OsStr::new(exclude)) {
            continue;
        }
        files.push(path);
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Split files into at most `requested` contiguous groups.
///
/// `chunk_size = ceil(total / requested)`, giving `ceil(total / chunk_size)`
/// groups in original order. Fewer files than requested yields fewer groups;
/// no files yields no groups. A request of zero is treated as one.
pub fn partition<T: Clone>(items: &[T], requested: usize) -> Vec<Vec<T>> {
    if items.is_empty() {
        return Vec::new();
    }
    let chunk_size = items.len().div_ceil(requested.max(1));
    items.chunks(chunk_size).map(<[T]>::to_vec).collect()
}
