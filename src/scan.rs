//! Input discovery for batch runs.
//!
//! Walks a directory tree and returns every regular file in a stable,
//! sorted order. Nothing is filtered by extension here: a file the intake
//! does not accept is still reported (as ignored), so the user sees every
//! file the run looked at.
//!
//! Skipped:
//! - hidden files and directories (leading `.`)
//! - the output directory, when it lives inside the scanned tree

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

/// Collect all files under `root`, sorted by path.
pub fn scan(root: &Path, exclude: Option<&Path>) -> Result<Vec<PathBuf>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let exclude = exclude.and_then(|p| p.canonicalize().ok());

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            !is_hidden(e)
                && !exclude
                    .as_ref()
                    .is_some_and(|ex| e.path().canonicalize().is_ok_and(|p| p == *ex))
        });

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
