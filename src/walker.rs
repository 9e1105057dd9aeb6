//! Lists the top level of a directory.
//!
//! Only direct children are considered: files become [`FileRecord`]s and
//! subdirectories are collected for statistics, never descended into.

use crate::config::CompiledFilters;
use crate::file_record::FileRecord;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// Errors raised while listing a directory.
#[derive(Debug)]
pub enum ScanError {
    /// The path does not exist.
    NotFound(PathBuf),
    /// The path exists but is not a directory.
    NotADirectory(PathBuf),
    /// The directory could not be read.
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for ScanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "Directory not found: {}", path.display()),
            Self::NotADirectory(path) => write!(f, "Not a directory: {}", path.display()),
            Self::ReadFailed { path, source } => {
                write!(f, "Error reading directory {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Files and subdirectories directly inside a directory, sorted by name.
#[derive(Debug, Clone, Default)]
pub struct DirectoryListing {
    pub files: Vec<FileRecord>,
    pub subdirectories: Vec<PathBuf>,
}

impl DirectoryListing {
    /// Combined size of the listed files.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(|file| file.size).sum()
    }
}

/// Lists `path`, applying `filters` to files.
///
/// Entries that cannot be inspected are logged and skipped.
pub fn scan_directory(
    path: &Path,
    filters: &CompiledFilters,
) -> Result<DirectoryListing, ScanError> {
    if !path.exists() {
        return Err(ScanError::NotFound(path.to_path_buf()));
    }
    if !path.is_dir() {
        return Err(ScanError::NotADirectory(path.to_path_buf()));
    }

    let entries = fs::read_dir(path).map_err(|e| ScanError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut listing = DirectoryListing::default();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(directory = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let entry_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(e) => {
                tracing::warn!(path = %entry_path.display(), error = %e, "skipping entry");
                continue;
            }
        };

        if file_type.is_dir() {
            listing.subdirectories.push(entry_path);
        } else if file_type.is_file() && filters.should_include(&entry_path) {
            match read_file_record(&entry_path) {
                Ok(record) => listing.files.push(record),
                Err(e) => {
                    tracing::warn!(path = %entry_path.display(), error = %e, "skipping file");
                }
            }
        }
    }

    listing.files.sort_by(|a, b| a.name.cmp(&b.name));
    listing.subdirectories.sort();
    tracing::debug!(
        directory = %path.display(),
        files = listing.files.len(),
        subdirectories = listing.subdirectories.len(),
        "scanned directory"
    );
    Ok(listing)
}

/// Builds a record from the file's metadata.
pub fn read_file_record(path: &Path) -> std::io::Result<FileRecord> {
    let metadata = fs::metadata(path)?;
    let record = FileRecord::new(path, metadata.len());
    Ok(match metadata.modified() {
        Ok(modified) => record.with_modified(DateTime::<Local>::from(modified)),
        Err(_) => record,
    })
}
