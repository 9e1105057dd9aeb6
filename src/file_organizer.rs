//! Moves planned files into their folders.
//!
//! Moves never overwrite: if a file with the same name already sits in the
//! target folder the move fails and the file stays where it is. Running the
//! same plan twice is safe.

use crate::planner::{SortPlan, SortPlanEntry, Target};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A file that was moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// Where the file was before the move.
    pub original_path: PathBuf,
    /// Where the file is now.
    pub new_path: PathBuf,
    /// The folder it was moved into.
    pub folder: String,
}

/// Errors that can occur while moving files.
#[derive(Debug)]
pub enum OrganizeError {
    /// Failed to create a target folder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: io::Error,
    },
    /// Failed to move a file into its folder.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
    /// A file with the same name already exists in the target folder.
    DestinationExists { path: PathBuf },
    /// The folder name would escape the base directory or is empty.
    InvalidFolderName { name: String },
    /// The base directory does not exist.
    InvalidBasePath { path: PathBuf },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::DestinationExists { path } => {
                write!(f, "Destination already exists: {}", path.display())
            }
            Self::InvalidFolderName { name } => write!(f, "Invalid folder name '{}'", name),
            Self::InvalidBasePath { path } => {
                write!(f, "Invalid base path {}: directory does not exist", path.display())
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for file organization operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Outcome of executing a whole plan.
#[derive(Debug, Default)]
pub struct MoveReport {
    /// Files that were moved.
    pub moved: Vec<Operation>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Files left in place because nothing maps them.
    pub unmapped: usize,
}

impl MoveReport {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Performs the physical moves.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves a file into `folder` under `base_path`, creating the folder if needed.
    ///
    /// Fails with [`OrganizeError::DestinationExists`] rather than overwrite.
    /// A file already inside `folder` is left alone and reported as moved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_to_folder(
    ///     Path::new("/path/to/base"),
    ///     Path::new("/path/to/base/image.png"),
    ///     "Photos",
    /// );
    ///
    /// match result {
    ///     Ok(op) => println!("Moved {} to {}", op.original_path.display(), op.new_path.display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn move_to_folder(
        base_path: &Path,
        file_path: &Path,
        folder: &str,
    ) -> OrganizeResult<Operation> {
        if !base_path.is_dir() {
            return Err(OrganizeError::InvalidBasePath {
                path: base_path.to_path_buf(),
            });
        }
        if !is_plain_folder_name(folder) {
            return Err(OrganizeError::InvalidFolderName {
                name: folder.to_string(),
            });
        }

        let folder_path = base_path.join(folder);
        let file_name = file_path
            .file_name()
            .ok_or_else(|| OrganizeError::FileMoveFailure {
                source: file_path.to_path_buf(),
                destination: folder_path.clone(),
                source_error: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;
        let destination_path = folder_path.join(file_name);

        if file_path.parent() == Some(folder_path.as_path()) {
            return Ok(Operation {
                original_path: file_path.to_path_buf(),
                new_path: destination_path,
                folder: folder.to_string(),
            });
        }

        if !folder_path.is_dir() {
            fs::create_dir(&folder_path).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: folder_path.clone(),
                source: e,
            })?;
        }

        move_without_replacing(file_path, &destination_path).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                OrganizeError::DestinationExists {
                    path: destination_path.clone(),
                }
            } else {
                OrganizeError::FileMoveFailure {
                    source: file_path.to_path_buf(),
                    destination: destination_path.clone(),
                    source_error: e,
                }
            }
        })?;

        tracing::info!(
            from = %file_path.display(),
            to = %destination_path.display(),
            "moved file"
        );
        Ok(Operation {
            original_path: file_path.to_path_buf(),
            new_path: destination_path,
            folder: folder.to_string(),
        })
    }

    /// Moves every mapped entry of `plan`.
    ///
    /// `on_entry` is called after each mapped entry with its outcome, so callers
    /// can drive progress output.
    pub fn execute_plan<F>(base_path: &Path, plan: &SortPlan<'_>, mut on_entry: F) -> MoveReport
    where
        F: FnMut(&SortPlanEntry<'_>, &OrganizeResult<Operation>),
    {
        let mut report = MoveReport::default();

        for entry in plan.iter() {
            let folder = match &entry.target {
                Target::Folder(folder) => folder,
                Target::Unmapped => {
                    report.unmapped += 1;
                    continue;
                }
            };

            let result = Self::move_to_folder(base_path, &entry.file.path, folder);
            on_entry(entry, &result);
            match result {
                Ok(operation) => report.moved.push(operation),
                Err(e) => report.failed.push((entry.file.path.clone(), e.to_string())),
            }
        }

        report
    }
}

/// Moves `from` to `to`, failing with `AlreadyExists` if `to` is taken.
///
/// A hard link claims the destination atomically, so a file that appears at
/// `to` concurrently is never replaced. Filesystems without hard links fall
/// back to a checked rename.
fn move_without_replacing(from: &Path, to: &Path) -> io::Result<()> {
    match fs::hard_link(from, to) {
        Ok(()) => {
            if let Err(e) = fs::remove_file(from) {
                // Leave the file where it was rather than in two places.
                let _ = fs::remove_file(to);
                return Err(e);
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        Err(e) => {
            tracing::debug!(error = %e, "hard link unavailable, renaming instead");
            if to.exists() {
                return Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination already exists",
                ));
            }
            fs::rename(from, to)
        }
    }
}

/// A single normal path component: no separators, `.` or `..`.
fn is_plain_folder_name(folder: &str) -> bool {
    let mut components = Path::new(folder).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
