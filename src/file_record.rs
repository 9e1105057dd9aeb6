//! The per-file record produced by the directory walker.

use crate::defaults::normalize_extension;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// A file found at the top level of the directory being sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name including its extension.
    pub name: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Lowercased extension with a leading dot; empty when the file has none.
    pub extension: String,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, when the platform reports one.
    pub modified: Option<DateTime<Local>>,
}

impl FileRecord {
    /// Builds a record from a path and size, deriving name and extension.
    ///
    /// ```
    /// use dirsort::file_record::FileRecord;
    ///
    /// let record = FileRecord::new("/tmp/Report.Final.PDF", 10);
    /// assert_eq!(record.name, "Report.Final.PDF");
    /// assert_eq!(record.extension, ".pdf");
    ///
    /// let dotfile = FileRecord::new("/tmp/.bashrc", 10);
    /// assert_eq!(dotfile.extension, "");
    /// ```
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            name,
            path,
            extension,
            size,
            modified: None,
        }
    }

    pub fn with_modified(mut self, modified: DateTime<Local>) -> Self {
        self.modified = Some(modified);
        self
    }

    pub fn has_extension(&self) -> bool {
        !self.extension.is_empty()
    }

    /// Every dotted suffix of the name, longest first, normalized.
    ///
    /// A leading dot does not start a suffix, so dotfiles only contribute
    /// what follows their first inner dot.
    ///
    /// ```
    /// use dirsort::file_record::FileRecord;
    ///
    /// let record = FileRecord::new("/d/backup.Tar.GZ", 1);
    /// assert_eq!(record.suffixes(), vec![".tar.gz", ".gz"]);
    /// ```
    pub fn suffixes(&self) -> Vec<String> {
        if !self.has_extension() {
            return Vec::new();
        }
        self.name
            .char_indices()
            .filter(|&(index, c)| c == '.' && index > 0 && index + 1 < self.name.len())
            .map(|(index, _)| normalize_extension(&self.name[index..]))
            .collect()
    }
}

/// The normalized extension of a path, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_without_extension() {
        let record = FileRecord::new("/data/Makefile", 3);
        assert_eq!(record.name, "Makefile");
        assert!(!record.has_extension());
    }

    #[test]
    fn test_record_uses_last_suffix() {
        let record = FileRecord::new("backup.tar.GZ", 3);
        assert_eq!(record.extension, ".gz");
        assert!(record.modified.is_none());
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(
            FileRecord::new("/d/site.backup.tar.gz", 1).suffixes(),
            vec![".backup.tar.gz", ".tar.gz", ".gz"]
        );
        assert_eq!(FileRecord::new("/d/notes.txt", 1).suffixes(), vec![".txt"]);
        assert_eq!(FileRecord::new("/d/.profile.sh", 1).suffixes(), vec![".sh"]);
        assert!(FileRecord::new("/d/.bashrc", 1).suffixes().is_empty());
        assert!(FileRecord::new("/d/Makefile", 1).suffixes().is_empty());
    }

    #[test]
    fn test_with_modified() {
        let now = Local::now();
        let record = FileRecord::new("a.txt", 1).with_modified(now);
        assert_eq!(record.modified, Some(now));
    }
}
