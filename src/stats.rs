//! Directory statistics.

use crate::file_record::FileRecord;
use crate::top_k::TopKSelector;
use crate::walker::DirectoryListing;
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;

/// Summary of a directory's top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryStats {
    pub name: String,
    pub modified: Option<DateTime<Local>>,
    /// Combined size of the top-level files.
    pub total_size: u64,
    pub file_count: usize,
    pub subdirectory_count: usize,
    /// Largest files, biggest first.
    pub largest: Vec<FileRecord>,
}

impl DirectoryStats {
    /// Gathers statistics for `path` from an existing listing.
    pub fn collect(path: &Path, listing: &DirectoryListing, largest: usize) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let modified = fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .ok()
            .map(DateTime::<Local>::from);

        Self::from_records(
            name,
            modified,
            &listing.files,
            listing.subdirectories.len(),
            largest,
        )
    }

    /// Computes statistics from records alone.
    pub fn from_records(
        name: String,
        modified: Option<DateTime<Local>>,
        files: &[FileRecord],
        subdirectory_count: usize,
        largest: usize,
    ) -> Self {
        let mut selector = TopKSelector::new(largest);
        selector.extend(files.iter().cloned());

        Self {
            name,
            modified,
            total_size: files.iter().map(|file| file.size).sum(),
            file_count: files.len(),
            subdirectory_count,
            largest: selector.drain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompiledFilters;
    use crate::walker::scan_directory;
    use tempfile::TempDir;

    #[test]
    fn test_from_records() {
        let files = vec![
            FileRecord::new("/d/a.txt", 10),
            FileRecord::new("/d/b.bin", 300),
            FileRecord::new("/d/c.png", 300),
        ];
        let stats = DirectoryStats::from_records("d".to_string(), None, &files, 2, 1);

        assert_eq!(stats.total_size, 610);
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.subdirectory_count, 2);
        assert_eq!(stats.largest.len(), 1);
        assert_eq!(stats.largest[0].name, "b.bin");
    }

    #[test]
    fn test_empty_directory_has_no_largest_file() {
        let stats = DirectoryStats::from_records("empty".to_string(), None, &[], 0, 1);
        assert!(stats.largest.is_empty());
        assert_eq!(stats.total_size, 0);
    }

    #[test]
    fn test_collect_from_disk() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("small.txt"), "1").unwrap();
        fs::write(base.join("big.bin"), "1234567890").unwrap();
        fs::write(base.join("mid.md"), "12345").unwrap();
        fs::create_dir(base.join("sub")).unwrap();

        let listing = scan_directory(base, &CompiledFilters::default()).unwrap();
        let stats = DirectoryStats::collect(base, &listing, 2);

        assert_eq!(
            stats.name,
            base.file_name().unwrap().to_string_lossy().to_string()
        );
        assert!(stats.modified.is_some());
        assert_eq!(stats.total_size, 16);
        assert_eq!(stats.file_count, 3);
        assert_eq!(stats.subdirectory_count, 1);
        let largest: Vec<&str> = stats.largest.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(largest, vec!["big.bin", "mid.md"]);
    }
}
