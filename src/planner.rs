//! Decides which folder each file belongs in.
//!
//! Planning is pure: it reads file records and a resolved mapping and returns
//! one entry per file, in input order. Files nothing maps are kept as
//! [`Target::Unmapped`] so callers can report them.

use crate::file_record::FileRecord;
use crate::resolver::ResolvedMapping;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Label used for files no rule covers.
pub const UNMAPPED_LABEL: &str = "Unmapped";

/// Where a file should go.
///
/// Orders folders by name, then `Unmapped` last.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Target {
    Folder(String),
    Unmapped,
}

impl Target {
    pub fn folder(&self) -> Option<&str> {
        match self {
            Target::Folder(folder) => Some(folder),
            Target::Unmapped => None,
        }
    }

    pub fn is_unmapped(&self) -> bool {
        matches!(self, Target::Unmapped)
    }

    /// Folder name, or [`UNMAPPED_LABEL`].
    pub fn label(&self) -> &str {
        self.folder().unwrap_or(UNMAPPED_LABEL)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One file and its destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortPlanEntry<'a> {
    pub file: &'a FileRecord,
    pub target: Target,
}

/// The destination of every planned file, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortPlan<'a> {
    entries: Vec<SortPlanEntry<'a>>,
}

impl<'a> SortPlan<'a> {
    pub fn entries(&self) -> &[SortPlanEntry<'a>] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortPlanEntry<'a>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries that have a destination folder.
    pub fn mapped(&self) -> impl Iterator<Item = &SortPlanEntry<'a>> {
        self.entries.iter().filter(|entry| !entry.target.is_unmapped())
    }

    pub fn unmapped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.target.is_unmapped())
            .count()
    }

    /// Number of files per target. A folder that happens to be named like
    /// [`UNMAPPED_LABEL`] is still counted apart from unmapped files.
    pub fn counts_by_target(&self) -> BTreeMap<Target, usize> {
        let mut counts = BTreeMap::new();
        for entry in &self.entries {
            *counts.entry(entry.target.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of files per destination folder, leaving out unmapped files.
    pub fn folder_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for folder in self.entries.iter().filter_map(|entry| entry.target.folder()) {
            *counts.entry(folder.to_string()).or_insert(0) += 1;
        }
        counts
    }
}

/// Plans a destination for every file.
///
/// Multi-dot extensions are honored: `backup.tar.gz` is looked up as `.tar.gz`
/// first and as `.gz` after that. A file is [`Target::Unmapped`] when it has no
/// extension, when none of its suffixes is in `mapping`, or when it is the
/// mapping file itself (`rule_file`).
///
/// # Examples
///
/// ```
/// use dirsort::defaults::DefaultMapping;
/// use dirsort::file_record::FileRecord;
/// use dirsort::parser::ParsedMapping;
/// use dirsort::planner::{plan, Target};
/// use dirsort::resolver::resolve;
///
/// let (mapping, _) = resolve(&ParsedMapping::default(), &DefaultMapping::builtin());
/// let files = vec![FileRecord::new("/d/song.MP3", 1), FileRecord::new("/d/README", 1)];
/// let plan = plan(&files, &mapping, None);
/// assert_eq!(plan.entries()[0].target, Target::Folder("Music".to_string()));
/// assert_eq!(plan.entries()[1].target, Target::Unmapped);
/// ```
pub fn plan<'a>(
    files: &'a [FileRecord],
    mapping: &ResolvedMapping,
    rule_file: Option<&Path>,
) -> SortPlan<'a> {
    let entries: Vec<SortPlanEntry<'a>> = files
        .iter()
        .map(|file| SortPlanEntry {
            file,
            target: target_for(file, mapping, rule_file),
        })
        .collect();

    let plan = SortPlan { entries };
    tracing::debug!(
        files = plan.len(),
        unmapped = plan.unmapped_count(),
        "planned sort"
    );
    plan
}

fn target_for(file: &FileRecord, mapping: &ResolvedMapping, rule_file: Option<&Path>) -> Target {
    if rule_file.is_some_and(|rule_file| rule_file == file.path) {
        return Target::Unmapped;
    }
    if !file.has_extension() {
        return Target::Unmapped;
    }
    // Longest suffix first, so `.tar.gz` beats `.gz`.
    let found = file
        .suffixes()
        .iter()
        .find_map(|suffix| mapping.get(suffix))
        .or_else(|| mapping.get(&file.extension));
    match found {
        Some(folder) => Target::Folder(folder.to_string()),
        None => Target::Unmapped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::DefaultMapping;
    use crate::parser::parse_mapping_file;
    use crate::resolver::resolve;

    fn mapping(text: &str) -> ResolvedMapping {
        let (parsed, errors) = parse_mapping_file(text);
        assert!(errors.is_empty());
        resolve(&parsed, &DefaultMapping::builtin()).0
    }

    fn files(names: &[&str]) -> Vec<FileRecord> {
        names
            .iter()
            .map(|name| FileRecord::new(format!("/dest/{}", name), 1))
            .collect()
    }

    #[test]
    fn test_plan_preserves_order_and_count() {
        let files = files(&["b.txt", "a.png", "c", "d.unknown", "e.MKV"]);
        let plan = plan(&files, &mapping("/dest\n"), None);

        assert_eq!(plan.len(), files.len());
        let labels: Vec<&str> = plan.iter().map(|e| e.target.label()).collect();
        assert_eq!(
            labels,
            vec!["Texts", "Photos", UNMAPPED_LABEL, UNMAPPED_LABEL, "Videos"]
        );
        for (entry, file) in plan.iter().zip(&files) {
            assert_eq!(entry.file, file);
        }
    }

    #[test]
    fn test_plan_uses_custom_rules() {
        let files = files(&["notes.txt", "disk.iso"]);
        let plan = plan(&files, &mapping("/dest\n.txt -> Notes\n.iso -> Images\n"), None);
        assert_eq!(plan.entries()[0].target, Target::Folder("Notes".to_string()));
        assert_eq!(plan.entries()[1].target, Target::Folder("Images".to_string()));
    }

    #[test]
    fn test_plan_normalizes_record_extension() {
        let mut record = FileRecord::new("/dest/x.txt", 1);
        record.extension = "TXT".to_string();
        let files = vec![record];
        let plan = plan(&files, &mapping("/dest\n"), None);
        assert_eq!(plan.entries()[0].target.folder(), Some("Texts"));
    }

    #[test]
    fn test_compound_extension_rule_matches() {
        let files = files(&["backup.tar.gz", "photo.gz", "BACKUP.TAR.GZ", "old.tar"]);
        let plan = plan(&files, &mapping("/dest\n.tar.gz -> Archives\n"), None);
        let labels: Vec<&str> = plan.iter().map(|e| e.target.label()).collect();
        assert_eq!(labels, vec!["Archives", "Compressed", "Archives", "Compressed"]);
    }

    #[test]
    fn test_compound_file_falls_back_to_last_suffix() {
        let files = files(&["backup.tar.gz", "report.final.pdf"]);
        let plan = plan(&files, &mapping("/dest\n"), None);
        assert_eq!(plan.entries()[0].target.folder(), Some("Compressed"));
        assert_eq!(plan.entries()[1].target.folder(), Some("Texts"));
    }

    #[test]
    fn test_rule_file_is_never_moved() {
        let files = files(&["rules.txt", "other.txt"]);
        let plan = plan(
            &files,
            &mapping("/dest\n"),
            Some(Path::new("/dest/rules.txt")),
        );
        assert!(plan.entries()[0].target.is_unmapped());
        assert_eq!(plan.entries()[1].target.folder(), Some("Texts"));
    }

    #[test]
    fn test_empty_input() {
        let plan = plan(&[], &mapping("/dest\n"), None);
        assert!(plan.is_empty());
        assert_eq!(plan.unmapped_count(), 0);
    }

    #[test]
    fn test_counts_by_target() {
        let files = files(&["a.txt", "b.md", "c.png", "d", "e.zzz"]);
        let plan = plan(&files, &mapping("/dest\n"), None);
        let counts = plan.counts_by_target();
        assert_eq!(counts.get(&Target::Folder("Texts".to_string())), Some(&2));
        assert_eq!(counts.get(&Target::Folder("Photos".to_string())), Some(&1));
        assert_eq!(counts.get(&Target::Unmapped), Some(&2));
        assert_eq!(counts.keys().last(), Some(&Target::Unmapped));
        assert_eq!(plan.unmapped_count(), 2);
        assert_eq!(plan.mapped().count(), 3);
    }

    #[test]
    fn test_folder_named_unmapped_is_counted_separately() {
        let files = files(&["a.x", "b"]);
        let plan = plan(&files, &mapping("/dest\n.x -> Unmapped\n"), None);

        let counts = plan.counts_by_target();
        assert_eq!(counts.get(&Target::Folder(UNMAPPED_LABEL.to_string())), Some(&1));
        assert_eq!(counts.get(&Target::Unmapped), Some(&1));
        assert_eq!(plan.unmapped_count(), 1);

        let folders = plan.folder_counts();
        assert_eq!(folders.len(), 1);
        assert_eq!(folders.get(UNMAPPED_LABEL), Some(&1));
    }

    #[test]
    fn test_plan_is_deterministic() {
        let files = files(&["a.txt", "b.py", "c"]);
        let mapping = mapping("/dest\n.py -> Scripts\n");
        assert_eq!(plan(&files, &mapping, None), plan(&files, &mapping, None));
    }
}
