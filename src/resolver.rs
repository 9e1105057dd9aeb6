//! Merges parsed custom rules into the default table.
//!
//! Resolution is last-write-wins in declaration order: custom rules override
//! defaults, and a later custom rule overrides an earlier one. Overrides are
//! reported as [`Conflict`]s but never stop resolution.

use crate::defaults::{DefaultMapping, normalize_extension};
use crate::parser::ParsedMapping;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The final extension to folder mapping.
///
/// Keys are normalized extensions. Serializes as a flat JSON object ordered by
/// extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedMapping {
    entries: BTreeMap<String, String>,
}

impl ResolvedMapping {
    /// Looks up the folder for an extension, case-insensitively.
    ///
    /// ```
    /// use dirsort::defaults::DefaultMapping;
    /// use dirsort::parser::ParsedMapping;
    /// use dirsort::resolver::resolve;
    ///
    /// let (mapping, _) = resolve(&ParsedMapping::default(), &DefaultMapping::builtin());
    /// assert_eq!(mapping.get(".JPG"), Some("Photos"));
    /// assert_eq!(mapping.get(""), None);
    /// ```
    pub fn get(&self, ext: &str) -> Option<&str> {
        self.entries
            .get(&normalize_extension(ext))
            .map(String::as_str)
    }

    pub fn contains(&self, ext: &str) -> bool {
        self.get(ext).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(extension, folder)` pairs ordered by extension.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(ext, folder)| (ext.as_str(), folder.as_str()))
    }

    /// Distinct folder names, sorted.
    pub fn folders(&self) -> BTreeSet<&str> {
        self.entries.values().map(String::as_str).collect()
    }

    /// Pretty-printed JSON object of extension to folder.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Where a mapping entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The default table.
    Default,
    /// A custom rule declared on `line`.
    Custom { line: usize },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Default => write!(f, "default mapping"),
            Origin::Custom { line } => write!(f, "line {}", line),
        }
    }
}

/// An extension whose folder was overridden during resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub extension: String,
    /// Folder the extension mapped to before this rule.
    pub previous: String,
    /// Folder the extension maps to now.
    pub new: String,
    pub previous_origin: Origin,
    /// Line of the overriding rule.
    pub line: usize,
}

impl Conflict {
    /// True when two custom rules declared the same extension.
    pub fn is_duplicate_declaration(&self) -> bool {
        matches!(self.previous_origin, Origin::Custom { .. })
    }

    /// True when the override sends the extension to a different folder.
    pub fn changes_folder(&self) -> bool {
        self.previous != self.new
    }

    /// Worth telling the user about: the folder moved, or a custom rule
    /// repeated an earlier one. Re-stating a default as-is is neither.
    pub fn is_notable(&self) -> bool {
        self.changes_folder() || self.is_duplicate_declaration()
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: '{}' was mapped to '{}' ({}), now '{}'",
            self.line, self.extension, self.previous, self.previous_origin, self.new
        )
    }
}

/// Overlays `parsed` rules onto `defaults`.
///
/// Every overwrite of an existing entry is recorded as a [`Conflict`], including
/// a rule that re-states a default with the same folder. Use
/// [`Conflict::is_notable`] to pick out the ones that change behavior.
///
/// # Examples
///
/// ```
/// use dirsort::defaults::DefaultMapping;
/// use dirsort::parser::parse_mapping_file;
/// use dirsort::resolver::resolve;
///
/// let (parsed, _) = parse_mapping_file("/dest\n.txt -> Notes\n");
/// let (mapping, conflicts) = resolve(&parsed, &DefaultMapping::builtin());
/// assert_eq!(mapping.get(".txt"), Some("Notes"));
/// assert_eq!(conflicts[0].previous, "Texts");
/// ```
pub fn resolve(
    parsed: &ParsedMapping,
    defaults: &DefaultMapping,
) -> (ResolvedMapping, Vec<Conflict>) {
    let mut entries: BTreeMap<String, (String, Origin)> = BTreeMap::new();
    for (ext, folder) in defaults.iter() {
        entries.insert(normalize_extension(ext), (folder.to_string(), Origin::Default));
    }

    let mut conflicts = Vec::new();
    for rule in &parsed.rules {
        let origin = Origin::Custom { line: rule.line };
        for ext in &rule.extensions {
            let ext = normalize_extension(ext);
            let previous = entries.insert(ext.clone(), (rule.folder.clone(), origin));

            if let Some((previous, previous_origin)) = previous {
                tracing::debug!(
                    extension = %ext,
                    previous = %previous,
                    new = %rule.folder,
                    line = rule.line,
                    "mapping overridden"
                );
                conflicts.push(Conflict {
                    extension: ext,
                    previous,
                    new: rule.folder.clone(),
                    previous_origin,
                    line: rule.line,
                });
            }
        }
    }

    let mapping = ResolvedMapping {
        entries: entries
            .into_iter()
            .map(|(ext, (folder, _))| (ext, folder))
            .collect(),
    };
    tracing::debug!(
        extensions = mapping.len(),
        conflicts = conflicts.len(),
        "resolved mapping"
    );
    (mapping, conflicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{MappingRule, parse_mapping_file};

    fn resolve_text(text: &str) -> (ResolvedMapping, Vec<Conflict>) {
        let (parsed, errors) = parse_mapping_file(text);
        assert!(errors.is_empty(), "unexpected parse errors: {:?}", errors);
        resolve(&parsed, &DefaultMapping::builtin())
    }

    #[test]
    fn test_example_mapping_keeps_untouched_defaults() {
        let (mapping, conflicts) = resolve_text("/dest\n.txt -> Texts\n.png, .jpg -> Photos\n");
        assert_eq!(mapping.get(".txt"), Some("Texts"));
        assert_eq!(mapping.get(".png"), Some("Photos"));
        assert_eq!(mapping.get(".jpg"), Some("Photos"));
        let overwritten: Vec<&str> = conflicts.iter().map(|c| c.extension.as_str()).collect();
        assert_eq!(overwritten, vec![".txt", ".png", ".jpg"]);
        assert!(conflicts.iter().all(|c| !c.is_notable()));

        for (ext, folder) in DefaultMapping::builtin().iter() {
            assert_eq!(mapping.get(ext), Some(folder), "default {} lost", ext);
        }
        assert_eq!(mapping.len(), DefaultMapping::builtin().len());
    }

    #[test]
    fn test_custom_rule_overrides_default() {
        let (mapping, conflicts) = resolve_text("/dest\n.PDF -> Papers\n");
        assert_eq!(mapping.get(".pdf"), Some("Papers"));
        assert_eq!(
            conflicts,
            vec![Conflict {
                extension: ".pdf".to_string(),
                previous: "Texts".to_string(),
                new: "Papers".to_string(),
                previous_origin: Origin::Default,
                line: 2,
            }]
        );
        assert!(!conflicts[0].is_duplicate_declaration());
        assert!(conflicts[0].is_notable());
    }

    #[test]
    fn test_later_custom_rule_wins() {
        let (mapping, conflicts) = resolve_text("/dest\n.log -> Logs\n.log -> Archive\n");
        assert_eq!(mapping.get(".log"), Some("Archive"));
        assert_eq!(conflicts.len(), 1);
        let conflict = &conflicts[0];
        assert_eq!(conflict.previous, "Logs");
        assert_eq!(conflict.new, "Archive");
        assert_eq!(conflict.previous_origin, Origin::Custom { line: 2 });
        assert_eq!(conflict.line, 3);
        assert!(conflict.is_duplicate_declaration());
        assert_eq!(
            conflict.to_string(),
            "line 3: '.log' was mapped to 'Logs' (line 2), now 'Archive'"
        );
    }

    #[test]
    fn test_repeated_custom_declaration_same_folder_is_flagged() {
        let (_, conflicts) = resolve_text("/dest\n.log -> Logs\n.log, .out -> Logs\n");
        assert_eq!(conflicts.len(), 1);
        assert!(conflicts[0].is_duplicate_declaration());
        assert!(!conflicts[0].changes_folder());
        assert!(conflicts[0].is_notable());
    }

    #[test]
    fn test_restating_a_default_is_recorded_but_not_notable() {
        let (_, conflicts) = resolve_text("/dest\n.txt, .md -> Texts\n");
        assert_eq!(conflicts.len(), 2);
        for conflict in &conflicts {
            assert_eq!(conflict.previous_origin, Origin::Default);
            assert_eq!(conflict.previous, conflict.new);
            assert!(!conflict.changes_folder());
            assert!(!conflict.is_notable());
        }
    }

    #[test]
    fn test_new_extension_is_added() {
        let (mapping, _) = resolve_text("/dest\n.iso -> Disk Images\n");
        assert_eq!(mapping.get(".iso"), Some("Disk Images"));
        assert_eq!(mapping.len(), DefaultMapping::builtin().len() + 1);
    }

    #[test]
    fn test_empty_defaults() {
        let parsed = ParsedMapping {
            destination: None,
            rules: vec![MappingRule {
                extensions: vec![".a".to_string()],
                folder: "A".to_string(),
                line: 1,
            }],
        };
        let (mapping, conflicts) = resolve(&parsed, &DefaultMapping::empty());
        assert_eq!(mapping.iter().collect::<Vec<_>>(), vec![(".a", "A")]);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_folders() {
        let (mapping, _) = resolve_text("/dest\n.iso -> Disk Images\n");
        let folders = mapping.folders();
        assert!(folders.contains("Disk Images"));
        assert!(folders.contains("Texts"));
        assert_eq!(folders.len(), 9);
    }

    #[test]
    fn test_to_json_is_flat_object() {
        let parsed = ParsedMapping {
            destination: None,
            rules: vec![MappingRule {
                extensions: vec![".b".to_string(), ".a".to_string()],
                folder: "Letters".to_string(),
                line: 2,
            }],
        };
        let (mapping, _) = resolve(&parsed, &DefaultMapping::empty());
        let json: serde_json::Value = serde_json::from_str(&mapping.to_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!({ ".a": "Letters", ".b": "Letters" }));

        let back: ResolvedMapping = serde_json::from_value(json).unwrap();
        assert_eq!(back, mapping);
    }

    #[test]
    fn test_resolved_mapping_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolvedMapping>();
    }
}
