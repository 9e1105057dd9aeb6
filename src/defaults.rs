//! Built-in extension to folder table.
//!
//! The default table is an ordinary value handed to the resolver. Callers can
//! start from [`DefaultMapping::builtin`], extend it, or build their own from a
//! configuration file.
//!
//! # Examples
//!
//! ```
//! use dirsort::defaults::DefaultMapping;
//!
//! let defaults = DefaultMapping::builtin();
//! assert_eq!(defaults.folder_for(".png"), Some("Photos"));
//! assert_eq!(defaults.folder_for("MP3"), Some("Music"));
//! assert_eq!(defaults.folder_for(".unknown"), None);
//! ```

/// Lowercases an extension and makes sure it starts with a dot.
///
/// An empty input stays empty; it stands for "no extension".
///
/// ```
/// use dirsort::defaults::normalize_extension;
///
/// assert_eq!(normalize_extension("TXT"), ".txt");
/// assert_eq!(normalize_extension(".Tar.GZ"), ".tar.gz");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let lower = ext.trim().to_lowercase();
    if lower.is_empty() || lower.starts_with('.') {
        lower
    } else {
        format!(".{}", lower)
    }
}

/// An ordered list of extension to folder assignments.
///
/// When an extension is assigned twice, the later assignment wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMapping {
    entries: Vec<(String, String)>,
}

impl DefaultMapping {
    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The standard table shipped with dirsort.
    pub fn builtin() -> Self {
        let mut mapping = Self::empty();
        mapping.populate_standard_mappings();
        mapping
    }

    /// Builds a table from `(folder, extensions)` pairs.
    pub fn from_folders<I, F, E, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = (F, E)>,
        F: AsRef<str>,
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::empty();
        for (folder, extensions) in folders {
            mapping.add_folder(folder.as_ref(), extensions);
        }
        mapping
    }

    fn populate_standard_mappings(&mut self) {
        self.add_folder("Texts", [".txt", ".md", ".rtf", ".doc", ".docx", ".pdf"]);
        self.add_folder(
            "Photos",
            [".png", ".jpeg", ".jpg", ".gif", ".bmp", ".svg", ".tiff", ".webp"],
        );
        self.add_folder("Videos", [".mp4", ".mkv", ".avi", ".mov", ".flv", ".wmv"]);
        self.add_folder("Music", [".mp3", ".wav", ".aac", ".flac", ".ogg"]);
        self.add_folder("Compressed", [".zip", ".rar", ".7z", ".tar", ".gz"]);
        self.add_folder(
            "Coding Files",
            [
                ".py", ".java", ".cpp", ".c", ".cs", ".js", ".html", ".css", ".sh", ".rb", ".php",
                ".swift", ".go",
            ],
        );
        self.add_folder("Spreadsheets", [".xls", ".xlsx", ".csv", ".ods"]);
        self.add_folder("Presentations", [".ppt", ".pptx", ".odp"]);
    }

    /// Assigns every extension in `extensions` to `folder`.
    pub fn add_folder<E, S>(&mut self, folder: &str, extensions: E)
    where
        E: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            self.add_extension_mapping(ext.as_ref(), folder);
        }
    }

    /// Assigns one extension to a folder. Blank extensions are ignored.
    pub fn add_extension_mapping(&mut self, ext: &str, folder: &str) {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return;
        }
        self.entries.push((ext, folder.to_string()));
    }

    /// Looks up the folder for an extension, case-insensitively.
    pub fn folder_for(&self, ext: &str) -> Option<&str> {
        let ext = normalize_extension(ext);
        self.entries
            .iter()
            .rev()
            .find(|(candidate, _)| *candidate == ext)
            .map(|(_, folder)| folder.as_str())
    }

    /// `(extension, folder)` pairs in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(ext, folder)| (ext.as_str(), folder.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DefaultMapping {
    fn default() -> Self {
        Self::builtin()
    }
}
