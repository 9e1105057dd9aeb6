//! Output formatting and styling module.
//!
//! All user-facing output goes through [`OutputFormatter`]: coloured status
//! lines, the progress bar used while moving files, the sort summary and the
//! directory statistics report. Diagnostics for developers go to `tracing`.

use crate::parser::ParseError;
use crate::planner::SortPlan;
use crate::resolver::Conflict;
use crate::stats::DirectoryStats;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Width of the label column in the statistics report.
const STATS_LABEL_WIDTH: usize = 30;

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Formats a byte count for humans.
///
/// The value is divided by 1024 while it is at least 1000, and printed with
/// one decimal place.
///
/// ```
/// use dirsort::output::format_byte_size;
///
/// assert_eq!(format_byte_size(999), "999.0B");
/// assert_eq!(format_byte_size(1536), "1.5KB");
/// ```
pub fn format_byte_size(bytes: u64) -> String {
    let mut size = bytes as f64;
    for unit in SIZE_UNITS {
        if size < 1000.0 {
            return format!("{:.1}{}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.1}PB", size)
}

/// Manages all CLI output with consistent styling and formatting.
///
/// This struct provides methods for:
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Progress bars for moves
/// - The sort summary and statistics report
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Sorting complete");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, to stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for moving `total` files.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("done");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints every parse error, one per line.
    pub fn parse_errors(errors: &[ParseError]) {
        Self::error(&format!(
            "Mapping file has {} error{}:",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" }
        ));
        for error in errors {
            eprintln!("  {}", error);
        }
    }

    /// Prints notable resolution conflicts as warnings.
    pub fn conflicts(conflicts: &[Conflict]) {
        for conflict in conflicts.iter().filter(|c| c.is_notable()) {
            Self::warning(&conflict.to_string());
        }
    }

    /// Prints where every file would go without moving anything.
    pub fn plan_preview(plan: &SortPlan<'_>) {
        Self::dry_run_notice(&format!("{} files would be sorted:", plan.len()));
        for entry in plan.iter() {
            match entry.target.folder() {
                Some(folder) => println!("  {} -> {}/", entry.file.name, folder),
                None => println!("  {} {}", entry.file.name, "(left in place)".dimmed()),
            }
        }
    }

    /// Prints a summary table of file counts per folder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Photos".to_string(), 15);
    /// counts.insert("Texts".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let max_folder_len = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!(
            "{:<width$} | {}",
            "Folder".bold(),
            "Files".bold(),
            width = max_folder_len
        );
        println!("{}", "-".repeat(max_folder_len + 10));

        for (folder, count) in folder_counts {
            println!(
                "{:<width$} | {} {}",
                folder,
                count.to_string().green(),
                file_word(*count),
                width = max_folder_len
            );
        }

        println!("{}", "-".repeat(max_folder_len + 10));
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total_files.to_string().green().bold(),
            file_word(total_files),
            width = max_folder_len
        );
    }

    /// Prints the statistics report.
    pub fn stats(stats: &DirectoryStats) {
        for (label, value) in stats_lines(stats) {
            println!("{}{}", label.bold(), value);
        }
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

fn file_word(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}

/// Label and value pairs of the statistics report. Labels are padded.
fn stats_lines(stats: &DirectoryStats) -> Vec<(String, String)> {
    let label = |text: &str| format!("{:<width$}", text, width = STATS_LABEL_WIDTH);
    let modified = stats
        .modified
        .map(|time| time.format("%a %b %e %H:%M:%S %Y").to_string())
        .unwrap_or_else(|| "unknown".to_string());

    let mut lines = vec![
        (label("Directory Name:"), stats.name.clone()),
        (label("Time last modified:"), modified),
        (label("Size of directory:"), format_byte_size(stats.total_size)),
        (label("Number of files:"), stats.file_count.to_string()),
        (
            label("Number of sub-directories:"),
            stats.subdirectory_count.to_string(),
        ),
    ];

    let describe = |file: &crate::file_record::FileRecord| {
        format!("{} ({})", file.name, format_byte_size(file.size))
    };
    match stats.largest.as_slice() {
        [] => lines.push((label("Largest file:"), "(none)".to_string())),
        [only] => lines.push((label("Largest file:"), describe(only))),
        files => {
            lines.push((label("Largest files:"), String::new()));
            for (rank, file) in files.iter().enumerate() {
                lines.push((label(&format!("  {}.", rank + 1)), describe(file)));
            }
        }
    }
    lines
}
