//! Command-line interface module for dirsort.
//!
//! This module handles:
//! - Argument parsing
//! - Loading and resolving the mapping file
//! - Statistics, dry-run previews and sorting
//! - Reporting results through [`OutputFormatter`]

use crate::config::Config;
use crate::defaults::DefaultMapping;
use crate::file_organizer::FileOrganizer;
use crate::lexer::tokenize;
use crate::output::OutputFormatter;
use crate::parser::{ParsedMapping, parse};
use crate::planner::plan;
use crate::resolver::{Conflict, ResolvedMapping, resolve};
use crate::stats::DirectoryStats;
use crate::walker::scan_directory;
use clap::Parser;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Sort the files of a directory into folders by extension.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Args {
    /// Mapping file; its first line names the directory to sort
    #[arg(short, long, value_name = "MAPPING")]
    pub file: Option<PathBuf>,

    /// Directory to work on; overrides the mapping file's destination
    #[arg(short, long, value_name = "DIR")]
    pub path: Option<PathBuf>,

    /// Print directory statistics
    #[arg(long)]
    pub stats: bool,

    /// Move files into their folders
    #[arg(long)]
    pub sort: bool,

    /// Show where files would go without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Number of largest files to report with --stats
    #[arg(long, value_name = "K")]
    pub top: Option<usize>,

    /// Print the resolved extension mapping as JSON
    #[arg(long)]
    pub export_mapping: bool,

    /// Configuration file to use instead of the default locations
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    fn has_action(&self) -> bool {
        self.stats || self.sort || self.dry_run || self.export_mapping
    }
}

/// The directory to work on and the mapping that applies to it.
#[derive(Debug)]
struct Session {
    directory: PathBuf,
    mapping: ResolvedMapping,
    conflicts: Vec<Conflict>,
    /// The mapping file, when it lives in `directory`'s tree.
    rule_file: Option<PathBuf>,
}

/// Runs the CLI application with parsed arguments.
///
/// # Examples
///
/// ```no_run
/// use clap::Parser;
/// use dirsort::cli::{Args, run_cli};
///
/// let args = Args::parse_from(["dirsort", "--path", "/path/to/directory", "--stats"]);
/// match run_cli(&args) {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(args: &Args) -> Result<(), String> {
    let config = Config::load(args.config.as_deref())
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let filters = config
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let session = prepare_session(args, &config.default_mapping())?;
    OutputFormatter::conflicts(&session.conflicts);

    if !args.has_action() {
        OutputFormatter::info(&format!(
            "Nothing to do for {}. Pass --stats, --sort, --dry-run or --export-mapping.",
            session.directory.display()
        ));
        return Ok(());
    }

    if args.export_mapping {
        let json = session
            .mapping
            .to_json()
            .map_err(|e| format!("Error exporting mapping: {}", e))?;
        OutputFormatter::plain(&json);
    }

    if !(args.stats || args.sort || args.dry_run) {
        return Ok(());
    }

    let listing = scan_directory(&session.directory, &filters).map_err(|e| e.to_string())?;

    if args.stats {
        let largest = args.top.unwrap_or(config.stats.largest);
        OutputFormatter::header("STATISTICS");
        OutputFormatter::stats(&DirectoryStats::collect(
            &session.directory,
            &listing,
            largest,
        ));
    }

    let sort_plan = plan(
        &listing.files,
        &session.mapping,
        session.rule_file.as_deref(),
    );

    if args.dry_run {
        OutputFormatter::plan_preview(&sort_plan);
        let folder_counts = sort_plan.folder_counts();
        OutputFormatter::summary_table(&folder_counts, folder_counts.values().sum());
        let unmapped = sort_plan.unmapped_count();
        if unmapped > 0 {
            OutputFormatter::plain(&format!("{} files would be left unsorted", unmapped));
        }
        OutputFormatter::dry_run_notice("No files were modified.");
        return Ok(());
    }

    if args.sort {
        OutputFormatter::info(&format!(
            "Sorting contents of: {}",
            session.directory.display()
        ));
        let progress = OutputFormatter::create_progress_bar(sort_plan.mapped().count() as u64);
        let report = FileOrganizer::execute_plan(&session.directory, &sort_plan, |entry, result| {
            progress.inc(1);
            if let Err(e) = result {
                progress.suspend(|| {
                    OutputFormatter::error(&format!("{}: {}", entry.file.name, e));
                });
            }
        });
        progress.finish_and_clear();

        let mut folder_counts: BTreeMap<String, usize> = BTreeMap::new();
        for operation in &report.moved {
            *folder_counts.entry(operation.folder.clone()).or_insert(0) += 1;
        }
        OutputFormatter::summary_table(&folder_counts, report.moved.len());

        if report.unmapped > 0 {
            OutputFormatter::plain(&format!("{} files left unsorted", report.unmapped));
        }
        if report.is_complete_success() {
            OutputFormatter::success("Sorting complete.");
        } else {
            OutputFormatter::warning(&format!(
                "{} files could not be moved. Please review errors above.",
                report.failed.len()
            ));
        }
    }

    Ok(())
}

/// Works out the directory and mapping from `--file` and `--path`.
fn prepare_session(args: &Args, defaults: &DefaultMapping) -> Result<Session, String> {
    let (parsed, rule_file) = match &args.file {
        Some(file) => (load_mapping_file(file)?, Some(file.as_path())),
        None => (ParsedMapping::default(), None),
    };

    let directory = match (&args.path, &parsed.destination) {
        (Some(path), _) => path.clone(),
        (None, Some(destination)) => PathBuf::from(destination),
        (None, None) => return Err("Either --file or --path must be given".to_string()),
    };
    if !directory.is_dir() {
        return Err(format!(
            "Destination directory not found: {}",
            directory.display()
        ));
    }
    let directory = directory
        .canonicalize()
        .map_err(|e| format!("Error resolving {}: {}", directory.display(), e))?;
    let rule_file = rule_file.and_then(|file| file.canonicalize().ok());

    let (mapping, conflicts) = resolve(&parsed, defaults);
    Ok(Session {
        directory,
        mapping,
        conflicts,
        rule_file,
    })
}

/// Reads and strictly parses a mapping file, printing every error found.
fn load_mapping_file(path: &Path) -> Result<ParsedMapping, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Error reading mapping file {}: {}", path.display(), e))?;

    parse(&tokenize(&text)).map_err(|errors| {
        OutputFormatter::parse_errors(errors.errors());
        format!(
            "Mapping file {} is invalid; no files were moved",
            path.display()
        )
    })
}
