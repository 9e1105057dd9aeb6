//! dirsort - sort the files of a directory into folders by extension.
//!
//! A small mapping file names the directory to sort and overrides the
//! built-in extension table:
//!
//! ```text
//! /home/user/Downloads
//! .txt, .md -> Notes
//! .log -> Logs        # comments are allowed
//! ```
//!
//! The pipeline is [`tokenize`] → [`parse`] → [`resolve`] → [`plan`], all
//! pure. [`FileOrganizer`] then performs the moves, and [`TopKSelector`]
//! backs the largest-files statistic.

pub mod cli;
pub mod config;
pub mod defaults;
pub mod file_organizer;
pub mod file_record;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod planner;
pub mod resolver;
pub mod stats;
pub mod top_k;
pub mod walker;

pub use config::{CompiledFilters, Config, ConfigError};
pub use defaults::DefaultMapping;
pub use file_organizer::{FileOrganizer, MoveReport, OrganizeError};
pub use file_record::FileRecord;
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{
    MappingRule, ParseError, ParseErrors, ParsedMapping, parse, parse_mapping_file, parse_partial,
};
pub use planner::{SortPlan, SortPlanEntry, Target, plan};
pub use resolver::{Conflict, ResolvedMapping, resolve};
pub use stats::DirectoryStats;
pub use top_k::{TopKSelector, Weighted};

pub use cli::{Args, run_cli};
