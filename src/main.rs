use clap::Parser;
use dirsort::cli::{Args, run_cli};
use dirsort::output::OutputFormatter;
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run_cli(&args) {
        OutputFormatter::error(&e);
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
