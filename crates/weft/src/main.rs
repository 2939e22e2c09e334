//! Weft CLI - transfer graphs from the command line.
//!
//! Builds (or fetches) cached transfer graphs and maintains the artifact
//! cache for a project directory laid out as `data/clean/*.jsonl` plus
//! `data/clean/graph_cache/`.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use weft::{DateRange, GraphKind};

mod cli;

/// Weft: transfer-graph construction and cache maintenance.
#[derive(Parser)]
#[command(name = "weft")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a transfer graph for a table slice, using the cache
    Build {
        /// Graph variant to build
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Activity threshold of the pre-built table to load
        #[arg(short, long, default_value = "0")]
        threshold: u32,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Always rebuild from the table, and do not persist the result
        #[arg(long)]
        no_cache: bool,
    },

    /// Show cache status for a parameter tuple
    Stats {
        /// Graph variant to inspect
        #[arg(short, long, value_enum)]
        kind: KindArg,

        /// Activity threshold of the table slice
        #[arg(short, long, default_value = "0")]
        threshold: u32,

        /// Inclusive start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Inclusive end date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
    },

    /// Scan a table tolerantly and report rows a strict load would reject
    Check {
        /// Activity threshold of the table to scan
        #[arg(short, long, default_value = "0")]
        threshold: u32,
    },

    /// Inspect or reset the artifact cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// List cached artifacts
    List,
    /// Remove all cached artifacts
    Clear,
}

/// Graph variant as a CLI flag value.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Unweighted,
    Weighted,
}

impl From<KindArg> for GraphKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Unweighted => GraphKind::Unweighted,
            KindArg::Weighted => GraphKind::Weighted,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    // Determine project root
    let root = match cli.root {
        Some(r) => r,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!(
                    "{}: failed to get current directory: {e}",
                    "error".red().bold()
                );
                return ExitCode::FAILURE;
            }
        },
    };

    // Run the appropriate command
    let result = match cli.command {
        Commands::Build {
            kind,
            threshold,
            start,
            end,
            no_cache,
        } => cli::build::run(
            &root,
            kind.into(),
            threshold,
            DateRange::new(start, end),
            !no_cache,
        ),
        Commands::Stats {
            kind,
            threshold,
            start,
            end,
        } => cli::stats::run(&root, kind.into(), threshold, DateRange::new(start, end)),
        Commands::Check { threshold } => cli::check::run(&root, threshold),
        Commands::Cache { action } => match action {
            CacheAction::List => cli::cache::run_list(&root),
            CacheAction::Clear => cli::cache::run_clear(&root),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", "error".red().bold());
            // Show cause chain for nested errors
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  {}: {cause}", "caused by".dimmed());
                source = std::error::Error::source(cause);
            }
            ExitCode::FAILURE
        }
    }
}
