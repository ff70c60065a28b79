//! Zinc CLI - command-line tools for zinc incremental-compilation analyses.
//!
//! Provides `zinc check` for validating analysis files, `zinc rewrite` for
//! canonicalizing and rebasing them, `zinc merge` and `zinc split` for
//! combining and partitioning analyses, `zinc json` for inspection, and
//! `zinc anonymize` for producing shareable fixtures.

#![warn(missing_docs)]

mod anonymize;
mod check;
mod json;
mod logging;
mod merge;
mod pipeline;
mod rewrite;
mod split;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

/// Zinc - analysis file tooling for incremental Scala builds.
#[derive(Parser, Debug)]
#[command(name = "zinc", version, about = "Zinc analysis tools")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `zinc.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse analysis files and report their contents.
    Check(CheckArgs),
    /// Re-write an analysis canonically, applying configured rebasings.
    Rewrite(RewriteArgs),
    /// Merge analyses of disjoint source sets into one.
    Merge(MergeArgs),
    /// Split an analysis by the configured partitions.
    Split(SplitArgs),
    /// Export an analysis as JSON.
    Json(JsonArgs),
    /// Redact names and blobs in analysis files.
    Anonymize(AnonymizeArgs),
}

/// Arguments for the `zinc check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Analysis files to check.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the `zinc rewrite` subcommand.
#[derive(Parser, Debug)]
pub struct RewriteArgs {
    /// Analysis file to read.
    pub input: PathBuf,
    /// Analysis file to write.
    pub output: PathBuf,
}

/// Arguments for the `zinc merge` subcommand.
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Analysis files to merge.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// Merged analysis file to write.
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments for the `zinc split` subcommand.
#[derive(Parser, Debug)]
pub struct SplitArgs {
    /// Analysis file to split.
    pub input: PathBuf,
}

/// Arguments for the `zinc json` subcommand.
#[derive(Parser, Debug)]
pub struct JsonArgs {
    /// Analysis file to export.
    pub input: PathBuf,
    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `zinc anonymize` subcommand.
#[derive(Parser, Debug)]
pub struct AnonymizeArgs {
    /// Analysis files to anonymize; each is written to `<file>.anon`.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Whitespace-separated replacement word list (overrides the configuration).
    #[arg(long)]
    pub words: Option<PathBuf>,
    /// Seed for word order and generated blobs (overrides the configuration).
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    logging::init(&global);

    let result = match cli.command {
        Command::Check(ref args) => check::run(args, &global),
        Command::Rewrite(ref args) => rewrite::run(args, &global),
        Command::Merge(ref args) => merge::run(args, &global),
        Command::Split(ref args) => split::run(args, &global),
        Command::Json(ref args) => json::run(args, &global),
        Command::Anonymize(ref args) => anonymize::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
