//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

/// Harvest public-domain texts from a digital-library catalog.
///
/// Each stage reads one directory and writes the next; re-running a stage
/// only fetches what earlier runs did not finish.
#[derive(Parser, Debug)]
#[command(name = "harvester")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory for download.log and error.log [default: current directory]
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Catalog base URL [default: https://archive.org]
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// HTTP connect timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,

    /// HTTP request timeout in seconds (1-3600)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub read_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Pipeline stages.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the items of every collection named in the input directory
    Items(StageDirs),
    /// Fetch one metadata record per listed item
    Metadata(StageDirs),
    /// Download the dated OCR text of every recorded item
    Texts(StageDirs),
    /// Clean and tokenize downloaded texts
    Normalize(StageDirs),
    /// Run every stage over a standard directory layout
    Run(RunArgs),
}

/// Input and output directories of one stage.
#[derive(ClapArgs, Debug)]
pub struct StageDirs {
    /// Directory the stage reads
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory the stage writes
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Arguments of the chained run.
#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Root holding collections/, items/, metadata/ and corpus/
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Stop after downloading, without normalizing
    #[arg(long)]
    pub skip_normalize: bool,
}
