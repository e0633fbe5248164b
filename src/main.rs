//! CLI entry point for the harvester tool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use harvester_core::{
    ArchiveClient, CONNECT_TIMEOUT_SECS, Catalog, DEFAULT_CATALOG_URL, READ_TIMEOUT_SECS,
    RunContext, StageReport, TextNormalizer, acquire_texts, discover_items, fetch_metadata,
    normalize_corpus,
};
use tracing::{debug, info};

mod cli;

use cli::{Args, Command, RunArgs, StageDirs};

/// Effective settings after applying defaults to unset CLI flags.
#[derive(Debug)]
struct Settings {
    catalog_url: String,
    log_dir: PathBuf,
    connect_timeout_secs: u64,
    read_timeout_secs: u64,
}

impl Settings {
    fn resolve(args: &Args) -> Self {
        Self {
            catalog_url: args
                .catalog_url
                .clone()
                .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
            log_dir: args.log_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
            connect_timeout_secs: args.connect_timeout.unwrap_or(CONNECT_TIMEOUT_SECS),
            read_timeout_secs: args.read_timeout.unwrap_or(READ_TIMEOUT_SECS),
        }
    }

    fn catalog(&self) -> Result<ArchiveClient> {
        ArchiveClient::with_options(
            &self.catalog_url,
            self.connect_timeout_secs,
            self.read_timeout_secs,
        )
        .with_context(|| format!("Failed to set up catalog client for '{}'", self.catalog_url))
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");
    let settings = Settings::resolve(&args);
    debug!(?settings, "settings resolved");

    let mut ctx = RunContext::open(&settings.log_dir).with_context(|| {
        format!("Failed to open logs in '{}'", settings.log_dir.display())
    })?;

    match &args.command {
        Command::Items(dirs) => {
            let catalog = settings.catalog()?;
            let report = discover_items(&catalog, &dirs.input, &dirs.output, &mut ctx)
                .await
                .context("Item discovery failed")?;
            log_report("items", &report);
        }
        Command::Metadata(dirs) => {
            let catalog = settings.catalog()?;
            let report = fetch_metadata(&catalog, &dirs.input, &dirs.output, &mut ctx)
                .await
                .context("Metadata retrieval failed")?;
            log_report("metadata", &report);
        }
        Command::Texts(dirs) => {
            let catalog = settings.catalog()?;
            let report = acquire_texts(&catalog, &dirs.input, &dirs.output, &mut ctx)
                .await
                .context("Text acquisition failed")?;
            log_report("texts", &report);
        }
        Command::Normalize(StageDirs { input, output }) => {
            let report = normalize_corpus(&TextNormalizer::new(), input, output, &mut ctx)
                .await
                .context("Normalization failed")?;
            log_report("normalize", &report);
        }
        Command::Run(run) => {
            let catalog = settings.catalog()?;
            run_pipeline(&catalog, run, &mut ctx).await?;
        }
    }

    ctx.finish().context("Failed to flush logs")?;
    Ok(())
}

/// Chains every stage over
/// `<root>/{collections,items,metadata,corpus/raw,corpus/normalized}`.
async fn run_pipeline(
    catalog: &dyn Catalog,
    run: &RunArgs,
    ctx: &mut RunContext,
) -> Result<()> {
    let root: &Path = &run.root;
    let collections = root.join("collections");
    let items = root.join("items");
    let metadata = root.join("metadata");
    let raw = root.join("corpus").join("raw");
    let normalized = root.join("corpus").join("normalized");

    info!(root = %root.display(), "Harvest starting");

    let report = discover_items(catalog, &collections, &items, ctx)
        .await
        .context("Item discovery failed")?;
    log_report("items", &report);

    let report = fetch_metadata(catalog, &items, &metadata, ctx)
        .await
        .context("Metadata retrieval failed")?;
    log_report("metadata", &report);

    let report = acquire_texts(catalog, &metadata, &raw, ctx)
        .await
        .context("Text acquisition failed")?;
    log_report("texts", &report);

    if !run.skip_normalize {
        let report = normalize_corpus(&TextNormalizer::new(), &raw, &normalized, ctx)
            .await
            .context("Normalization failed")?;
        log_report("normalize", &report);
    }
    Ok(())
}

fn log_report(stage: &str, report: &StageReport) {
    info!(
        stage,
        found = report.found,
        fetched = report.fetched,
        skipped = report.skipped,
        failed = report.failed,
        pending = report.pending(),
        "Stage finished"
    );
}
