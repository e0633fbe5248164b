//! Text acquisition: download the OCR text of every dated item.

use std::path::Path;

use tokio::fs;
use tracing::{debug, instrument};

use super::StageReport;
use super::record::ItemRecord;
use super::target::DownloadTarget;
use crate::catalog::Catalog;
use crate::context::RunContext;
use crate::error::HarvestError;
use crate::storage::{artifact_exists, ensure_dir, list_files_with_extension, part_path};

/// Format label of the catalog's plain OCR text.
pub const TEXT_FORMAT: &str = "DjVuTXT";

/// Downloads the `DjVuTXT` file of every record in `input_dir` into
/// `output_dir`, under a dated name (see [`DownloadTarget`]).
///
/// Runs in two passes: all records are read and every target computed first,
/// then the targets are downloaded one at a time. Files whose item has no
/// resolvable year-month are dropped with a warning.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] only when `output_dir` cannot be created.
#[instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub async fn acquire_texts(
    catalog: &dyn Catalog,
    input_dir: &Path,
    output_dir: &Path,
    ctx: &mut RunContext,
) -> Result<StageReport, HarvestError> {
    ensure_dir(output_dir).await?;
    let targets = collect_targets(input_dir, ctx).await;
    let mut report = StageReport {
        found: targets.len(),
        ..StageReport::default()
    };

    for target in &targets {
        let dest = output_dir.join(&target.file_name);
        if artifact_exists(&dest).await {
            ctx.info(format!("Skipping {}, already downloaded.", target.file_name));
            report.skipped += 1;
            continue;
        }

        ctx.info(format!("Downloading {}...", target.file_name));
        match download_into_place(catalog, &target.url, &dest).await {
            Ok(bytes) => {
                debug!(bytes, file = %target.file_name, "text stored");
                report.fetched += 1;
            }
            Err(e) => {
                ctx.failure(format!("Could not download {}.", target.url), &e);
                report.failed += 1;
            }
        }
    }

    ctx.info(format!("Downloaded {} new files.", report.fetched));
    Ok(report)
}

/// First pass: read every record and compute its text targets.
async fn collect_targets(input_dir: &Path, ctx: &mut RunContext) -> Vec<DownloadTarget> {
    let records = match list_files_with_extension(input_dir, "json").await {
        Ok(records) => records,
        Err(e) => {
            ctx.failure(
                format!("Could not list metadata records in {}.", input_dir.display()),
                &e,
            );
            return Vec::new();
        }
    };

    let mut targets = Vec::new();
    for path in records {
        let record = match read_record(&path).await {
            Ok(record) => record,
            Err(e) => {
                ctx.failure(format!("Could not read record {}.", path.display()), &e);
                continue;
            }
        };

        for file in record
            .files
            .iter()
            .filter(|file| file.format.as_deref() == Some(TEXT_FORMAT))
        {
            match DownloadTarget::for_file(&record, file) {
                Some(target) => targets.push(target),
                None => ctx.warn(format!(
                    "No date found for {}, skipping {}.",
                    record.identifier, file.name
                )),
            }
        }
    }
    targets
}

async fn read_record(path: &Path) -> Result<ItemRecord, HarvestError> {
    let raw = fs::read(path).await.map_err(|e| HarvestError::io(path, e))?;
    serde_json::from_slice(&raw).map_err(|e| HarvestError::decode(path.display().to_string(), e))
}

/// Streams `url` into a hidden part file beside `dest` and renames it into
/// place once complete.
async fn download_into_place(
    catalog: &dyn Catalog,
    url: &str,
    dest: &Path,
) -> Result<u64, HarvestError> {
    let part = part_path(dest);
    let bytes = catalog.download(url, &part).await?;
    if let Err(e) = fs::rename(&part, dest).await {
        let _ = fs::remove_file(&part).await;
        return Err(HarvestError::io(dest, e));
    }
    Ok(bytes)
}
