//! Metadata retrieval: one JSON record per item.

use std::path::Path;

use tokio::fs;
use tracing::instrument;

use super::record::ItemRecord;
use super::{StageReport, entity_path};
use crate::catalog::Catalog;
use crate::context::RunContext;
use crate::error::HarvestError;
use crate::storage::{artifact_exists, ensure_dir, list_files_with_extension, stem_of, write_atomic};

/// Writes `<item>.json` into `output_dir` for every item listed in the
/// `<collection>.txt` files of `input_dir` that has no record yet.
///
/// Records without any retained file are treated as failures and not written.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] only when `output_dir` cannot be created.
#[instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub async fn fetch_metadata(
    catalog: &dyn Catalog,
    input_dir: &Path,
    output_dir: &Path,
    ctx: &mut RunContext,
) -> Result<StageReport, HarvestError> {
    ensure_dir(output_dir).await?;
    let mut report = StageReport::default();

    let lists = match list_files_with_extension(input_dir, "txt").await {
        Ok(lists) => lists,
        Err(e) => {
            ctx.failure(
                format!("Could not list item files in {}.", input_dir.display()),
                &e,
            );
            return Ok(report);
        }
    };

    for list in lists {
        let collection = stem_of(&list);
        let raw = match fs::read_to_string(&list).await {
            Ok(raw) => raw,
            Err(e) => {
                ctx.failure(
                    format!("Could not read item list for {collection}."),
                    &HarvestError::io(&list, e),
                );
                continue;
            }
        };

        for item in raw.lines().map(str::trim).filter(|line| !line.is_empty()) {
            report.found += 1;
            match fetch_item(catalog, &collection, item, output_dir, ctx).await {
                Ok(true) => report.fetched += 1,
                Ok(false) => report.skipped += 1,
                Err(e) => {
                    ctx.failure(format!("Could not fetch item: {item}."), &e);
                    report.failed += 1;
                }
            }
        }
    }

    ctx.info(format!("Fetched {} new metadata records.", report.fetched));
    Ok(report)
}

/// Fetches and persists one record. `Ok(false)` means it already existed.
async fn fetch_item(
    catalog: &dyn Catalog,
    collection: &str,
    item: &str,
    output_dir: &Path,
    ctx: &mut RunContext,
) -> Result<bool, HarvestError> {
    let record_path = entity_path(output_dir, item, "json")?;
    if artifact_exists(&record_path).await {
        ctx.info(format!("Skipping {item}, already fetched."));
        return Ok(false);
    }

    ctx.info(format!("Getting metadata for {item}..."));
    let response = catalog.item_metadata(item).await?;
    let record = ItemRecord::from_response(collection, &response, catalog);
    if record.files.is_empty() {
        return Err(HarvestError::empty_result(item, "no text or PDF files"));
    }

    let json = record
        .to_pretty_json()
        .map_err(|e| HarvestError::encode(&record_path, e))?;
    write_atomic(&record_path, &json).await?;
    Ok(true)
}
