//! Item discovery: one item list per collection.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::instrument;

use super::{StageReport, entity_path};
use crate::catalog::Catalog;
use crate::collections::load_collection_dir;
use crate::context::RunContext;
use crate::error::HarvestError;
use crate::storage::{artifact_exists, ensure_dir, write_atomic};

/// Writes `<collection>.txt` into `output_dir` for every collection listed
/// under `input_dir` that does not have one yet.
///
/// Each list holds the collection's deduplicated, sorted item identifiers,
/// one per line. A search that fails or returns no identifiers leaves the
/// collection without a list so the next run asks again.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] only when `output_dir` cannot be created.
/// Per-collection failures are logged to `ctx` and counted in the report.
#[instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub async fn discover_items(
    catalog: &dyn Catalog,
    input_dir: &Path,
    output_dir: &Path,
    ctx: &mut RunContext,
) -> Result<StageReport, HarvestError> {
    ensure_dir(output_dir).await?;
    let collections = load_collection_dir(input_dir, ctx).await;

    let mut report = StageReport {
        found: collections.len(),
        ..StageReport::default()
    };
    let mut new_items = 0usize;

    for collection in &collections {
        let list_path = match entity_path(output_dir, collection, "txt") {
            Ok(path) => path,
            Err(e) => {
                ctx.failure(format!("Could not fetch collection: {collection}."), &e);
                report.failed += 1;
                continue;
            }
        };
        if artifact_exists(&list_path).await {
            ctx.info(format!("Skipping {collection}, already fetched."));
            report.skipped += 1;
            continue;
        }

        ctx.info(format!("Getting items from {collection}..."));
        let outcome = match search_items(catalog, collection).await {
            Ok(items) => write_atomic(&list_path, items.join("\n").as_bytes())
                .await
                .map(|()| items.len()),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(count) => {
                new_items += count;
                report.fetched += 1;
            }
            Err(e) => {
                ctx.failure(format!("Could not fetch collection: {collection}."), &e);
                report.failed += 1;
            }
        }
    }

    ctx.info(format!("Found {new_items} new items."));
    Ok(report)
}

async fn search_items(
    catalog: &dyn Catalog,
    collection: &str,
) -> Result<Vec<String>, HarvestError> {
    let response = catalog.search_collection(collection).await?;
    let items: BTreeSet<&str> = response.identifiers().filter(|id| !id.is_empty()).collect();
    if items.is_empty() {
        return Err(HarvestError::empty_result(
            collection,
            "search returned no identifiers",
        ));
    }
    Ok(items.into_iter().map(str::to_string).collect())
}
