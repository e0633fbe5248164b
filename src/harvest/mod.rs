//! The three catalog-facing pipeline stages.
//!
//! Each stage reads one directory and writes another:
//!
//! | stage | input | output |
//! |-------|-------|--------|
//! | [`discover_items`] | `*.txt` collection lists | `<collection>.txt` item lists |
//! | [`fetch_metadata`] | `<collection>.txt` item lists | `<item>.json` records |
//! | [`acquire_texts`] | `<item>.json` records | dated text files |
//!
//! An output that already exists is never requested again, so re-running a
//! stage only fetches what previous runs did not finish. Failures are written
//! to the run's error log and leave the entity pending for the next run.

mod items;
mod metadata;
pub mod record;
pub mod target;
mod texts;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::HarvestError;

pub use items::discover_items;
pub use metadata::fetch_metadata;
pub use record::{FileRecord, ItemRecord};
pub use target::DownloadTarget;
pub use texts::acquire_texts;

/// Per-stage tally of what happened to each entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageReport {
    /// Entities the stage found in its input.
    pub found: usize,
    /// Entities whose output was written during this run.
    pub fetched: usize,
    /// Entities whose output already existed.
    pub skipped: usize,
    /// Entities that failed and remain pending.
    pub failed: usize,
}

impl StageReport {
    /// Entities still pending after this run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.found.saturating_sub(self.fetched + self.skipped)
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} found, {} fetched, {} skipped, {} failed",
            self.found, self.fetched, self.skipped, self.failed
        )
    }
}

/// Path of the output named after entity `name` inside `dir`.
///
/// Names come from the catalog or user input and must stay inside `dir`.
pub(crate) fn entity_path(
    dir: &Path,
    name: &str,
    extension: &str,
) -> Result<PathBuf, HarvestError> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(HarvestError::invalid_name(name, "not a usable file name"));
    }
    if name.contains(['/', '\\']) {
        return Err(HarvestError::invalid_name(name, "contains a path separator"));
    }
    Ok(dir.join(format!("{name}.{extension}")))
}
