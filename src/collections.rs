//! Loading of user-supplied collection lists.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::Path;

use tokio::fs;

use crate::context::RunContext;
use crate::error::HarvestError;
use crate::storage::list_files_with_extension;

/// Reads newline-delimited collection names from a single file.
///
/// Names are whitespace-trimmed and blank lines dropped. A missing file is a
/// warning and yields an empty list; an empty result is reported in the error
/// log but left for the caller to act on. No deduplication happens here.
pub async fn load_collections(path: &Path, ctx: &mut RunContext) -> Vec<String> {
    let collections = match fs::read_to_string(path).await {
        Ok(raw) => parse_collection_lines(&raw),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            ctx.warn(format!("No collections file found at {}.", path.display()));
            Vec::new()
        }
        Err(e) => {
            ctx.failure(
                format!("Could not read collections file {}.", path.display()),
                &HarvestError::io(path, e),
            );
            Vec::new()
        }
    };

    if collections.is_empty() {
        ctx.error(format!("No collections specified in {}!", path.display()));
    }
    collections
}

/// Aggregates every `*.txt` collection list in `dir` into one sorted set.
pub async fn load_collection_dir(dir: &Path, ctx: &mut RunContext) -> BTreeSet<String> {
    let files = match list_files_with_extension(dir, "txt").await {
        Ok(files) => files,
        Err(e) => {
            ctx.failure(
                format!("Could not list collection files in {}.", dir.display()),
                &e,
            );
            return BTreeSet::new();
        }
    };

    let mut collections = BTreeSet::new();
    for file in files {
        collections.extend(load_collections(&file, ctx).await);
    }
    ctx.info(format!("Loaded {} total collections.", collections.len()));
    collections
}

fn parse_collection_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_collection_lines_trims_and_drops_blanks() {
        let parsed = parse_collection_lines("  alpha \n\nbeta\r\n   \ngamma");
        assert_eq!(parsed, vec!["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_load_collections_keeps_duplicates() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("list.txt");
        std::fs::write(&file, "b\na\nb\n").unwrap();
        let mut ctx = RunContext::open(&temp.path().join("logs")).unwrap();

        let loaded = load_collections(&file, &mut ctx).await;
        assert_eq!(loaded, vec!["b", "a", "b"]);
    }

    #[tokio::test]
    async fn test_load_collections_missing_file_is_empty_and_reported() {
        let temp = TempDir::new().unwrap();
        let mut ctx = RunContext::open(temp.path()).unwrap();

        let loaded = load_collections(&temp.path().join("absent.txt"), &mut ctx).await;
        assert!(loaded.is_empty());

        let error_log = std::fs::read_to_string(ctx.error_log_path()).unwrap();
        let run_log = std::fs::read_to_string(ctx.run_log_path()).unwrap();
        assert!(run_log.contains("WARNING: No collections file found"));
        assert!(error_log.contains("No collections specified"));
    }

    #[tokio::test]
    async fn test_load_collection_dir_dedups_and_sorts() {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("collections");
        std::fs::create_dir(&input).unwrap();
        std::fs::write(input.join("one.txt"), "zeta\nalpha\n").unwrap();
        std::fs::write(input.join("two.txt"), "alpha\nmid\n").unwrap();
        std::fs::write(input.join("notes.md"), "ignored\n").unwrap();
        let mut ctx = RunContext::open(&temp.path().join("logs")).unwrap();

        let loaded = load_collection_dir(&input, &mut ctx).await;
        let loaded: Vec<&str> = loaded.iter().map(String::as_str).collect();
        assert_eq!(loaded, vec!["alpha", "mid", "zeta"]);
    }

    #[tokio::test]
    async fn test_load_collection_dir_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let mut ctx = RunContext::open(temp.path()).unwrap();

        let loaded = load_collection_dir(&temp.path().join("nope"), &mut ctx).await;
        assert!(loaded.is_empty());
        let error_log = std::fs::read_to_string(ctx.error_log_path()).unwrap();
        assert!(error_log.contains("missing input"));
    }
}
