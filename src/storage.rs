//! Filesystem helpers shared by the stages.
//!
//! Every stage output is written to a hidden `.part` file next to its final
//! location and renamed into place only once fully written, so an interrupted
//! run never leaves a half-written artifact under a name the resume check
//! would accept.

use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::HarvestError;

const PART_SUFFIX: &str = ".part";

/// Returns the temporary sibling path used while `target` is being written.
#[must_use]
pub fn part_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}{PART_SUFFIX}"))
}

/// Whether a stage output already exists (the resume marker).
pub async fn artifact_exists(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

/// Creates `dir` (and parents) if missing.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] when the directory cannot be created.
pub async fn ensure_dir(dir: &Path) -> Result<(), HarvestError> {
    fs::create_dir_all(dir)
        .await
        .map_err(|e| HarvestError::io(dir, e))
}

/// Writes `contents` to `target` via a temporary file and a rename.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] on any write or rename failure. The temporary
/// file is removed on failure.
pub async fn write_atomic(target: &Path, contents: &[u8]) -> Result<(), HarvestError> {
    let temp = part_path(target);
    let result = write_then_rename(&temp, target, contents).await;
    if result.is_err() {
        debug!(path = %temp.display(), "cleaning up partial file after error");
        let _ = fs::remove_file(&temp).await;
    }
    result
}

async fn write_then_rename(
    temp: &Path,
    target: &Path,
    contents: &[u8],
) -> Result<(), HarvestError> {
    let mut file = fs::File::create(temp)
        .await
        .map_err(|e| HarvestError::io(temp, e))?;
    file.write_all(contents)
        .await
        .map_err(|e| HarvestError::io(temp, e))?;
    file.sync_all()
        .await
        .map_err(|e| HarvestError::io(temp, e))?;
    drop(file);
    fs::rename(temp, target)
        .await
        .map_err(|e| HarvestError::io(target, e))
}

/// Lists regular files in `dir` whose name ends in `.{extension}`, sorted by name.
///
/// Hidden files (including in-flight `.part` files) are ignored.
///
/// # Errors
///
/// Returns [`HarvestError::MissingInput`] if `dir` does not exist and
/// [`HarvestError::Io`] if it cannot be read.
pub async fn list_files_with_extension(
    dir: &Path,
    extension: &str,
) -> Result<Vec<PathBuf>, HarvestError> {
    if !artifact_exists(dir).await {
        return Err(HarvestError::missing_input(dir));
    }
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| HarvestError::io(dir, e))?;
    let suffix = format!(".{extension}");
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| HarvestError::io(dir, e))?
    {
        let path = entry.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') || !name.ends_with(&suffix) {
            continue;
        }
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        if is_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem of `path` as an owned string (the entity name for stage inputs).
#[must_use]
pub fn stem_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_part_path_is_hidden_sibling() {
        let path = part_path(Path::new("/data/items/testlib.txt"));
        assert_eq!(path, PathBuf::from("/data/items/.testlib.txt.part"));
    }

    #[tokio::test]
    async fn test_write_atomic_leaves_no_part_file() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("doc1.json");
        write_atomic(&target, b"{}").await.unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "{}");
        assert!(!part_path(&target).exists());
    }

    #[tokio::test]
    async fn test_write_atomic_into_missing_dir_fails_cleanly() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("missing").join("doc1.json");
        let result = write_atomic(&target, b"{}").await;

        assert!(matches!(result, Err(HarvestError::Io { .. })));
        assert!(!target.exists());
    }

    #[tokio::test]
    async fn test_list_files_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        for name in ["b.txt", "a.txt", "c.json", ".a.txt.part", ".hidden.txt"] {
            std::fs::write(temp.path().join(name), "x").unwrap();
        }
        std::fs::create_dir(temp.path().join("dir.txt")).unwrap();

        let files = list_files_with_extension(temp.path(), "txt").await.unwrap();
        let names: Vec<String> = files.iter().map(|p| stem_of(p)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_files_missing_dir_is_missing_input() {
        let temp = TempDir::new().unwrap();
        let result = list_files_with_extension(&temp.path().join("nope"), "txt").await;
        assert!(matches!(result, Err(HarvestError::MissingInput { .. })));
    }
}
