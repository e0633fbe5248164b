//! Corpus normalization: raw downloaded text to a cleaned token stream.
//!
//! The stage itself only handles files and resume; what happens to the text
//! is decided by a [`Normalizer`]. [`TextNormalizer`] transliterates to
//! ASCII, strips punctuation and drops English stop words.

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use deunicode::deunicode;
use regex::Regex;
use stop_words::{LANGUAGE, get};
use tokio::fs;
use tracing::instrument;

use crate::context::RunContext;
use crate::error::HarvestError;
use crate::harvest::StageReport;
use crate::storage::{artifact_exists, ensure_dir, list_files_with_extension, write_atomic};

/// Every run of characters outside ASCII letters and digits.
#[allow(clippy::expect_used)]
static NON_ALPHANUMERIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Static pattern, safe to panic
    Regex::new(r"[^a-zA-Z0-9]+").expect("non-alphanumeric regex is valid")
});

/// Turns one document's text into the tokens written to the corpus.
pub trait Normalizer: Send + Sync {
    /// Normalizes `text`. Must be pure: same input, same tokens.
    fn normalize(&self, text: &str) -> Vec<String>;
}

/// Default normalizer: transliterate to ASCII, replace everything but letters
/// and digits with spaces, split on whitespace, drop English stop words.
pub struct TextNormalizer {
    stop_words: HashSet<String>,
}

impl std::fmt::Debug for TextNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextNormalizer")
            .field("stop_words", &self.stop_words.len())
            .finish()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextNormalizer {
    /// Creates a normalizer with the NLTK English stop-word list.
    #[must_use]
    pub fn new() -> Self {
        let stop_words = get(LANGUAGE::English)
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { stop_words }
    }

    /// Whether `token` is a stop word, ignoring case.
    #[must_use]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(&token.to_lowercase())
    }
}

impl Normalizer for TextNormalizer {
    fn normalize(&self, text: &str) -> Vec<String> {
        let ascii = deunicode(text);
        let cleaned = NON_ALPHANUMERIC_PATTERN.replace_all(&ascii, " ");
        cleaned
            .split_whitespace()
            .filter(|token| !self.is_stop_word(token))
            .map(str::to_string)
            .collect()
    }
}

/// Writes a normalized copy of every `*.txt` in `input_dir` to `output_dir`
/// under the same name, skipping files already normalized.
///
/// Input is read as UTF-8, with invalid sequences replaced.
///
/// # Errors
///
/// Returns [`HarvestError::Io`] only when `output_dir` cannot be created.
#[instrument(skip_all, fields(input = %input_dir.display(), output = %output_dir.display()))]
pub async fn normalize_corpus(
    normalizer: &dyn Normalizer,
    input_dir: &Path,
    output_dir: &Path,
    ctx: &mut RunContext,
) -> Result<StageReport, HarvestError> {
    ensure_dir(output_dir).await?;
    let mut report = StageReport::default();

    let sources = match list_files_with_extension(input_dir, "txt").await {
        Ok(sources) => sources,
        Err(e) => {
            ctx.failure(
                format!("Could not list raw texts in {}.", input_dir.display()),
                &e,
            );
            return Ok(report);
        }
    };
    report.found = sources.len();

    for source in sources {
        let Some(file_name) = source.file_name() else {
            continue;
        };
        let dest = output_dir.join(file_name);
        let name = file_name.to_string_lossy();
        if artifact_exists(&dest).await {
            ctx.info(format!("Skipping {name}, already normalized."));
            report.skipped += 1;
            continue;
        }

        match normalize_file(normalizer, &source, &dest).await {
            Ok(tokens) => {
                ctx.info(format!("Normalized {name} ({tokens} tokens)."));
                report.fetched += 1;
            }
            Err(e) => {
                ctx.failure(format!("Could not normalize {name}."), &e);
                report.failed += 1;
            }
        }
    }

    ctx.info(format!("Normalized {} new files.", report.fetched));
    Ok(report)
}

async fn normalize_file(
    normalizer: &dyn Normalizer,
    source: &Path,
    dest: &Path,
) -> Result<usize, HarvestError> {
    let raw = fs::read(source)
        .await
        .map_err(|e| HarvestError::io(source, e))?;
    let tokens = normalizer.normalize(&String::from_utf8_lossy(&raw));
    write_atomic(dest, tokens.join(" ").as_bytes()).await?;
    Ok(tokens.len())
}
