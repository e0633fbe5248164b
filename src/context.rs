//! Run context shared by all stages of one invocation.
//!
//! The context owns the two append-only logs:
//! - `download.log`: every narrated line (progress, skips, failures)
//! - `error.log`: failures only
//!
//! Each line is `[<local timestamp>] <text>`. Lines are flushed as they are
//! written so a killed process still leaves a complete log behind, and the
//! handles are flushed once more when the context is dropped.

use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{error, info, warn};

use crate::error::HarvestError;

/// File name of the general run log.
pub const RUN_LOG_FILE: &str = "download.log";

/// File name of the failure-only log.
pub const ERROR_LOG_FILE: &str = "error.log";

/// Explicit per-run state handed to every stage.
#[derive(Debug)]
pub struct RunContext {
    run_log: LineWriter<File>,
    error_log: LineWriter<File>,
    log_dir: PathBuf,
}

impl RunContext {
    /// Opens (or creates) both logs in `log_dir` in append mode.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Io`] if the directory or either log file cannot
    /// be created. This is the one failure that stops a run before it starts.
    pub fn open(log_dir: &Path) -> Result<Self, HarvestError> {
        fs::create_dir_all(log_dir).map_err(|e| HarvestError::io(log_dir, e))?;
        let run_log = open_append(&log_dir.join(RUN_LOG_FILE))?;
        let error_log = open_append(&log_dir.join(ERROR_LOG_FILE))?;
        Ok(Self {
            run_log: LineWriter::new(run_log),
            error_log: LineWriter::new(error_log),
            log_dir: log_dir.to_path_buf(),
        })
    }

    /// Narrates a progress or skip line.
    pub fn info(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        info!("{message}");
        append_line(&mut self.run_log, message);
    }

    /// Narrates degraded-but-tolerated input.
    pub fn warn(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        warn!("{message}");
        append_line(&mut self.run_log, &format!("WARNING: {message}"));
    }

    /// Records an entity failure in both logs.
    pub fn error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        error!("{message}");
        append_line(&mut self.error_log, message);
        append_line(&mut self.run_log, &format!("ERROR: {message}"));
    }

    /// Records a failed entity together with the error that caused it.
    pub fn failure(&mut self, message: impl AsRef<str>, err: &HarvestError) {
        let message = message.as_ref();
        error!(kind = ?err.kind(), error = %err, "{message}");
        let line = format!("{message} ({err})");
        append_line(&mut self.error_log, &line);
        append_line(&mut self.run_log, &format!("ERROR: {line}"));
    }

    /// Path of the general run log.
    #[must_use]
    pub fn run_log_path(&self) -> PathBuf {
        self.log_dir.join(RUN_LOG_FILE)
    }

    /// Path of the failure-only log.
    #[must_use]
    pub fn error_log_path(&self) -> PathBuf {
        self.log_dir.join(ERROR_LOG_FILE)
    }

    /// Flushes both logs and closes the context.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Io`] if either log cannot be flushed.
    pub fn finish(mut self) -> Result<(), HarvestError> {
        let run_path = self.run_log_path();
        let error_path = self.error_log_path();
        self.run_log
            .flush()
            .map_err(|e| HarvestError::io(run_path, e))?;
        self.error_log
            .flush()
            .map_err(|e| HarvestError::io(error_path, e))
    }
}

impl Drop for RunContext {
    fn drop(&mut self) {
        let _ = self.run_log.flush();
        let _ = self.error_log.flush();
    }
}

fn open_append(path: &Path) -> Result<File, HarvestError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| HarvestError::io(path, e))
}

fn append_line(writer: &mut LineWriter<File>, message: &str) {
    let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
    if let Err(e) = writeln!(writer, "[{timestamp}] {message}") {
        warn!(error = %e, "failed to append to log file");
    }
}
