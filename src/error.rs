//! Error types for harvesting operations.
//!
//! Every per-entity failure in the pipeline is expressed as a [`HarvestError`].
//! Stages catch these at the entity boundary, write them to the error log and
//! move on; only failures on shared local state (output directory, log files)
//! propagate out of a stage.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`HarvestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The remote call did not produce a usable response (network, HTTP status).
    Transport,
    /// The remote call succeeded but the body could not be decoded.
    Decode,
    /// The remote call succeeded and decoded, but yielded nothing usable.
    EmptyResult,
    /// Expected local input is absent or local storage failed.
    LocalState,
}

/// Errors that can occur while harvesting a single entity.
#[derive(Debug, Error)]
pub enum HarvestError {
    /// Network-level error (DNS resolution, connection refused, TLS, timeout).
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// Response body was not the expected JSON document.
    #[error("could not decode response from {url}: {source}")]
    Decode {
        /// The URL whose body failed to decode.
        url: String,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The catalog answered, but with nothing worth persisting.
    #[error("no usable data for {entity}: {reason}")]
    EmptyResult {
        /// Collection or item identifier.
        entity: String,
        /// What was missing.
        reason: &'static str,
    },

    /// An expected local input (file or directory) does not exist.
    #[error("missing input: {path}")]
    MissingInput {
        /// The path that was expected.
        path: PathBuf,
    },

    /// An entity name cannot be used to build a local path.
    #[error("invalid entity name '{name}': {reason}")]
    InvalidName {
        /// The rejected name.
        name: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A record could not be serialized for writing.
    #[error("could not encode record for {path}: {source}")]
    Encode {
        /// The file the record was meant for.
        path: PathBuf,
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// File system error while reading or writing local state.
    #[error("IO error at {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The provided URL is malformed or invalid.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl HarvestError {
    /// Creates a transport error from a reqwest error.
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a decode error.
    pub fn decode(url: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            url: url.into(),
            source,
        }
    }

    /// Creates an empty-result error.
    pub fn empty_result(entity: impl Into<String>, reason: &'static str) -> Self {
        Self::EmptyResult {
            entity: entity.into(),
            reason,
        }
    }

    /// Creates a missing-input error.
    pub fn missing_input(path: impl Into<PathBuf>) -> Self {
        Self::MissingInput { path: path.into() }
    }

    /// Creates an invalid-name error.
    pub fn invalid_name(name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            name: name.into(),
            reason,
        }
    }

    /// Creates a record encoding error.
    pub fn encode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Encode {
            path: path.into(),
            source,
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Maps the error onto the closed failure taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } | Self::InvalidUrl { .. } => {
                ErrorKind::Transport
            }
            Self::Decode { .. } => ErrorKind::Decode,
            Self::EmptyResult { .. } => ErrorKind::EmptyResult,
            Self::MissingInput { .. }
            | Self::InvalidName { .. }
            | Self::Encode { .. }
            | Self::Io { .. } => ErrorKind::LocalState,
        }
    }
}

// No `From<reqwest::Error>` / `From<std::io::Error>`: every variant needs the
// URL or path the source error lacks, so callers go through the constructors.
