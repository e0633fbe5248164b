//! Harvester Core Library
//!
//! Resumable harvesting of public-domain texts from a digital-library
//! catalog. Work is split into filesystem-to-filesystem stages, each reading
//! the previous stage's output directory:
//!
//! 1. [`collections`] - load the user's collection lists
//! 2. [`harvest::discover_items`] - one item list per collection
//! 3. [`harvest::fetch_metadata`] - one JSON record per item
//! 4. [`harvest::acquire_texts`] - dated OCR text files
//! 5. [`normalize::normalize_corpus`] - cleaned token streams
//!
//! # Architecture
//!
//! - [`catalog`] - the remote catalog behind the [`Catalog`] trait
//! - [`context`] - per-run log handles passed to every stage
//! - [`error`] - per-entity failure types
//! - [`identity`] - deterministic item and file identifiers
//! - [`storage`] - resume checks and atomic writes

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod collections;
pub mod context;
pub mod error;
pub mod harvest;
pub mod identity;
pub mod normalize;
pub mod storage;
mod user_agent;

// Re-export commonly used types
pub use catalog::{
    ArchiveClient, CONNECT_TIMEOUT_SECS, Catalog, DEFAULT_CATALOG_URL, READ_TIMEOUT_SECS,
};
pub use collections::{load_collection_dir, load_collections};
pub use context::RunContext;
pub use error::{ErrorKind, HarvestError};
pub use harvest::{
    DownloadTarget, FileRecord, ItemRecord, StageReport, acquire_texts, discover_items,
    fetch_metadata,
};
pub use identity::derive_id;
pub use normalize::{Normalizer, TextNormalizer, normalize_corpus};
