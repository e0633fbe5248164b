//! Remote catalog access.
//!
//! The pipeline only talks to the catalog through the [`Catalog`] trait:
//! - a search endpoint listing the item identifiers of a collection
//! - a metadata endpoint describing one item and its attached files
//! - a download endpoint serving raw file bytes
//!
//! [`ArchiveClient`] is the HTTP implementation. The response types below
//! mirror only the fields the pipeline reads; everything else in the remote
//! documents is ignored.

mod client;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::HarvestError;

pub use client::{
    ArchiveClient, CONNECT_TIMEOUT_SECS, DEFAULT_CATALOG_URL, READ_TIMEOUT_SECS, SEARCH_ROW_CAP,
};

/// Read access to the remote catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Lists the items of `collection` in a single request.
    async fn search_collection(&self, collection: &str) -> Result<SearchResponse, HarvestError>;

    /// Fetches the metadata document of one item.
    async fn item_metadata(&self, identifier: &str) -> Result<MetadataResponse, HarvestError>;

    /// Builds the download URL of `file_name` attached to item `identifier`.
    fn file_url(&self, identifier: &str, file_name: &str) -> String;

    /// Streams `url` into `dest`, returning the number of bytes written.
    ///
    /// On failure no file is left at `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, HarvestError>;
}

// ==================== Search Response Types ====================

/// Top-level search response.
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub response: SearchResults,
}

/// The `response` object of a search.
#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// One search hit; only the identifier field is requested.
#[derive(Debug, Deserialize)]
pub struct SearchDoc {
    pub identifier: Option<String>,
}

impl SearchResponse {
    /// Identifiers of every hit that carries one, in response order.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.response
            .docs
            .iter()
            .filter_map(|doc| doc.identifier.as_deref())
    }
}

// ==================== Metadata Response Types ====================

/// Top-level item metadata response.
#[derive(Debug, Deserialize)]
pub struct MetadataResponse {
    pub metadata: RemoteMetadata,
    #[serde(default)]
    pub files: Vec<RemoteFile>,
}

/// The `metadata` object of an item.
///
/// Descriptive fields are kept as raw JSON: the catalog serves them either as
/// a string or as a list of strings depending on the item.
#[derive(Debug, Deserialize)]
pub struct RemoteMetadata {
    pub identifier: String,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub date: Option<Value>,
    #[serde(default)]
    pub language: Option<Value>,
    #[serde(default)]
    pub subject: Option<Value>,
}

/// One entry of the item's `files` list.
#[derive(Debug, Deserialize)]
pub struct RemoteFile {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub md5: Option<Value>,
    #[serde(default)]
    pub crc32: Option<Value>,
    #[serde(default)]
    pub sha1: Option<Value>,
}
