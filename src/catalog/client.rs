//! HTTP implementation of [`Catalog`](super::Catalog).
//!
//! One `reqwest::Client` is built per run and reused for every search,
//! metadata and download request so connections are pooled.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};
use url::Url;

use super::{Catalog, MetadataResponse, SearchResponse};
use crate::error::HarvestError;
use crate::user_agent;

/// Base URL of the public catalog.
pub const DEFAULT_CATALOG_URL: &str = "https://archive.org";

/// Row cap of a collection search; collections are fetched in one page.
pub const SEARCH_ROW_CAP: u32 = 999_999;

/// Connect timeout applied when none is configured.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Whole-request timeout applied when none is configured.
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Catalog client speaking the search, metadata and download endpoints.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
}

impl ArchiveClient {
    /// Creates a client for the public catalog with default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::Transport`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, HarvestError> {
        Self::with_base_url(DEFAULT_CATALOG_URL)
    }

    /// Creates a client against a custom base URL (mirrors, test servers).
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, HarvestError> {
        Self::with_options(base_url, CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a client with explicit base URL and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`HarvestError::InvalidUrl`] for a malformed base URL and
    /// [`HarvestError::Transport`] if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, HarvestError> {
        let base_url = normalize_base_url(&base_url.into())?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_catalog_user_agent())
            .build()
            .map_err(|e| HarvestError::transport(&base_url, e))?;
        Ok(Self { client, base_url })
    }

    /// The base URL every endpoint is built from, without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, collection: &str) -> String {
        let query = urlencoding::encode(&format!("collection:{collection}")).into_owned();
        format!(
            "{}/advancedsearch.php?q={query}&fl%5B%5D=identifier&rows={SEARCH_ROW_CAP}&output=json",
            self.base_url
        )
    }

    fn metadata_url(&self, identifier: &str) -> String {
        format!("{}/metadata/{}", self.base_url, urlencoding::encode(identifier))
    }

    async fn get(&self, url: &str) -> Result<Response, HarvestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| HarvestError::transport(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(HarvestError::http_status(url, status.as_u16()));
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HarvestError> {
        let body = self
            .get(url)
            .await?
            .bytes()
            .await
            .map_err(|e| HarvestError::transport(url, e))?;
        serde_json::from_slice(&body).map_err(|e| HarvestError::decode(url, e))
    }
}

#[async_trait]
impl Catalog for ArchiveClient {
    #[instrument(level = "debug", skip(self))]
    async fn search_collection(&self, collection: &str) -> Result<SearchResponse, HarvestError> {
        let url = self.search_url(collection);
        self.get_json(&url).await
    }

    #[instrument(level = "debug", skip(self))]
    async fn item_metadata(&self, identifier: &str) -> Result<MetadataResponse, HarvestError> {
        let url = self.metadata_url(identifier);
        self.get_json(&url).await
    }

    fn file_url(&self, identifier: &str, file_name: &str) -> String {
        // Names may contain sub-directories; keep the slashes, encode the rest.
        let encoded_name = file_name
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        format!(
            "{}/download/{}/{encoded_name}",
            self.base_url,
            urlencoding::encode(identifier)
        )
    }

    #[instrument(level = "debug", skip(self, dest), fields(dest = %dest.display()))]
    async fn download(&self, url: &str, dest: &Path) -> Result<u64, HarvestError> {
        let response = self.get(url).await?;
        let mut file = File::create(dest)
            .await
            .map_err(|e| HarvestError::io(dest, e))?;

        match stream_to_file(&mut file, response, url, dest).await {
            Ok(bytes) => {
                debug!(bytes, "download complete");
                Ok(bytes)
            }
            Err(e) => {
                drop(file);
                debug!(path = %dest.display(), "cleaning up partial file after error");
                let _ = fs::remove_file(dest).await;
                Err(e)
            }
        }
    }
}

/// Streams the response body into `file`, returning the bytes written.
async fn stream_to_file(
    file: &mut File,
    response: Response,
    url: &str,
    path: &Path,
) -> Result<u64, HarvestError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| HarvestError::transport(url, e))?;
        writer
            .write_all(&chunk)
            .await
            .map_err(|e| HarvestError::io(path, e))?;
        bytes_written += chunk.len() as u64;
    }

    writer.flush().await.map_err(|e| HarvestError::io(path, e))?;
    Ok(bytes_written)
}

fn normalize_base_url(raw: &str) -> Result<String, HarvestError> {
    let trimmed = raw.trim().trim_end_matches('/');
    match Url::parse(trimmed) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") && parsed.has_host() => {
            Ok(trimmed.to_string())
        }
        _ => Err(HarvestError::invalid_url(raw)),
    }
}
