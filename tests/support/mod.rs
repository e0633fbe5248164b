//! Shared fixtures for pipeline tests: a scratch workspace laid out like a
//! harvest root, and helpers that mount catalog endpoints on a mock server.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use harvester_core::RunContext;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Scratch harvest root with `collections/`, `items/`, `metadata/`,
/// `corpus/raw/` and `logs/` beneath it.
pub struct Workspace {
    _temp: TempDir,
    root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("failed to create temp dir");
        let root = temp.path().to_path_buf();
        std::fs::create_dir_all(root.join("collections"))
            .expect("failed to create collections dir");
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn collections(&self) -> PathBuf {
        self.root.join("collections")
    }

    pub fn items(&self) -> PathBuf {
        self.root.join("items")
    }

    pub fn metadata(&self) -> PathBuf {
        self.root.join("metadata")
    }

    pub fn raw(&self) -> PathBuf {
        self.root.join("corpus").join("raw")
    }

    pub fn logs(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn ctx(&self) -> RunContext {
        RunContext::open(&self.logs()).expect("failed to open run context")
    }

    pub fn write(&self, relative: &str, contents: &str) {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(path, contents).expect("failed to write fixture");
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.root.join(relative)).expect("failed to read output")
    }

    pub fn error_log(&self) -> String {
        std::fs::read_to_string(self.logs().join("error.log")).unwrap_or_default()
    }

    pub fn run_log(&self) -> String {
        std::fs::read_to_string(self.logs().join("download.log")).unwrap_or_default()
    }

    /// Sorted file names directly inside `dir`.
    pub fn list(dir: &Path) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Mounts a collection search answering with `identifiers`.
pub async fn mount_search(
    server: &MockServer,
    collection: &str,
    identifiers: &[&str],
    calls: u64,
) {
    let docs: Vec<Value> = identifiers
        .iter()
        .map(|id| json!({ "identifier": id }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("q", format!("collection:{collection}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": { "status": 0 },
            "response": { "numFound": docs.len(), "start": 0, "docs": docs }
        })))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts a collection search answering with a canned response.
pub async fn mount_search_response(
    server: &MockServer,
    collection: &str,
    response: ResponseTemplate,
    calls: u64,
) {
    Mock::given(method("GET"))
        .and(path("/advancedsearch.php"))
        .and(query_param("q", format!("collection:{collection}")))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts the metadata endpoint of `item`.
pub async fn mount_metadata(server: &MockServer, item: &str, body: Value, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/metadata/{item}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts a failing metadata endpoint for `item`.
pub async fn mount_metadata_status(server: &MockServer, item: &str, status: u16, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/metadata/{item}")))
        .respond_with(ResponseTemplate::new(status))
        .expect(calls)
        .mount(server)
        .await;
}

/// Mounts the download endpoint of one file.
pub async fn mount_file(server: &MockServer, item: &str, name: &str, body: &str, calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/download/{item}/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .expect(calls)
        .mount(server)
        .await;
}

/// Metadata document of a dated item with OCR text, its bookkeeping file and a PDF.
pub fn dated_item(identifier: &str, date: &str) -> Value {
    json!({
        "created": 1_700_000_000,
        "metadata": {
            "identifier": identifier,
            "title": format!("Sample {identifier}"),
            "date": date,
            "language": "eng",
            "subject": ["history", "maps"]
        },
        "files": [
            {
                "name": format!("{identifier}_djvu.txt"),
                "format": "DjVuTXT",
                "size": "11",
                "md5": "0f1e",
                "crc32": "a1b2",
                "sha1": "c3d4"
            },
            { "name": format!("{identifier}_meta.txt"), "format": "Metadata" },
            { "name": format!("{identifier}.pdf"), "format": "PDF", "size": 2048 },
            { "name": format!("{identifier}.djvu"), "format": "DjVu" }
        ]
    })
}

/// Metadata document of an item without any date information.
pub fn undated_item(identifier: &str) -> Value {
    json!({
        "metadata": { "identifier": identifier },
        "files": [
            { "name": format!("{identifier}_djvu.txt"), "format": "DjVuTXT" }
        ]
    })
}
