//! Persisted item metadata records.
//!
//! Field declaration order is alphabetical so the serialized documents keep a
//! stable key order across runs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::catalog::{Catalog, MetadataResponse, RemoteFile};
use crate::identity::derive_id_string;

/// Placeholder for an item without a title.
pub const NO_TITLE: &str = "no-title";
/// Placeholder for an item without a date.
pub const NO_DATE: &str = "no-date";
/// Placeholder for an item without a language.
pub const NO_LANGUAGE: &str = "no-language";

/// Format label of the catalog's own bookkeeping files.
const METADATA_FORMAT: &str = "Metadata";

/// Separator used when a descriptive field arrives as a list.
const LIST_SEPARATOR: &str = "; ";

/// One item's normalized metadata, as written to `<item>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub collection: String,
    pub date: String,
    pub files: Vec<FileRecord>,
    pub id: String,
    pub identifier: String,
    pub language: String,
    pub tags: Vec<String>,
    pub title: String,
}

/// One retained file of an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub crc32: Option<String>,
    pub format: Option<String>,
    pub id: String,
    pub md5: Option<String>,
    pub name: String,
    pub sha1: Option<String>,
    pub size: Option<String>,
    pub url: String,
}

impl ItemRecord {
    /// Builds the record for one metadata response.
    ///
    /// Missing descriptive fields fall back to the `no-*` placeholders and a
    /// missing subject to an empty tag list. Files are filtered with
    /// [`is_retained`]; the result may have no files, in which case it must
    /// not be persisted.
    pub fn from_response(
        collection: &str,
        response: &MetadataResponse,
        catalog: &dyn Catalog,
    ) -> Self {
        let metadata = &response.metadata;
        let files = response
            .files
            .iter()
            .filter(|file| is_retained(&file.name, file.format.as_deref()))
            .map(|file| FileRecord::from_remote(&metadata.identifier, file, catalog))
            .collect();

        Self {
            collection: collection.to_string(),
            date: text_field(metadata.date.as_ref()).unwrap_or_else(|| NO_DATE.to_string()),
            files,
            id: derive_id_string(&metadata.identifier),
            identifier: metadata.identifier.clone(),
            language: text_field(metadata.language.as_ref())
                .unwrap_or_else(|| NO_LANGUAGE.to_string()),
            tags: tag_list(metadata.subject.as_ref()),
            title: text_field(metadata.title.as_ref()).unwrap_or_else(|| NO_TITLE.to_string()),
        }
    }

    /// Serializes the record as pretty JSON with 4-space indentation.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for well-formed records.
    pub fn to_pretty_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        Ok(out)
    }
}

impl FileRecord {
    fn from_remote(identifier: &str, file: &RemoteFile, catalog: &dyn Catalog) -> Self {
        Self {
            crc32: opaque(file.crc32.as_ref()),
            format: file.format.clone(),
            id: derive_id_string(&file.name),
            md5: opaque(file.md5.as_ref()),
            name: file.name.clone(),
            sha1: opaque(file.sha1.as_ref()),
            size: opaque(file.size.as_ref()),
            url: catalog.file_url(identifier, &file.name),
        }
    }
}

/// Whether a file belongs in the record: a `.txt` or `.pdf` name whose format
/// is not the catalog's own `Metadata`.
#[must_use]
pub fn is_retained(name: &str, format: Option<&str>) -> bool {
    let wanted_extension = name.ends_with(".txt") || name.ends_with(".pdf");
    wanted_extension && format != Some(METADATA_FORMAT)
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(values) => {
            let parts: Vec<String> = values.iter().filter_map(|v| text_field(Some(v))).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(LIST_SEPARATOR))
            }
        }
        _ => None,
    }
}

fn tag_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| text_field(Some(v)))
            .collect(),
        _ => Vec::new(),
    }
}

fn opaque(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
