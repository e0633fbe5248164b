//! Local naming of downloaded text files.
//!
//! A downloaded file is named `<YYYY-MM> - <stem> - <file id><ext>`, for
//! example `1999-05 - doc1_djvu - 6f1c….txt`. Files whose item has no usable
//! year and month get no target at all.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use super::record::{FileRecord, ItemRecord};

/// Year-month embedded in a catalog identifier, e.g. `news-1999-05-issue`.
#[allow(clippy::expect_used)]
static IDENTIFIER_DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    // Static pattern, safe to panic
    Regex::new(r"(19[6-9]\d|20[0-1]\d)-[0-1]\d").expect("identifier date regex is valid")
});

/// Full-date spellings accepted in the `date` field.
///
/// Slash dates are read month-first; day-first only applies when the first
/// number cannot be a month.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%d %B %Y",
    "%B %d, %Y",
];

/// Date-time spellings accepted in the `date` field.
const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Date-time spellings with a numeric UTC offset such as `+0000`.
const OFFSET_DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%d %H:%M:%S%z"];

/// Where one file will be fetched from and what it will be called locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub file_name: String,
    pub url: String,
}

impl DownloadTarget {
    /// Computes the target for `file` of `record`, or `None` when no
    /// year-month can be resolved for the item.
    #[must_use]
    pub fn for_file(record: &ItemRecord, file: &FileRecord) -> Option<Self> {
        let year_month = resolve_year_month(&record.date, &record.identifier)?;
        let (stem, extension) = split_extension(base_name(&file.name));
        Some(Self {
            file_name: format!("{year_month} - {stem} - {}{extension}", file.id),
            url: file.url.clone(),
        })
    }
}

/// Resolves the `YYYY-MM` of an item: from its `date` field first, then from
/// a year-month embedded in its identifier.
#[must_use]
pub fn resolve_year_month(date: &str, identifier: &str) -> Option<String> {
    parse_year_month(date)
        .or_else(|| year_month_from_identifier(identifier))
        .map(|d| d.format("%Y-%m").to_string())
}

/// Parses a `date` field value that carries at least a year and a month.
///
/// The day is irrelevant and normalized to the first of the month.
fn parse_year_month(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in OFFSET_DATE_TIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, format) {
            return Some(dt.date_naive());
        }
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    // Month-precision spellings: pin the day so chrono has a full date.
    let month_only = [
        (format!("{raw}-01"), "%Y-%m-%d"),
        (format!("{raw}/01"), "%Y/%m/%d"),
        (format!("1 {raw}"), "%d %B %Y"),
    ];
    month_only
        .iter()
        .find_map(|(candidate, format)| NaiveDate::parse_from_str(candidate, format).ok())
}

fn year_month_from_identifier(identifier: &str) -> Option<NaiveDate> {
    let found = IDENTIFIER_DATE_PATTERN.find(identifier)?;
    NaiveDate::parse_from_str(&format!("{}-01", found.as_str()), "%Y-%m-%d").ok()
}

/// Final path component of a catalog file name, which may use either slash.
fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// Splits `name` into stem and extension (with its dot). A leading dot does
/// not start an extension.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::identity::derive_id_string;

    fn record(identifier: &str, date: &str) -> ItemRecord {
        ItemRecord {
            collection: "testlib".to_string(),
            date: date.to_string(),
            files: vec![],
            id: derive_id_string(identifier),
            identifier: identifier.to_string(),
            language: "eng".to_string(),
            tags: vec![],
            title: "Sample".to_string(),
        }
    }

    fn file(name: &str) -> FileRecord {
        FileRecord {
            crc32: None,
            format: Some("DjVuTXT".to_string()),
            id: derive_id_string(name),
            md5: None,
            name: name.to_string(),
            sha1: None,
            size: None,
            url: format!("https://archive.org/download/doc1/{name}"),
        }
    }

    #[test]
    fn test_accepted_date_spellings() {
        let cases = [
            ("1999-05", "1999-05"),
            ("1999-05-17", "1999-05"),
            ("1999/05/17", "1999-05"),
            ("1999/05", "1999-05"),
            ("1999-05-17T08:30:00Z", "1999-05"),
            ("1999-05-17T08:30:00", "1999-05"),
            ("1999-05-17 08:30:00", "1999-05"),
            ("May 1999", "1999-05"),
            ("Sep 1971", "1971-09"),
            ("17 May 1999", "1999-05"),
            ("May 17, 1999", "1999-05"),
            ("  1999-05-17  ", "1999-05"),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                resolve_year_month(raw, "no-pattern"),
                Some(expected.to_string()),
                "date {raw:?}"
            );
        }
    }

    #[test]
    fn test_slash_and_offset_date_spellings() {
        let cases = [
            ("17/05/1999", "1999-05"),
            ("05/17/1999", "1999-05"),
            ("1999-05-17 08:30", "1999-05"),
            ("1999-05-17T08:30", "1999-05"),
            ("1999-05-17T08:30:00+0000", "1999-05"),
            ("1999-05-31 23:30:00-0500", "1999-05"),
        ];
        for (raw, expected) in cases {
            assert_eq!(
                resolve_year_month(raw, "no-pattern"),
                Some(expected.to_string()),
                "date {raw:?}"
            );
        }
    }

    #[test]
    fn test_ambiguous_slash_date_is_month_first() {
        assert_eq!(
            resolve_year_month("05/06/1999", "no-pattern"),
            Some("1999-05".to_string())
        );
        assert_eq!(resolve_year_month("31/31/1999", "no-pattern"), None);
    }

    #[test]
    fn test_year_only_and_garbage_dates_rejected() {
        for raw in ["1999", "no-date", "", "circa 1900s", "1999-13"] {
            assert_eq!(resolve_year_month(raw, "doc1"), None, "date {raw:?}");
        }
    }

    #[test]
    fn test_identifier_fallback() {
        assert_eq!(
            resolve_year_month("no-date", "gazette-1985-07-weekly"),
            Some("1985-07".to_string())
        );
        // Outside the 1960-2019 window.
        assert_eq!(resolve_year_month("no-date", "gazette-1955-07"), None);
        assert_eq!(resolve_year_month("no-date", "gazette-2021-07"), None);
        // Month digits that do not form a month.
        assert_eq!(resolve_year_month("no-date", "gazette-1985-19"), None);
    }

    #[test]
    fn test_date_field_wins_over_identifier() {
        assert_eq!(
            resolve_year_month("2001-02-03", "gazette-1985-07"),
            Some("2001-02".to_string())
        );
    }

    #[test]
    fn test_target_name_layout() {
        let target =
            DownloadTarget::for_file(&record("doc1", "1999-05-01"), &file("doc1_djvu.txt"))
                .unwrap();
        assert_eq!(
            target.file_name,
            format!("1999-05 - doc1_djvu - {}.txt", derive_id_string("doc1_djvu.txt"))
        );
        assert_eq!(target.url, "https://archive.org/download/doc1/doc1_djvu.txt");
    }

    #[test]
    fn test_target_uses_base_name_of_nested_file() {
        let nested = file("scans/vol1\\doc1_djvu.txt");
        let target = DownloadTarget::for_file(&record("doc1", "1999-05"), &nested).unwrap();
        assert!(
            target.file_name.starts_with("1999-05 - doc1_djvu - "),
            "unexpected name: {}",
            target.file_name
        );
        assert!(target.file_name.ends_with(&format!("{}.txt", nested.id)));
    }

    #[test]
    fn test_undated_item_has_no_target() {
        let target = DownloadTarget::for_file(&record("doc1", "no-date"), &file("doc1_djvu.txt"));
        assert!(target.is_none());
    }

    #[test]
    fn test_split_extension_edge_cases() {
        assert_eq!(split_extension("doc1_djvu.txt"), ("doc1_djvu", ".txt"));
        assert_eq!(split_extension("archive.tar.txt"), ("archive.tar", ".txt"));
        assert_eq!(split_extension(".hidden"), (".hidden", ""));
        assert_eq!(split_extension("README"), ("README", ""));
    }
}
