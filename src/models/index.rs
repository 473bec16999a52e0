//! Rows of the space-delimited index files published alongside WARC files.
//!
//! The files carry no header. Each line holds the eleven classic CDX fields
//! followed by two trailing columns that are discarded.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Number of trailing columns dropped from every line.
pub const DISCARDED_TRAILING_COLUMNS: usize = 2;

/// Versioned column layout of an index file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSchema {
    /// CDX-11: `N b a m s k r M S V g`
    #[default]
    V1,
}

impl IndexSchema {
    /// Column names, in file order.
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Self::V1 => &[
                "urlkey",
                "timestamp",
                "original",
                "mimetype",
                "statuscode",
                "digest",
                "redirect",
                "metatags",
                "length",
                "offset",
                "filename",
            ],
        }
    }

    pub fn width(self) -> usize {
        self.columns().len()
    }
}

/// One line of an index file.
///
/// `-` placeholders are mapped to `None`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexEntry {
    pub urlkey: String,
    pub timestamp: String,
    pub original: String,
    pub mimetype: Option<String>,
    pub statuscode: Option<u16>,
    pub digest: Option<String>,
    pub redirect: Option<String>,
    pub metatags: Option<String>,
    pub length: Option<u64>,
    pub offset: Option<u64>,
    pub filename: String,
}

impl IndexEntry {
    /// Build an entry from exactly `schema.width()` fields.
    fn from_fields(schema: IndexSchema, fields: &[&str], line: usize) -> Result<Self> {
        match schema {
            IndexSchema::V1 => {
                let [urlkey, timestamp, original, mimetype, statuscode, digest, redirect, metatags, length, offset, filename] =
                    fields
                else {
                    return Err(AppError::index_schema(
                        line,
                        format!(
                            "expected {} columns, found {}",
                            schema.width(),
                            fields.len()
                        ),
                    ));
                };

                Ok(Self {
                    urlkey: urlkey.to_string(),
                    timestamp: timestamp.to_string(),
                    original: original.to_string(),
                    mimetype: optional(mimetype),
                    statuscode: optional(statuscode).and_then(|s| s.parse().ok()),
                    digest: optional(digest),
                    redirect: optional(redirect),
                    metatags: optional(metatags),
                    length: optional(length).and_then(|s| s.parse().ok()),
                    offset: optional(offset).and_then(|s| s.parse().ok()),
                    filename: filename.to_string(),
                })
            }
        }
    }
}

fn optional(field: &str) -> Option<String> {
    match field {
        "" | "-" => None,
        other => Some(other.to_string()),
    }
}

/// Parse the contents of an index file.
///
/// Blank lines are skipped. Every other line must contain the schema's
/// columns plus the two discarded trailing columns.
pub fn parse_index_file(content: &str, schema: IndexSchema) -> Result<Vec<IndexEntry>> {
    let mut entries = Vec::new();

    for (i, line) in content.lines().enumerate() {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let kept = fields.len().saturating_sub(DISCARDED_TRAILING_COLUMNS);
        entries.push(IndexEntry::from_fields(schema, &fields[..kept], i + 1)?);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "nz,govt,covid19)/ 20200401004141 https://covid19.govt.nz/ text/html 200 SHA1ABC - - 12345 67890 NLNZ-20200401.warc.gz x y";

    #[test]
    fn test_parse_line() {
        let entries = parse_index_file(LINE, IndexSchema::V1).unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.urlkey, "nz,govt,covid19)/");
        assert_eq!(entry.statuscode, Some(200));
        assert_eq!(entry.redirect, None);
        assert_eq!(entry.length, Some(12345));
        assert_eq!(entry.offset, Some(67890));
        assert_eq!(entry.filename, "NLNZ-20200401.warc.gz");
    }

    #[test]
    fn test_blank_lines_skipped() {
        let content = format!("\n{LINE}\n\n{LINE}\n");
        assert_eq!(parse_index_file(&content, IndexSchema::V1).unwrap().len(), 2);
    }

    #[test]
    fn test_short_line_reports_line_number() {
        let content = format!("{LINE}\na b c d");
        let err = parse_index_file(&content, IndexSchema::V1).unwrap_err();
        match err {
            AppError::IndexSchema { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_schema_width() {
        assert_eq!(IndexSchema::V1.width(), 11);
    }
}
