//! Capture records returned by the CDX index and TimeMap endpoints.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::utils::url::access_url_from_load_url;

/// Padding applied to truncated 14-digit capture timestamps.
const TIMESTAMP_TEMPLATE: &str = "00000101000000";

/// One archived snapshot of a URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptureRecord {
    /// Capture instant
    pub timestamp: DateTime<Utc>,

    /// SURT-form key of the original URL
    pub urlkey: Option<String>,

    /// Original URL
    pub url: String,

    /// MIME type reported by the index
    pub mime: Option<String>,

    /// HTTP status of the capture, absent for revisits and redirects without one
    pub status: Option<u16>,

    /// Payload digest
    pub digest: Option<String>,

    /// Compressed record length in bytes
    pub length: Option<u64>,

    /// Byte offset of the record inside its WARC file
    pub offset: Option<u64>,

    /// WARC file holding the record
    pub filename: Option<String>,

    /// Public replay URL derived from the internal load URL
    pub access_url: Option<String>,

    /// Any other fields returned by the server
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Wire shape of a JSON-lines index row.
#[derive(Debug, Deserialize)]
struct RawCapture {
    timestamp: String,
    #[serde(default)]
    urlkey: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    mime: Option<String>,
    #[serde(default)]
    status: Option<Value>,
    #[serde(default)]
    digest: Option<String>,
    #[serde(default)]
    length: Option<Value>,
    #[serde(default)]
    offset: Option<Value>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    load_url: Option<String>,
    #[serde(flatten)]
    extra: BTreeMap<String, Value>,
}

impl TryFrom<RawCapture> for CaptureRecord {
    type Error = AppError;

    fn try_from(raw: RawCapture) -> Result<Self> {
        Ok(Self {
            timestamp: parse_capture_timestamp(&raw.timestamp)?,
            urlkey: raw.urlkey,
            url: raw.url.unwrap_or_default(),
            mime: raw.mime,
            status: raw
                .status
                .as_ref()
                .and_then(value_as_u64)
                .and_then(|s| u16::try_from(s).ok()),
            digest: raw.digest,
            length: raw.length.as_ref().and_then(value_as_u64),
            offset: raw.offset.as_ref().and_then(value_as_u64),
            filename: raw.filename,
            access_url: raw.load_url.as_deref().map(access_url_from_load_url),
            extra: raw.extra,
        })
    }
}

/// Numbers arrive either as JSON numbers or as strings ("200", "-").
fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Parse a wayback-style capture timestamp.
///
/// Accepts the 14-digit `YYYYMMDDhhmmss` form and any digit prefix of at
/// least four characters (padded to the earliest instant it denotes), as well
/// as RFC 3339 strings.
pub fn parse_capture_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.len() >= 4 && raw.len() <= 14 && raw.chars().all(|c| c.is_ascii_digit()) {
        let padded = format!("{raw}{}", &TIMESTAMP_TEMPLATE[raw.len()..]);
        return NaiveDateTime::parse_from_str(&padded, "%Y%m%d%H%M%S")
            .map(|dt| dt.and_utc())
            .map_err(|_| AppError::Timestamp(raw.to_string()));
    }

    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::Timestamp(raw.to_string()))
}

/// Format an instant as a 14-digit capture timestamp.
pub fn format_capture_timestamp(dt: &DateTime<Utc>) -> String {
    dt.format("%Y%m%d%H%M%S").to_string()
}

/// Capture records sorted ascending by timestamp.
///
/// Every row the index returned is kept: rows sharing a timestamp (a revisit
/// next to its response, or one capture stored in two WARC files) point at
/// different records.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(transparent)]
pub struct CaptureSet {
    records: Vec<CaptureRecord>,
}

impl CaptureSet {
    /// Build a set from arbitrary records, sorted by timestamp.
    ///
    /// The sort is stable, so rows with equal timestamps keep server order.
    pub fn from_records(mut records: Vec<CaptureRecord>) -> Self {
        records.sort_by_key(|r| r.timestamp);
        Self { records }
    }

    /// Parse a newline-delimited JSON body into a capture set.
    pub fn parse_ndjson(body: &str) -> Result<Self> {
        let mut records = Vec::new();
        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let raw: RawCapture = serde_json::from_str(line)?;
            records.push(CaptureRecord::try_from(raw)?);
        }
        Ok(Self::from_records(records))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CaptureRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[CaptureRecord] {
        &self.records
    }

    pub fn first(&self) -> Option<&CaptureRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&CaptureRecord> {
        self.records.last()
    }

    /// Capture instants in ascending order.
    pub fn timestamps(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        self.records.iter().map(|r| r.timestamp)
    }

    pub fn into_vec(self) -> Vec<CaptureRecord> {
        self.records
    }
}

impl IntoIterator for CaptureSet {
    type Item = CaptureRecord;
    type IntoIter = std::vec::IntoIter<CaptureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a CaptureSet {
    type Item = &'a CaptureRecord;
    type IntoIter = std::slice::Iter<'a, CaptureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike};

    use super::*;

    const BODY: &str = r#"{"urlkey": "nz,govt,covid19)/", "timestamp": "20210305101010", "url": "https://covid19.govt.nz/", "mime": "text/html", "status": "200", "digest": "ABC", "length": "1043", "offset": "5120", "filename": "a.warc.gz", "load_url": "https://wlgprdowapp01.natlib.govt.nz/nlnzwebarchive_PROD/ap/20210305101010id_/https://covid19.govt.nz/", "source": "nlnz"}
{"urlkey": "nz,govt,covid19)/", "timestamp": "20200401004141", "url": "https://covid19.govt.nz/", "mime": "text/html", "status": "-", "load_url": "https://wlgprdowapp01.natlib.govt.nz/nlnzwebarchive_PROD/ap/20200401004141id_/https://covid19.govt.nz/"}

{"urlkey": "nz,govt,covid19)/", "timestamp": "20200401004141", "url": "https://covid19.govt.nz/", "mime": "text/html", "status": "200"}
"#;

    #[test]
    fn test_parse_full_timestamp() {
        let ts = parse_capture_timestamp("20230101123456").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2023, 1, 1, 12, 34, 56).unwrap());
    }

    #[test]
    fn test_parse_truncated_timestamp() {
        let ts = parse_capture_timestamp("202305").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 5, 1));
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_timestamp() {
        let ts = parse_capture_timestamp("2023-01-01T00:00:00Z").unwrap();
        assert_eq!(format_capture_timestamp(&ts), "20230101000000");
    }

    #[test]
    fn test_parse_invalid_timestamp() {
        assert!(parse_capture_timestamp("20231399000000").is_err());
        assert!(parse_capture_timestamp("yesterday").is_err());
        assert!(parse_capture_timestamp("202").is_err());
    }

    #[test]
    fn test_parse_ndjson_sorts_and_keeps_all_rows() {
        let set = CaptureSet::parse_ndjson(BODY).unwrap();
        assert_eq!(set.len(), 3);

        let first = set.first().unwrap();
        assert_eq!(format_capture_timestamp(&first.timestamp), "20200401004141");
        assert_eq!(first.status, None);
        assert_eq!(
            first.access_url.as_deref(),
            Some("https://ndhadeliver.natlib.govt.nz/webarchive/20200401004141/https://covid19.govt.nz/")
        );
        assert_eq!(set.records()[1].status, Some(200));

        let last = set.last().unwrap();
        assert_eq!(last.status, Some(200));
        assert_eq!(last.offset, Some(5120));
        assert_eq!(last.length, Some(1043));
        assert_eq!(last.extra.get("source"), Some(&Value::from("nlnz")));
    }

    #[test]
    fn test_same_timestamp_rows_keep_their_coordinates() {
        let body = r#"{"timestamp": "20200401004141", "url": "https://covid19.govt.nz/", "filename": "one.warc.gz", "offset": "0"}
{"timestamp": "20200401004141", "url": "https://covid19.govt.nz/", "filename": "two.warc.gz", "offset": "999"}
"#;
        let set = CaptureSet::parse_ndjson(body).unwrap();
        assert_eq!(set.len(), 2);

        let coords: Vec<_> = set
            .iter()
            .map(|r| (r.filename.as_deref(), r.offset))
            .collect();
        assert_eq!(
            coords,
            vec![(Some("one.warc.gz"), Some(0)), (Some("two.warc.gz"), Some(999))]
        );
    }

    #[test]
    fn test_records_never_expose_load_url() {
        let set = CaptureSet::parse_ndjson(BODY).unwrap();
        for record in &set {
            assert!(!record.extra.contains_key("load_url"));
        }
        let json = serde_json::to_string(&set).unwrap();
        assert!(!json.contains("load_url"));
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let set = CaptureSet::parse_ndjson(BODY).unwrap();
        let stamps: Vec<_> = set.timestamps().collect();
        assert!(stamps.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_parse_ndjson_rejects_bad_json() {
        assert!(CaptureSet::parse_ndjson("{not json}").is_err());
    }

    #[test]
    fn test_empty_body() {
        let set = CaptureSet::parse_ndjson("\n").unwrap();
        assert!(set.is_empty());
    }
}
