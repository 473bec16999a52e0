// src/archive/location.rs

//! Where a WARC file lives.

use std::fmt;
use std::path::PathBuf;

use url::Url;

use crate::error::{AppError, Result};

/// A WARC file on local disk, in an S3 bucket, or behind an HTTP URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    Local(PathBuf),
    S3 { bucket: String, key: String },
    Http(Url),
}

impl Location {
    /// Classify a location string.
    ///
    /// `s3://bucket/key` and `http(s)://...` are remote; anything else is a
    /// filesystem path.
    pub fn parse(raw: &str) -> Result<Self> {
        if let Some(rest) = raw.strip_prefix("s3://") {
            let (bucket, key) = rest
                .split_once('/')
                .ok_or_else(|| AppError::validation(format!("S3 location has no key: {raw}")))?;
            if bucket.is_empty() || key.is_empty() {
                return Err(AppError::validation(format!(
                    "S3 location needs both bucket and key: {raw}"
                )));
            }
            return Ok(Self::S3 {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }

        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Ok(Self::Http(Url::parse(raw)?));
        }

        Ok(Self::Local(PathBuf::from(raw)))
    }

    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::Local(_))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::S3 { bucket, key } => write!(f, "s3://{bucket}/{key}"),
            Self::Http(url) => write!(f, "{url}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3() {
        let loc = Location::parse("s3://nlnz-warcs/2020/04/file.warc.gz").unwrap();
        assert_eq!(
            loc,
            Location::S3 {
                bucket: "nlnz-warcs".to_string(),
                key: "2020/04/file.warc.gz".to_string(),
            }
        );
        assert!(loc.is_remote());
        assert_eq!(loc.to_string(), "s3://nlnz-warcs/2020/04/file.warc.gz");
    }

    #[test]
    fn test_parse_s3_missing_key() {
        assert!(Location::parse("s3://bucket").is_err());
        assert!(Location::parse("s3://bucket/").is_err());
        assert!(Location::parse("s3:///key").is_err());
    }

    #[test]
    fn test_parse_http() {
        let loc = Location::parse("https://example.com/a.warc").unwrap();
        assert!(matches!(loc, Location::Http(_)));
    }

    #[test]
    fn test_parse_local() {
        let loc = Location::parse("data/a.warc.gz").unwrap();
        assert_eq!(loc, Location::Local(PathBuf::from("data/a.warc.gz")));
        assert!(!loc.is_remote());
    }
}
