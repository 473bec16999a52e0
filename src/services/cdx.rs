// src/services/cdx.rs

//! Capture index client.
//!
//! Queries the archive's CDX endpoint and TimeMap endpoint and normalizes the
//! answers into [`CaptureSet`]s.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::error::Result;
use crate::models::{ArchiveConfig, CaptureSet, Timemap, parse_link_header};
use crate::utils::http;

/// Media type of JSON-lines TimeMaps.
const NDJSON: &str = "text/x-ndjson";

/// Media type of RFC 7089 link-format TimeMaps.
const LINK_FORMAT: &str = "application/link-format";

/// Client for the CDX index and TimeMap endpoints.
#[derive(Clone)]
pub struct IndexClient {
    config: ArchiveConfig,
    client: Client,
    timemap_client: Client,
}

impl IndexClient {
    /// Create a new index client with the given configuration.
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            client: http::create_async_client(config)?,
            timemap_client: http::create_memento_client(config, true)?,
        })
    }

    /// Query the CDX index using the configured default timeout.
    pub async fn query(&self, url: &str, params: &[(&str, &str)]) -> Result<CaptureSet> {
        let timeout = Duration::from_secs(self.config.cdx_timeout_secs);
        self.query_cdx_index(url, timeout, params).await
    }

    /// Query the CDX index for captures of `url`.
    ///
    /// `params` (match type, limit, filter, ...) are forwarded verbatim after
    /// `url` and `output=json`. Records come back sorted by capture time with
    /// their public access URLs filled in.
    pub async fn query_cdx_index(
        &self,
        url: &str,
        timeout: Duration,
        params: &[(&str, &str)],
    ) -> Result<CaptureSet> {
        let response = self
            .client
            .get(self.config.cdx_url())
            .query(&[("url", url), ("output", "json")])
            .query(params)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let records = CaptureSet::parse_ndjson(&body)?;
        log::info!("CDX index returned {} captures for {}", records.len(), url);
        Ok(records)
    }

    /// URL of the TimeMap for `url` in the given format.
    pub fn timemap_url(&self, url: &str, format: &str) -> String {
        format!("{}/timemap/{}/{}", self.config.base(), format, url)
    }

    /// Fetch the TimeMap of `url`.
    ///
    /// The response is interpreted according to its content type; anything
    /// that is neither JSON lines nor link format is returned as raw text.
    pub async fn get_timemap(&self, url: &str, format: &str) -> Result<Timemap> {
        let query_url = self.timemap_url(url, format);
        log::debug!("Fetching TimeMap {query_url}");

        let response = self
            .timemap_client
            .get(&query_url)
            .send()
            .await?
            .error_for_status()?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = response.text().await?;

        let timemap = match media_type(&content_type).as_str() {
            NDJSON => Timemap::Records(CaptureSet::parse_ndjson(&body)?),
            LINK_FORMAT => Timemap::Links(parse_link_header(&body)),
            _ => {
                log::warn!("TimeMap for {url} has content type '{content_type}', returning raw text");
                Timemap::Raw { content_type, body }
            }
        };
        Ok(timemap)
    }
}

/// Lower-cased media type without parameters.
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type() {
        assert_eq!(media_type("text/x-ndjson"), NDJSON);
        assert_eq!(media_type("Text/X-NDJSON; charset=utf-8"), NDJSON);
        assert_eq!(media_type(""), "");
    }

    #[test]
    fn test_timemap_url() {
        let client = IndexClient::new(&ArchiveConfig::default()).unwrap();
        assert_eq!(
            client.timemap_url("https://covid19.govt.nz/", "json"),
            "https://ndhadeliver.natlib.govt.nz/webarchive/timemap/json/https://covid19.govt.nz/"
        );
    }
}
