// src/services/memento.rs

//! Memento TimeGate client.

use chrono::{DateTime, Utc};
use reqwest::header::LINK;
use reqwest::{Client, Response};

use crate::error::Result;
use crate::models::{ArchiveConfig, MementoLinks};
use crate::utils::http;
use crate::utils::url::ensure_trailing_slash;

/// Header carrying the requested capture time.
pub const ACCEPT_DATETIME: &str = "Accept-Datetime";

/// Format an instant as an RFC 1123 HTTP date.
pub fn format_accept_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Client for the archive's Memento endpoint.
///
/// Each request carries only the headers its own arguments ask for. No
/// timeout is applied.
#[derive(Clone)]
pub struct MementoClient {
    base_url: String,
    following: Client,
    non_following: Client,
}

impl MementoClient {
    /// Create a new Memento client with the given configuration.
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        Ok(Self {
            base_url: config.base().to_string(),
            following: http::create_memento_client(config, true)?,
            non_following: http::create_memento_client(config, false)?,
        })
    }

    /// TimeGate URL for `url`, normalized to end with `/`.
    pub fn memento_url(&self, url: &str) -> String {
        format!("{}/{}", self.base_url, ensure_trailing_slash(url))
    }

    /// Query the TimeGate for `url`, optionally negotiating on `at_time`.
    pub async fn query_memento(
        &self,
        url: &str,
        at_time: Option<DateTime<Utc>>,
        follow_redirects: bool,
    ) -> Result<Response> {
        let client = if follow_redirects {
            &self.following
        } else {
            &self.non_following
        };

        let mut request = client.get(self.memento_url(url));
        if let Some(at_time) = at_time {
            request = request.header(ACCEPT_DATETIME, format_accept_datetime(&at_time));
        }

        let response = request.send().await?.error_for_status()?;
        log::debug!("Memento query for {} answered {}", url, response.status());
        Ok(response)
    }

    /// Relation links advertised for `url`.
    pub async fn get_memento_urls(
        &self,
        url: &str,
        at_time: Option<DateTime<Utc>>,
    ) -> Result<MementoLinks> {
        let response = self.query_memento(url, at_time, true).await?;
        let links = MementoLinks::from_headers(
            response
                .headers()
                .get_all(LINK)
                .iter()
                .filter_map(|v| v.to_str().ok()),
        );
        Ok(links)
    }
}
