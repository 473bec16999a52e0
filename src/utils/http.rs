// src/utils/http.rs

//! HTTP client utilities.

use reqwest::redirect::Policy;
use reqwest::{Client, Response};

use crate::error::Result;
use crate::models::ArchiveConfig;

/// Create a configured asynchronous HTTP client for index queries.
///
/// No client-wide timeout is set; callers apply one per request.
pub fn create_async_client(config: &ArchiveConfig) -> Result<Client> {
    let client = Client::builder().user_agent(&config.user_agent).build()?;
    Ok(client)
}

/// Create a client for Memento requests with the given redirect policy.
pub fn create_memento_client(config: &ArchiveConfig, follow_redirects: bool) -> Result<Client> {
    let policy = if follow_redirects {
        Policy::default()
    } else {
        Policy::none()
    };
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .redirect(policy)
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .build()?;
    Ok(client)
}

/// Open-ended `Range` header value starting at `offset`.
pub fn open_range(offset: u64) -> String {
    format!("bytes={offset}-")
}

/// GET `url` from `offset` to the end of the resource.
///
/// A server that ignores the range and answers 200 is only accepted when
/// `offset` is zero.
pub async fn fetch_from_offset(client: &Client, url: &str, offset: u64) -> Result<Response> {
    let response = client
        .get(url)
        .header(reqwest::header::RANGE, open_range(offset))
        .send()
        .await?
        .error_for_status()?;

    if offset > 0 && response.status() != reqwest::StatusCode::PARTIAL_CONTENT {
        return Err(crate::error::AppError::validation(format!(
            "{url} ignored the byte range request (status {})",
            response.status()
        )));
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_range() {
        assert_eq!(open_range(0), "bytes=0-");
        assert_eq!(open_range(5120), "bytes=5120-");
    }

    #[test]
    fn test_clients_build() {
        let config = ArchiveConfig::default();
        assert!(create_async_client(&config).is_ok());
        assert!(create_memento_client(&config, false).is_ok());
    }
}
