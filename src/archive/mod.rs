// src/archive/mod.rs

//! WARC payload extraction.
//!
//! Opens a byte stream at a record offset inside a WARC file and decodes the
//! first record found there:
//! - Local paths are opened and seeked
//! - `s3://bucket/key` objects are read with an open-ended ranged GetObject
//! - `http(s)://` URLs are read with an open-ended `Range` request
//!
//! Remote bodies are streamed into the blocking decoder through
//! [`SyncIoBridge`], so only the first record is ever pulled off the wire.

mod http_message;
mod location;
mod record;

use std::pin::Pin;

use futures::TryStreamExt;
use reqwest::Client;
use tokio::io::AsyncRead;
use tokio_util::io::{StreamReader, SyncIoBridge};

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::ObjectStore;
use crate::utils::http;

pub use http_message::decode_body;
pub use location::Location;
pub use record::{extract_payload_from_file, read_first_response};

type BoxedReader = Pin<Box<dyn AsyncRead + Send>>;

/// Extracts response payloads from local or remote WARC files.
#[derive(Clone)]
pub struct PayloadExtractor {
    http: Client,
    store: ObjectStore,
}

impl PayloadExtractor {
    pub fn new(http: Client, store: ObjectStore) -> Self {
        Self { http, store }
    }

    /// Build an extractor with clients derived from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let http = http::create_async_client(&config.archive)?;
        let store = ObjectStore::from_config(&config.storage).await;
        Ok(Self::new(http, store))
    }

    /// Payload of the response record starting at `offset` in `location`.
    ///
    /// Returns `Ok(None)` when the first record there is not a response or
    /// the stream ends first. Transport and I/O failures are returned as
    /// errors without retrying.
    pub async fn extract_payload(&self, location: &str, offset: u64) -> Result<Option<Vec<u8>>> {
        let location = Location::parse(location)?;
        log::debug!("Extracting payload from {location} at offset {offset}");

        match location {
            Location::Local(path) => {
                tokio::task::spawn_blocking(move || extract_payload_from_file(&path, offset))
                    .await
                    .map_err(join_error)?
            }
            Location::S3 { bucket, key } => {
                let reader = self.store.open_at(&bucket, &key, offset).await?;
                decode_remote(Box::pin(reader)).await
            }
            Location::Http(url) => {
                let response = http::fetch_from_offset(&self.http, url.as_str(), offset).await?;
                let stream = response.bytes_stream().map_err(std::io::Error::other);
                decode_remote(Box::pin(StreamReader::new(stream))).await
            }
        }
    }
}

async fn decode_remote(reader: BoxedReader) -> Result<Option<Vec<u8>>> {
    let bridge = SyncIoBridge::new(reader);
    tokio::task::spawn_blocking(move || read_first_response(bridge))
        .await
        .map_err(join_error)?
}

fn join_error(err: tokio::task::JoinError) -> AppError {
    AppError::Io(std::io::Error::other(err))
}
