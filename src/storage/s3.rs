//! AWS S3 object store client.
//!
//! Lists, downloads and range-reads objects from public buckets:
//! - Listing pages through `ListObjectsV2` under an optional prefix
//! - Downloads are best-effort and report failures through the log
//! - Range reads start at a byte offset and run to the end of the object

use std::path::Path;

use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use tokio::io::{AsyncBufRead, AsyncWriteExt};

use crate::error::{AppError, Result};
use crate::models::{IndexEntry, IndexSchema, StorageConfig, parse_index_file};
use crate::utils::http::open_range;

/// Anonymous S3 client.
#[derive(Clone, Debug)]
pub struct ObjectStore {
    client: Client,
}

impl ObjectStore {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create an unsigned client for the configured region and endpoint.
    ///
    /// A custom endpoint switches to path-style addressing. Retries are
    /// disabled so that failures surface on the first attempt.
    pub async fn from_config(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .no_credentials()
            .region(Region::new(config.region.clone()));
        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.endpoint_url.is_some())
            .retry_config(RetryConfig::disabled())
            .build();

        Self::new(Client::from_conf(s3_config))
    }

    /// List every key under `prefix`, in the order the store reports them.
    pub async fn list_objects(&self, bucket: &str, prefix: &str) -> Result<Vec<String>> {
        let mut request = self.client.list_objects_v2().bucket(bucket);
        if !prefix.is_empty() {
            request = request.prefix(prefix);
        }

        let mut pages = request.into_paginator().send();
        let mut keys = Vec::new();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| AppError::s3(DisplayErrorContext(e)))?;
            keys.extend(
                page.contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );
        }

        log::debug!("Listed {} keys in s3://{}/{}", keys.len(), bucket, prefix);
        Ok(keys)
    }

    /// Download one object to `local_path`.
    ///
    /// Failures are logged rather than returned; the return value reports
    /// whether the file was written.
    pub async fn download_object(&self, bucket: &str, key: &str, local_path: &Path) -> bool {
        match self.try_download(bucket, key, local_path).await {
            Ok(bytes) => {
                log::info!(
                    "Downloaded '{}' from '{}' to '{}' ({} bytes)",
                    key,
                    bucket,
                    local_path.display(),
                    bytes
                );
                true
            }
            Err(e) => {
                log::error!("Error downloading s3://{bucket}/{key}: {e}");
                if local_path.exists() {
                    if let Err(e) = tokio::fs::remove_file(local_path).await {
                        log::warn!("Failed to remove {}: {e}", local_path.display());
                    }
                }
                false
            }
        }
    }

    /// Download one object, returning the number of bytes written.
    pub async fn try_download(&self, bucket: &str, key: &str, local_path: &Path) -> Result<u64> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::s3(DisplayErrorContext(e)))?;

        if let Some(parent) = local_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut file = tokio::fs::File::create(local_path).await?;
        let body = output.body.into_async_read();
        tokio::pin!(body);
        let bytes = tokio::io::copy(&mut body, &mut file).await?;
        file.flush().await?;
        Ok(bytes)
    }

    /// Read a whole object into memory.
    pub async fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::s3(DisplayErrorContext(e)))?;

        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
        Ok(bytes.into_bytes().to_vec())
    }

    /// Stream an object from `offset` to its end.
    pub async fn open_at(
        &self,
        bucket: &str,
        key: &str,
        offset: u64,
    ) -> Result<impl AsyncBufRead + Send + 'static> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .range(open_range(offset))
            .send()
            .await
            .map_err(|e| AppError::s3(DisplayErrorContext(e)))?;

        Ok(output.body.into_async_read())
    }

    /// Load a whitespace-delimited index file using the current schema.
    pub async fn load_index_file(&self, bucket: &str, key: &str) -> Result<Vec<IndexEntry>> {
        self.load_index_file_with_schema(bucket, key, IndexSchema::default())
            .await
    }

    /// Load a whitespace-delimited index file using an explicit schema.
    pub async fn load_index_file_with_schema(
        &self,
        bucket: &str,
        key: &str,
        schema: IndexSchema,
    ) -> Result<Vec<IndexEntry>> {
        let bytes = self.read_object(bucket, key).await?;
        let content = String::from_utf8_lossy(&bytes);
        let entries = parse_index_file(&content, schema)?;
        log::info!(
            "Loaded {} index entries from s3://{}/{}",
            entries.len(),
            bucket,
            key
        );
        Ok(entries)
    }
}
