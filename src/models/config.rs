//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Archive endpoints and HTTP behavior
    #[serde(default)]
    pub archive: ArchiveConfig,

    /// Object storage access
    #[serde(default)]
    pub storage: StorageConfig,

    /// Headless browser settings
    #[serde(default)]
    pub screenshot: ScreenshotConfig,

    /// HTML content extraction rules
    #[serde(default)]
    pub content: ContentConfig,

    /// Chart and word-cloud rendering
    #[serde(default)]
    pub visualize: VisualizeConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.archive.user_agent.trim().is_empty() {
            return Err(AppError::validation("archive.user_agent is empty"));
        }
        if self.archive.cdx_timeout_secs == 0 {
            return Err(AppError::validation("archive.cdx_timeout_secs must be > 0"));
        }
        url::Url::parse(&self.archive.base_url)
            .map_err(|e| AppError::validation(format!("archive.base_url: {e}")))?;
        if self.storage.region.trim().is_empty() {
            return Err(AppError::validation("storage.region is empty"));
        }
        if self.screenshot.viewport_width == 0 || self.screenshot.viewport_height == 0 {
            return Err(AppError::validation(
                "screenshot viewport dimensions must be > 0",
            ));
        }
        if self.content.separator.is_empty() {
            return Err(AppError::validation("content.separator is empty"));
        }
        if self.visualize.max_words == 0 {
            return Err(AppError::validation("visualize.max_words must be > 0"));
        }
        Ok(())
    }
}

/// Archive endpoint and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Base URL of the wayback-style access endpoint (no trailing slash)
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header sent with every archive request
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Default CDX query timeout in seconds
    #[serde(default = "defaults::cdx_timeout")]
    pub cdx_timeout_secs: u64,

    /// Accept self-signed or mismatched TLS certificates on Memento endpoints
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl ArchiveConfig {
    /// Base URL with any trailing slash removed.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// Full URL of the CDX endpoint.
    pub fn cdx_url(&self) -> String {
        format!("{}/cdx", self.base())
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            cdx_timeout_secs: defaults::cdx_timeout(),
            accept_invalid_certs: false,
        }
    }
}

/// Object storage settings. Access is always anonymous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// AWS region of the public bucket
    #[serde(default = "defaults::region")]
    pub region: String,

    /// Custom endpoint (e.g. a local S3-compatible server); enables path-style addressing
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Bucket used when a command does not name one
    #[serde(default)]
    pub bucket: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: defaults::region(),
            endpoint_url: None,
            bucket: None,
        }
    }
}

/// Headless browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenshotConfig {
    #[serde(default = "defaults::viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "defaults::viewport_height")]
    pub viewport_height: u32,

    /// Settle time after navigation before the capture, in milliseconds
    #[serde(default = "defaults::settle_delay")]
    pub settle_delay_ms: u64,

    /// Directory for screenshots named after their URL
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ScreenshotConfig {
    fn default() -> Self {
        Self {
            viewport_width: defaults::viewport_width(),
            viewport_height: defaults::viewport_height(),
            settle_delay_ms: defaults::settle_delay(),
            output_dir: defaults::output_dir(),
        }
    }
}

/// Selectors driving HTML content extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Primary main-content container
    #[serde(default = "defaults::main_selector")]
    pub main_selector: String,

    /// Fallback container tried when the primary one is missing
    #[serde(default = "defaults::fallback_selector")]
    pub fallback_selector: String,

    /// Section-like sub-regions of the main container
    #[serde(default = "defaults::section_selector")]
    pub section_selector: String,

    /// Text-bearing elements within a section
    #[serde(default = "defaults::text_selector")]
    pub text_selector: String,

    /// Marker emitted between non-empty sections
    #[serde(default = "defaults::separator")]
    pub separator: String,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            main_selector: defaults::main_selector(),
            fallback_selector: defaults::fallback_selector(),
            section_selector: defaults::section_selector(),
            text_selector: defaults::text_selector(),
            separator: defaults::separator(),
        }
    }
}

/// Chart and word-cloud rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizeConfig {
    #[serde(default = "defaults::chart_width")]
    pub chart_width: u32,

    #[serde(default = "defaults::chart_height")]
    pub chart_height: u32,

    #[serde(default = "defaults::cloud_width")]
    pub cloud_width: u32,

    #[serde(default = "defaults::cloud_height")]
    pub cloud_height: u32,

    /// Maximum number of words drawn in a word cloud
    #[serde(default = "defaults::max_words")]
    pub max_words: usize,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            chart_width: defaults::chart_width(),
            chart_height: defaults::chart_height(),
            cloud_width: defaults::cloud_width(),
            cloud_height: defaults::cloud_height(),
            max_words: defaults::max_words(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Archive defaults
    pub fn base_url() -> String {
        "https://ndhadeliver.natlib.govt.nz/webarchive".into()
    }
    pub fn user_agent() -> String {
        "NLNZWebArchiveAccessBot/1.0 (wa-nlnz-toolkit)".into()
    }
    pub fn cdx_timeout() -> u64 {
        60
    }

    // Storage defaults
    pub fn region() -> String {
        "ap-southeast-2".into()
    }

    // Screenshot defaults
    pub fn viewport_width() -> u32 {
        1920
    }
    pub fn viewport_height() -> u32 {
        4000
    }
    pub fn settle_delay() -> u64 {
        2000
    }
    pub fn output_dir() -> PathBuf {
        PathBuf::from(".")
    }

    // Content defaults
    pub fn main_selector() -> String {
        "main".into()
    }
    pub fn fallback_selector() -> String {
        "#content".into()
    }
    pub fn section_selector() -> String {
        "section".into()
    }
    pub fn text_selector() -> String {
        "p, li".into()
    }
    pub fn separator() -> String {
        "---".into()
    }

    // Visualize defaults
    pub fn chart_width() -> u32 {
        1200
    }
    pub fn chart_height() -> u32 {
        300
    }
    pub fn cloud_width() -> u32 {
        800
    }
    pub fn cloud_height() -> u32 {
        400
    }
    pub fn max_words() -> usize {
        100
    }
}
