// src/services/screenshot.rs

//! Full-page screenshots through headless Chromium.
//!
//! Capture is best-effort: invalid URLs, launch failures and navigation
//! failures are logged and the screenshot is skipped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::ScreenshotParams;
use futures::StreamExt;

use crate::models::ScreenshotConfig;
use crate::utils::url::{is_valid_url, screenshot_file_name};

/// Drives a headless browser to capture web pages.
#[derive(Debug, Clone)]
pub struct ScreenshotCapturer {
    config: ScreenshotConfig,
}

impl ScreenshotCapturer {
    pub fn new(config: ScreenshotConfig) -> Self {
        Self { config }
    }

    /// Configured settle delay.
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.config.settle_delay_ms)
    }

    /// Output path derived from the URL inside the configured directory.
    pub fn default_output_path(&self, url: &str) -> PathBuf {
        self.config.output_dir.join(screenshot_file_name(url))
    }

    /// Load `url`, wait `delay`, and save a full-page PNG.
    ///
    /// Returns the written path, or `None` when the URL is invalid or the
    /// capture failed. The browser is closed on every path after launch.
    pub async fn capture_screenshot(
        &self,
        url: &str,
        output_path: Option<&Path>,
        delay: Duration,
    ) -> Option<PathBuf> {
        if !is_valid_url(url) {
            log::warn!("Invalid URL: {url}. Aborting...");
            return None;
        }

        let path = output_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.default_output_path(url));

        let browser_config = BrowserConfig::builder()
            .window_size(self.config.viewport_width, self.config.viewport_height)
            .viewport(Viewport {
                width: self.config.viewport_width,
                height: self.config.viewport_height,
                ..Viewport::default()
            })
            .arg("--ignore-certificate-errors")
            .build();
        let browser_config = match browser_config {
            Ok(config) => config,
            Err(e) => {
                log::error!("Invalid browser configuration: {e}");
                return None;
            }
        };

        let (mut browser, mut handler) = match Browser::launch(browser_config).await {
            Ok(launched) => launched,
            Err(e) => {
                log::error!("Failed to launch browser: {e}");
                return None;
            }
        };
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let result = capture_page(&browser, url, &path, delay).await;

        if let Err(e) = browser.close().await {
            log::warn!("Failed to close browser: {e}");
        }
        if let Err(e) = browser.wait().await {
            log::warn!("Browser process did not exit cleanly: {e}");
        }
        handler_task.abort();

        match result {
            Ok(()) => {
                log::info!("Screenshot saved as {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::error!("Failed to load URL: {url}. Error: {e}");
                None
            }
        }
    }
}

async fn capture_page(
    browser: &Browser,
    url: &str,
    path: &Path,
    delay: Duration,
) -> Result<(), CdpError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let page = browser.new_page(url).await?;
    page.wait_for_navigation().await?;
    tokio::time::sleep(delay).await;
    page.save_screenshot(ScreenshotParams::builder().full_page(true).build(), path)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_invalid_url_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let capturer = ScreenshotCapturer::new(ScreenshotConfig {
            output_dir: tmp.path().to_path_buf(),
            ..ScreenshotConfig::default()
        });
        let output = tmp.path().join("shot.png");

        let result = capturer
            .capture_screenshot("not a url", Some(&output), Duration::ZERO)
            .await;

        assert!(result.is_none());
        assert!(!output.exists());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_default_output_path() {
        let capturer = ScreenshotCapturer::new(ScreenshotConfig {
            output_dir: PathBuf::from("shots"),
            ..ScreenshotConfig::default()
        });
        assert_eq!(
            capturer.default_output_path("https://covid19.govt.nz/"),
            PathBuf::from("shots/covid19.govt.nz_.png")
        );
    }
}
