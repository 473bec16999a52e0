//! Service layer for the toolkit.
//!
//! This module contains the network-facing clients:
//! - Capture index and TimeMap queries (`IndexClient`)
//! - Memento TimeGate queries (`MementoClient`)
//! - HTML text extraction (`ContentExtractor`)
//! - Headless browser screenshots (`ScreenshotCapturer`)

mod cdx;
mod content;
mod memento;
#[cfg(feature = "screenshot")]
mod screenshot;

pub use cdx::IndexClient;
pub use content::{ContentExtractor, extract_content_html};
pub use memento::{ACCEPT_DATETIME, MementoClient, format_accept_datetime};
#[cfg(feature = "screenshot")]
pub use screenshot::ScreenshotCapturer;
