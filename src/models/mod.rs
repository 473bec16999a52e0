// src/models/mod.rs

//! Domain models for the toolkit.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod capture;
mod config;
mod index;
mod memento;

// Re-export all public types
pub use capture::{CaptureRecord, CaptureSet, format_capture_timestamp, parse_capture_timestamp};
pub use config::{
    ArchiveConfig, Config, ContentConfig, ScreenshotConfig, StorageConfig, VisualizeConfig,
};
pub use index::{DISCARDED_TRAILING_COLUMNS, IndexEntry, IndexSchema, parse_index_file};
pub use memento::{Link, MementoLinks, Timemap, parse_link_header};
