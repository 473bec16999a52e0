//! Object storage access.
//!
//! The archive publishes WARC files and their index files in a public
//! bucket. All requests are anonymous (unsigned).

pub mod s3;

// Re-export for convenience
pub use s3::ObjectStore;
