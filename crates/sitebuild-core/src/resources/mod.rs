//! Third-party resources and deployment packaging
//!
//! This module provides:
//! - Resource list types (site resources, vendor stylesheet libraries)
//! - Fetching from remote URLs or a local mirror directory
//! - Zip packaging of a generated site

pub mod archive;
pub mod fetcher;
pub mod manifest;

pub use archive::{Archiver, ZipArchiver};
pub use fetcher::{FetchFailure, FetchReport, ResourceFetcher, ResourceSource};
pub use manifest::ResourceSpec;
