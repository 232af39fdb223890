//! Error taxonomy for site generation
//!
//! Core components return [`BuildError`] so callers can tell a route
//! collision from an I/O failure or a broken external tool. Orchestration
//! layers wrap these in `anyhow` with extra context.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while walking, rendering, or assembling a site
#[derive(Debug, Error)]
pub enum BuildError {
    /// Two routes in one generated document share a handler name
    #[error(
        "duplicate handler name '{name}': generated for both '{first}' and '{second}' \
         (rename one of the source files)"
    )]
    DuplicateHandlerName {
        name: String,
        first: String,
        second: String,
    },

    /// Two routes in one generated document share a URL path
    #[error("duplicate url path '/{url}': declared by both '{first}' and '{second}'")]
    DuplicateUrlPath {
        url: String,
        first: String,
        second: String,
    },

    #[error("I/O error at {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("directory walk failed")]
    Walk(#[from] walkdir::Error),

    /// An external tool ran but reported failure
    #[error("{tool} failed: {detail}")]
    ToolFailed { tool: &'static str, detail: String },

    /// An external tool could not be started at all
    #[error("could not run {tool}")]
    ToolUnavailable {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid destination: {}", .0.display())]
    InvalidDestination(PathBuf),

    #[error("invalid configuration in {}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A hard-required remote resource could not be populated
    #[error("required resource '{name}' could not be populated: {detail}")]
    RequiredResource { name: String, detail: String },

    #[error("could not write archive")]
    Archive(#[from] zip::result::ZipError),
}

impl BuildError {
    /// Attach a path to an I/O error
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, BuildError>;

/// Extension for attaching the offending path to `std::io::Result`
pub(crate) trait IoResultExt<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn at(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|e| BuildError::io(path, e))
    }
}
