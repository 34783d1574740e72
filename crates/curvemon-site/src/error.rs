//! Static site error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or packaging the asset bundle.
#[derive(Debug, Error)]
pub enum SiteError {
    /// The dist directory could not be walked.
    #[error("dist assets missing: failed to read {path}: {source}")]
    DistUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bundle has no `/index.html`.
    #[error("index.html not found in dist directory")]
    IndexMissing,

    /// Packaging was asked for a dist directory that does not exist.
    #[error("dist directory not found at {0}. Run the frontend build first.")]
    DistNotFound(PathBuf),

    /// The frontend build command failed.
    #[error("build command `{command}` failed: {reason}")]
    BuildFailed { command: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SiteResult<T> = Result<T, SiteError>;
