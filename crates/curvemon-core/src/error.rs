//! Error types for curvemon-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Length mismatch in {series}: {left} tenors vs {right} rates")]
    LengthMismatch {
        series: &'static str,
        left: usize,
        right: usize,
    },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
