//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Feed error: {0}")]
    Feed(#[from] curvemon_feed::FeedError),

    #[error("Site error: {0}")]
    Site(#[from] curvemon_site::SiteError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] curvemon_telemetry::TelemetryError),

    #[error("Invalid gateway event: {0}")]
    Event(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
