//! Feed error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Stream closed by server")]
    StreamClosed,

    #[error("Unexpected content type: {0}")]
    ContentType(String),

    #[error("Payload parse error: {0}")]
    Parse(String),

    #[error("Max reconnection attempts reached ({0})")]
    RetriesExhausted(u32),
}

pub type FeedResult<T> = Result<T, FeedError>;
