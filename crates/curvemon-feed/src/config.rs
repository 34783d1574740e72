//! Feed configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How snapshots are acquired from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// Server-pushed event stream (`text/event-stream`).
    #[default]
    Stream,
    /// Periodic GET of the latest snapshot.
    Poll,
}

/// Feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Acquisition mode.
    #[serde(default)]
    pub mode: FeedMode,
    /// Endpoint URL. `None` disables the feed entirely.
    #[serde(default = "default_url")]
    pub url: Option<String>,
    /// Poll interval in milliseconds (poll mode).
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Per-request timeout in milliseconds (poll mode) and connect timeout
    /// (stream mode).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Reconnect delay when the server has not sent a `retry:` field.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Upper bound for the reconnect delay after repeated failures.
    #[serde(default = "default_reconnect_max_delay_ms")]
    pub reconnect_max_delay_ms: u64,
    /// Maximum consecutive reconnection attempts (0 = infinite).
    #[serde(default)]
    pub max_reconnect_attempts: u32,
    /// Capacity of the event channel handed to the consumer.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_url() -> Option<String> {
    Some("http://localhost:8000/curves/stream".to_string())
}

fn default_poll_interval_ms() -> u64 {
    1_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_reconnect_max_delay_ms() -> u64 {
    30_000
}

fn default_channel_capacity() -> usize {
    64
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            mode: FeedMode::default(),
            url: default_url(),
            poll_interval_ms: default_poll_interval_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            reconnect_max_delay_ms: default_reconnect_max_delay_ms(),
            max_reconnect_attempts: 0,
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl FeedConfig {
    pub fn poll_interval(&self) -> Duration {
        // A zero period would make tokio's interval panic.
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.mode, FeedMode::Stream);
        assert_eq!(config.poll_interval_ms, 1_000);
        assert_eq!(config.max_reconnect_attempts, 0); // Infinite
        assert!(config.url.is_some());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: FeedConfig = parse(r#"{"mode": "poll", "poll_interval_ms": 250}"#);
        assert_eq!(config.mode, FeedMode::Poll);
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.reconnect_delay_ms, 3_000);
    }

    #[test]
    fn test_zero_interval_is_clamped() {
        let config = FeedConfig {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    fn parse(json: &str) -> FeedConfig {
        serde_json::from_str(json).unwrap()
    }
}
