//! Application configuration.

use std::path::Path;

use curvemon_dashboard::DashboardConfig;
use curvemon_feed::FeedConfig;
use curvemon_site::SiteConfig;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AppError, AppResult};

pub const CONFIG_ENV: &str = "CURVEMON_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Top-level configuration, one section per component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Like [`from_file`](Self::from_file), but a missing file means defaults.
    pub fn load(path: &str) -> AppResult<Self> {
        if !Path::new(path).exists() {
            warn!(config_path = %path, "Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(path)
    }

    /// Config path: CLI arg > `CURVEMON_CONFIG` > default.
    pub fn resolve_path(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(CONFIG_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// `STREAM_URL` replaces the feed URL.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("STREAM_URL") {
            self.feed.url = Some(url);
        }
    }
}
