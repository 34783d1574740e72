//! `/config.js` runtime configuration script.

use serde::Serialize;

use crate::error::SiteResult;
use crate::mime::NO_CACHE;
use crate::response::SiteResponse;

pub const DEFAULT_STREAM_URL: &str = "http://localhost:8080/curves/stream";
pub const DEFAULT_APP_ENV: &str = "prd";

/// Values exposed to the browser as `window.__APP_CONFIG__`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeConfig {
    #[serde(rename = "STREAM_URL")]
    pub stream_url: String,
    #[serde(rename = "APP_ENV")]
    pub app_env: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stream_url: DEFAULT_STREAM_URL.to_string(),
            app_env: DEFAULT_APP_ENV.to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Read `STREAM_URL` and `APP_ENV` from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            stream_url: lookup("STREAM_URL").unwrap_or_else(|| DEFAULT_STREAM_URL.to_string()),
            app_env: lookup("APP_ENV").unwrap_or_else(|| DEFAULT_APP_ENV.to_string()),
        }
    }

    pub fn script(&self) -> SiteResult<String> {
        Ok(format!(
            "window.__APP_CONFIG__ = {};",
            serde_json::to_string(self)?
        ))
    }

    pub fn response(&self) -> SiteResult<SiteResponse> {
        let body = self.script()?;
        let length = body.len();
        Ok(SiteResponse::text(200, &body)
            .with_header("Content-Type", "application/javascript; charset=utf-8")
            .with_header("Cache-Control", NO_CACHE)
            .with_header("Content-Length", length.to_string()))
    }
}
