//! Static site configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Static site server and packaging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Built frontend bundle.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
    /// Address to bind.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Serve Prometheus metrics on this path (disabled when unset).
    #[serde(default)]
    pub metrics_path: Option<String>,
    /// Output directory for `package`.
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,
    /// Frontend build command run by `package` (skipped when unset).
    #[serde(default)]
    pub build_command: Option<String>,
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("build/site")
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            bind: default_bind(),
            port: default_port(),
            metrics_path: None,
            build_dir: default_build_dir(),
            build_command: None,
        }
    }
}

impl SiteConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.dist_dir, PathBuf::from("dist"));
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert!(config.metrics_path.is_none());
        assert!(config.build_command.is_none());
    }

    #[test]
    fn test_partial_json() {
        let config: SiteConfig =
            serde_json::from_str(r#"{"port":9000,"metrics_path":"/metrics"}"#).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.metrics_path.as_deref(), Some("/metrics"));
        assert_eq!(config.bind, "0.0.0.0");
    }
}
