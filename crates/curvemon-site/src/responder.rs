//! Request routing over the preloaded bundle.
//!
//! Lookup order: method check, `/config.js`, exact asset match, SPA fallback
//! to `index.html` for route-like paths, then 404.

use std::path::Path;

use tracing::debug;

use crate::bundle::{AssetBundle, INDEX_PATH};
use crate::error::{SiteError, SiteResult};
use crate::mime::NO_CACHE;
use crate::response::SiteResponse;
use crate::runtime_config::RuntimeConfig;

pub const CONFIG_SCRIPT_PATH: &str = "/config.js";

/// Serves one bundle. Built once per process and shared by all requests.
#[derive(Debug, Clone)]
pub struct StaticSite {
    bundle: AssetBundle,
    config_script: SiteResponse,
    not_found: SiteResponse,
}

impl StaticSite {
    pub fn new(bundle: AssetBundle, runtime: &RuntimeConfig) -> SiteResult<Self> {
        if !bundle.contains(INDEX_PATH) {
            return Err(SiteError::IndexMissing);
        }
        Ok(Self {
            bundle,
            config_script: runtime.response()?,
            not_found: not_found(),
        })
    }

    /// Preload `dist_dir` and capture the runtime config from the environment.
    pub fn load(dist_dir: &Path) -> SiteResult<Self> {
        Self::new(AssetBundle::load(dist_dir)?, &RuntimeConfig::from_env())
    }

    pub fn bundle(&self) -> &AssetBundle {
        &self.bundle
    }

    /// Answer `method` on an already stage-stripped `path`.
    pub fn respond(&self, method: &str, path: &str) -> SiteResponse {
        let method = method.to_ascii_uppercase();
        let is_head = match method.as_str() {
            "GET" => false,
            "HEAD" => true,
            _ => {
                debug!(%method, path, "Method not allowed");
                return method_not_allowed();
            }
        };

        let path = if path.is_empty() || path == "/" {
            INDEX_PATH
        } else {
            path
        };

        let response = self.lookup(path);
        debug!(%method, path, status = response.status, "Static response");
        if is_head {
            response.head()
        } else {
            response.clone()
        }
    }

    fn lookup(&self, path: &str) -> &SiteResponse {
        if path == CONFIG_SCRIPT_PATH {
            return &self.config_script;
        }
        if let Some(asset) = self.bundle.get(path) {
            return asset;
        }
        if looks_like_route(path) {
            if let Some(index) = self.bundle.get(INDEX_PATH) {
                return index;
            }
        }
        &self.not_found
    }
}

/// Client-side routes have no extension, or ask for an `.html` page.
fn looks_like_route(path: &str) -> bool {
    !path.contains('.') || path.ends_with(".html")
}

fn not_found() -> SiteResponse {
    SiteResponse::text(404, "Not found")
        .with_header("Content-Type", "text/plain; charset=utf-8")
        .with_header("Cache-Control", NO_CACHE)
}

fn method_not_allowed() -> SiteResponse {
    SiteResponse::text(405, "Method Not Allowed")
        .with_header("Allow", "GET, HEAD")
        .with_header("Content-Type", "text/plain; charset=utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::ResponseBody;

    fn site() -> StaticSite {
        let mut bundle = AssetBundle::default();
        bundle.insert("index.html", b"<div id=\"root\"></div>".to_vec());
        bundle.insert("assets/index-abc.js", b"import './x'".to_vec());
        bundle.insert("favicon.ico", vec![0, 0, 1, 0]);
        StaticSite::new(bundle, &RuntimeConfig::default()).unwrap()
    }

    fn body_text(response: &SiteResponse) -> &str {
        match &response.body {
            ResponseBody::Text(text) => text,
            ResponseBody::Asset {
                bytes,
                binary: false,
            } => std::str::from_utf8(bytes).unwrap(),
            other => panic!("expected text body, got {other:?}"),
        }
    }

    #[test]
    fn test_root_serves_index() {
        let site = site();
        for path in ["/", ""] {
            let response = site.respond("GET", path);
            assert_eq!(response.status, 200);
            assert_eq!(body_text(&response), "<div id=\"root\"></div>");
        }
    }

    #[test]
    fn test_asset_match() {
        let response = site().respond("get", "/assets/index-abc.js");
        assert_eq!(response.status, 200);
        assert_eq!(
            response.header("Content-Type"),
            Some("application/javascript; charset=utf-8")
        );
        assert_eq!(body_text(&response), "import './x'");
    }

    #[test]
    fn test_spa_fallback_for_routes() {
        let site = site();
        for path in ["/curves/history", "/about.html", "/deep/nested/route"] {
            let response = site.respond("GET", path);
            assert_eq!(response.status, 200, "{path}");
            assert_eq!(response.header("Content-Type"), Some("text/html; charset=utf-8"));
        }
    }

    #[test]
    fn test_file_like_paths_are_not_found() {
        let response = site().respond("GET", "/assets/missing.js");
        assert_eq!(response.status, 404);
        assert_eq!(body_text(&response), "Not found");
        assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.header("Cache-Control"), Some(NO_CACHE));
    }

    #[test]
    fn test_other_methods_rejected() {
        for method in ["POST", "put", "DELETE", "OPTIONS"] {
            let response = site().respond(method, "/");
            assert_eq!(response.status, 405);
            assert_eq!(response.header("Allow"), Some("GET, HEAD"));
            assert_eq!(body_text(&response), "Method Not Allowed");
        }
    }

    #[test]
    fn test_head_matches_get_headers() {
        let site = site();
        for path in ["/", "/favicon.ico", "/config.js", "/route", "/nope.png"] {
            let get = site.respond("GET", path);
            let head = site.respond("HEAD", path);
            assert_eq!(head.status, get.status, "{path}");
            assert_eq!(head.headers, get.headers, "{path}");
            assert_eq!(head.body, ResponseBody::Empty, "{path}");
        }
    }

    #[test]
    fn test_config_script() {
        let response = site().respond("GET", "/config.js");
        assert_eq!(response.status, 200);
        assert!(body_text(&response).starts_with("window.__APP_CONFIG__ = {"));
    }

    #[test]
    fn test_new_requires_index() {
        let bundle = AssetBundle::default();
        assert!(matches!(
            StaticSite::new(bundle, &RuntimeConfig::default()),
            Err(SiteError::IndexMissing)
        ));
    }
}
