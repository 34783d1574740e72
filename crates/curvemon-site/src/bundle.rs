//! In-memory asset bundle preloaded from the dist directory.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::{debug, error, info};
use walkdir::WalkDir;

use crate::error::{SiteError, SiteResult};
use crate::mime::{cache_control_for, content_type_for, is_binary};
use crate::response::{ResponseBody, SiteResponse};

pub const INDEX_PATH: &str = "/index.html";

/// Ready-made 200 responses keyed by `/<relative path>`.
#[derive(Debug, Clone, Default)]
pub struct AssetBundle {
    assets: HashMap<String, SiteResponse>,
}

impl AssetBundle {
    /// Read every file under `dist_dir`. Fails when the directory cannot be
    /// read or has no `index.html` at its root.
    pub fn load(dist_dir: &Path) -> SiteResult<Self> {
        let mut bundle = Self::default();
        if let Err(e) = bundle.preload(dist_dir) {
            error!(dist_dir = %dist_dir.display(), error = %e, "Failed to read dist directory");
            return Err(e);
        }
        if !bundle.contains(INDEX_PATH) {
            return Err(SiteError::IndexMissing);
        }

        let bytes: usize = bundle
            .assets
            .values()
            .filter_map(|r| r.header("Content-Length"))
            .filter_map(|len| len.parse::<usize>().ok())
            .sum();
        info!(
            dist_dir = %dist_dir.display(),
            assets = bundle.len(),
            bytes,
            "Asset bundle preloaded"
        );
        Ok(bundle)
    }

    fn preload(&mut self, root: &Path) -> SiteResult<()> {
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(root).to_path_buf();
                SiteError::DistUnreadable {
                    path,
                    source: e.into(),
                }
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .unwrap_or(path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let bytes = fs::read(path).map_err(|source| SiteError::DistUnreadable {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %relative, bytes = bytes.len(), "Preloaded asset");
            self.insert(&relative, bytes);
        }
        Ok(())
    }

    /// Add a file under its dist-relative path.
    pub fn insert(&mut self, relative_path: &str, bytes: Vec<u8>) {
        let relative_path = relative_path.replace('\\', "/");
        let relative_path = relative_path.trim_start_matches('/');
        let length = bytes.len();
        let body = ResponseBody::Asset {
            bytes,
            binary: is_binary(relative_path),
        };

        let response = SiteResponse::new(200, body)
            .with_header("Content-Type", content_type_for(relative_path))
            .with_header("Cache-Control", cache_control_for(relative_path))
            .with_header("Content-Length", length.to_string());
        self.assets.insert(format!("/{relative_path}"), response);
    }

    pub fn get(&self, path: &str) -> Option<&SiteResponse> {
        self.assets.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.assets.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Bundle keys, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.assets.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(root: &Path, relative: &str, bytes: &[u8]) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    }

    #[test]
    fn test_load_walks_nested_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.html", b"<html></html>");
        write(dir.path(), "assets/app.js", b"console.log(1)");
        write(dir.path(), "assets/img/logo.png", &[0x89, b'P', b'N', b'G']);

        let bundle = AssetBundle::load(dir.path()).unwrap();
        assert_eq!(
            bundle.paths(),
            vec!["/assets/app.js", "/assets/img/logo.png", "/index.html"]
        );

        let index = bundle.get("/index.html").unwrap();
        assert_eq!(
            index.headers,
            vec![
                ("Content-Type".to_string(), "text/html; charset=utf-8".to_string()),
                (
                    "Cache-Control".to_string(),
                    "no-cache, no-store, must-revalidate".to_string()
                ),
                ("Content-Length".to_string(), "13".to_string()),
            ]
        );

        let logo = bundle.get("/assets/img/logo.png").unwrap();
        assert_eq!(
            logo.body,
            ResponseBody::Asset {
                bytes: vec![0x89, b'P', b'N', b'G'],
                binary: true,
            }
        );
        assert_eq!(
            logo.header("Cache-Control"),
            Some("public, max-age=31536000, immutable")
        );
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let mut bundle = AssetBundle::default();
        bundle.insert("notes.txt", "héllo".as_bytes().to_vec());
        let notes = bundle.get("/notes.txt").unwrap();
        assert_eq!(notes.header("Content-Length"), Some("6"));
        assert_eq!(notes.body.clone().into_bytes(), "héllo".as_bytes());
    }

    #[test]
    fn test_invalid_utf8_kept_verbatim() {
        let raw = vec![0x00, 0x61, 0x73, 0x6d, 0xff, 0xfe, 0x80, 0x81];
        let mut bundle = AssetBundle::default();
        bundle.insert("app.wasm", raw.clone());

        let wasm = bundle.get("/app.wasm").unwrap();
        assert_eq!(wasm.header("Content-Length"), Some("8"));
        assert_eq!(
            wasm.body,
            ResponseBody::Asset {
                bytes: raw,
                binary: false,
            }
        );
    }

    #[test]
    fn test_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "assets/app.js", b"1");
        assert!(matches!(
            AssetBundle::load(dir.path()),
            Err(SiteError::IndexMissing)
        ));
    }

    #[test]
    fn test_unreadable_dist_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = AssetBundle::load(&missing).unwrap_err();
        assert!(matches!(err, SiteError::DistUnreadable { .. }));
        assert!(err.to_string().starts_with("dist assets missing"));
    }
}
