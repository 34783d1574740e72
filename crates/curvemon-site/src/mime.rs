//! Content type, binary encoding and cache policy by file name.

use std::path::Path;

pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const IMMUTABLE: &str = "public, max-age=31536000, immutable";
const SHORT_LIVED: &str = "public, max-age=300";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".webp", ".ico", ".woff", ".woff2",
];

/// Lowercase extension of `path` including the dot, e.g. `.js`.
fn extension(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
}

pub fn content_type_for(path: &str) -> &'static str {
    match extension(path).as_deref() {
        Some(".html") => "text/html; charset=utf-8",
        Some(".js") => "application/javascript; charset=utf-8",
        Some(".css") => "text/css; charset=utf-8",
        Some(".json") | Some(".map") => "application/json; charset=utf-8",
        Some(".png") => "image/png",
        Some(".jpg") | Some(".jpeg") => "image/jpeg",
        Some(".gif") => "image/gif",
        Some(".webp") => "image/webp",
        Some(".svg") => "image/svg+xml; charset=utf-8",
        Some(".ico") => "image/x-icon",
        Some(".txt") => "text/plain; charset=utf-8",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Whether gateway responses carry this file base64-encoded.
pub fn is_binary(path: &str) -> bool {
    extension(path).is_some_and(|ext| BINARY_EXTENSIONS.contains(&ext.as_str()))
}

/// Cache policy for a path relative to the dist root (no leading slash).
pub fn cache_control_for(relative_path: &str) -> &'static str {
    if relative_path == "index.html" {
        NO_CACHE
    } else if relative_path.starts_with("assets/") {
        IMMUTABLE
    } else {
        SHORT_LIVED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(
            content_type_for("assets/app.JS"),
            "application/javascript; charset=utf-8"
        );
        assert_eq!(
            content_type_for("assets/app.js.map"),
            "application/json; charset=utf-8"
        );
        assert_eq!(content_type_for("logo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("fonts/inter.woff2"), DEFAULT_CONTENT_TYPE);
        assert_eq!(content_type_for("LICENSE"), DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn test_binary_extensions() {
        assert!(is_binary("favicon.ico"));
        assert!(is_binary("assets/photo.PNG"));
        assert!(is_binary("fonts/inter.woff2"));
        assert!(!is_binary("icon.svg"));
        assert!(!is_binary("robots.txt"));
        assert!(!is_binary("README"));
    }

    #[test]
    fn test_cache_control() {
        assert_eq!(cache_control_for("index.html"), NO_CACHE);
        assert_eq!(cache_control_for("assets/index-3f2a.js"), IMMUTABLE);
        assert_eq!(cache_control_for("favicon.ico"), SHORT_LIVED);
        // Only the root document is uncached.
        assert_eq!(cache_control_for("docs/index.html"), SHORT_LIVED);
    }
}
