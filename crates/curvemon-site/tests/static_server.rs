//! Static site tests over a real dist directory.
//!
//! Covers the axum router and the gateway adapter against the same bundle:
//! - Asset headers and bodies
//! - SPA fallback and 404 for file-like paths
//! - HEAD handling, 405, metrics path
//! - Non-UTF-8 asset bytes served verbatim

use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use curvemon_site::{create_router, GatewayEvent, RuntimeConfig, SiteConfig, StaticSite};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

const INDEX: &str = "<!doctype html><div id=\"root\"></div>";
const WASM: [u8; 8] = [0x00, 0x61, 0x73, 0x6d, 0xff, 0xfe, 0x80, 0x81];

fn dist() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let write = |relative: &str, bytes: &[u8]| {
        let path = dir.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, bytes).unwrap();
    };
    write("index.html", INDEX.as_bytes());
    write("assets/index-4f1c.js", b"console.log('curves')");
    write("favicon.ico", &[0, 0, 1, 0, 1, 0]);
    write("app.wasm", &WASM);
    dir
}

fn site(dist: &Path) -> Arc<StaticSite> {
    let bundle = curvemon_site::AssetBundle::load(dist).unwrap();
    let runtime = RuntimeConfig {
        stream_url: "https://curves.example.com/stream".to_string(),
        app_env: "stg".to_string(),
    };
    Arc::new(StaticSite::new(bundle, &runtime).unwrap())
}

fn router(dist: &Path, metrics_path: Option<&str>) -> Router {
    let config = SiteConfig {
        metrics_path: metrics_path.map(str::to_string),
        ..Default::default()
    };
    create_router(site(dist), &config)
}

async fn send(router: Router, method: &str, uri: &str) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

#[tokio::test]
async fn test_serves_assets_with_headers() {
    let dist = dist();

    let (status, headers, body) = send(router(dist.path(), None), "GET", "/assets/index-4f1c.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-type"], "application/javascript; charset=utf-8");
    assert_eq!(headers["cache-control"], "public, max-age=31536000, immutable");
    assert_eq!(headers["content-length"], "21");
    assert_eq!(body, b"console.log('curves')");

    let (status, _, body) = send(router(dist.path(), None), "GET", "/favicon.ico").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, vec![0, 0, 1, 0, 1, 0]);
}

#[tokio::test]
async fn test_non_utf8_asset_served_verbatim() {
    let dist = dist();

    let (status, headers, body) = send(router(dist.path(), None), "GET", "/app.wasm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, WASM);
    assert_eq!(headers["content-length"], body.len().to_string());
}

#[tokio::test]
async fn test_non_utf8_asset_over_socket() {
    let dist = dist();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(dist.path(), None);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /app.wasm HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut raw = Vec::new();
    stream.read_to_end(&mut raw).await.unwrap();

    let split = raw.windows(4).position(|w| w == b"\r\n\r\n").unwrap();
    let head = String::from_utf8_lossy(&raw[..split]).to_ascii_lowercase();
    assert!(head.starts_with("http/1.1 200"));
    assert!(head.contains("content-length: 8"));
    assert_eq!(&raw[split + 4..], WASM);
}

#[tokio::test]
async fn test_spa_fallback_and_not_found() {
    let dist = dist();

    let (status, headers, body) = send(router(dist.path(), None), "GET", "/curves/2024").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
    assert_eq!(body, INDEX.as_bytes());

    let (status, headers, body) = send(router(dist.path(), None), "GET", "/assets/gone.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers["content-type"], "text/plain; charset=utf-8");
    assert_eq!(body, b"Not found");
}

#[tokio::test]
async fn test_head_and_method_rules() {
    let dist = dist();

    let (status, headers, body) = send(router(dist.path(), None), "HEAD", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["content-length"], INDEX.len().to_string());
    assert!(body.is_empty());

    let (status, headers, _) = send(router(dist.path(), None), "DELETE", "/index.html").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers["allow"], "GET, HEAD");
}

#[tokio::test]
async fn test_config_script_from_runtime() {
    let dist = dist();
    let (status, headers, body) = send(router(dist.path(), None), "GET", "/config.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers["cache-control"], "no-cache, no-store, must-revalidate");
    assert_eq!(
        String::from_utf8(body).unwrap(),
        r#"window.__APP_CONFIG__ = {"STREAM_URL":"https://curves.example.com/stream","APP_ENV":"stg"};"#
    );
}

#[tokio::test]
async fn test_metrics_path_is_optional() {
    let dist = dist();

    let (status, headers, body) = send(router(dist.path(), Some("/metrics")), "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers["content-type"].to_str().unwrap().starts_with("text/plain"));
    assert!(String::from_utf8(body).is_ok());

    // Without the path configured it is just another client route.
    let (status, _, body) = send(router(dist.path(), None), "GET", "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, INDEX.as_bytes());
}

#[test]
fn test_gateway_event_end_to_end() {
    let dist = dist();
    let site = site(dist.path());

    let event: GatewayEvent = serde_json::from_str(
        r#"{
            "version": "2.0",
            "routeKey": "$default",
            "rawPath": "/live/favicon.ico",
            "headers": {"accept": "*/*"},
            "requestContext": {"stage": "live", "http": {"method": "GET", "path": "/live/favicon.ico"}}
        }"#,
    )
    .unwrap();

    let response = site.handle_event(&event);
    assert_eq!(response.status_code, 200);
    assert!(response.is_base64_encoded);
    assert_eq!(response.body, "AAABAAEA");

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["headers"]["Content-Type"], "image/x-icon");
    assert_eq!(json["headers"]["Content-Length"], "6");
}
