//! HTTP server implementation using axum.
//!
//! Every request goes through the same [`StaticSite`] responder as gateway
//! events, so local serving and the deployed handler behave identically.

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use curvemon_telemetry::Metrics;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::SiteConfig;
use crate::error::SiteResult;
use crate::responder::StaticSite;
use crate::response::SiteResponse;

/// Create the axum router.
pub fn create_router(site: Arc<StaticSite>, config: &SiteConfig) -> Router {
    let mut router = Router::new();
    if let Some(path) = &config.metrics_path {
        let path = if path.starts_with('/') {
            path.clone()
        } else {
            format!("/{path}")
        };
        router = router.route(&path, get(serve_metrics));
    }

    router
        .fallback(serve_static)
        .with_state(site)
        .layer(TraceLayer::new_for_http())
}

async fn serve_static(State(site): State<Arc<StaticSite>>, method: Method, uri: Uri) -> Response {
    let response = site.respond(method.as_str(), uri.path());
    Metrics::site_response(response.status);
    into_http(response)
}

async fn serve_metrics() -> Response {
    match Metrics::gather_text() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn into_http(response: SiteResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let mut builder = axum::http::Response::builder().status(status);
    for (name, value) in &response.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    match builder.body(Body::from(response.body.into_bytes())) {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "Invalid static response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Run the static site HTTP server until `shutdown` resolves.
pub async fn run_server<F>(site: Arc<StaticSite>, config: &SiteConfig, shutdown: F) -> SiteResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    Metrics::site_assets(site.bundle().len());
    let app = create_router(site, config);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(
        addr = %addr,
        metrics_path = config.metrics_path.as_deref().unwrap_or("-"),
        "Starting static site server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Static site server stopped");
    Ok(())
}
