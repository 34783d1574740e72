//! Main application logic.
//!
//! One [`Application`] per process; each CLI subcommand maps to one method.

use std::future::Future;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

use curvemon_core::CurveMessage;
use curvemon_dashboard::{render_text, ChartModel, DashboardState};
use curvemon_feed::{spawn_feed, ConnectionState, FeedEvent};
use curvemon_site::{prepare_bundle, GatewayEvent, GatewayResponse, PackageOptions, StaticSite};
use curvemon_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::error::AppResult;

/// Where `invoke` reads its gateway event from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Stdin,
    File(PathBuf),
}

impl From<&str> for EventSource {
    fn from(value: &str) -> Self {
        if value == "-" {
            EventSource::Stdin
        } else {
            EventSource::File(PathBuf::from(value))
        }
    }
}

/// Main application.
pub struct Application {
    config: AppConfig,
    state: DashboardState,
}

impl Application {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: DashboardState::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Run the feed and present every update until the feed ends or
    /// `shutdown` resolves.
    pub async fn run_watch<W, F>(&self, out: &mut W, shutdown: F) -> AppResult<()>
    where
        W: Write,
        F: Future<Output = ()>,
    {
        info!(
            mode = ?self.config.feed.mode,
            url = self.config.feed.url.as_deref().unwrap_or("-"),
            "Starting feed"
        );
        let (handle, mut events) = spawn_feed(&self.config.feed)?;

        Metrics::feed_state_set(self.state.connection().as_str());
        self.present(out, None)?;

        tokio::pin!(shutdown);
        let mut applied = 0u64;
        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else {
                        info!("Feed ended");
                        break;
                    };
                    applied += 1;
                    self.handle_event(event, out)?;
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        info!(applied, "Stopping feed");
        handle.shutdown().await;
        Ok(())
    }

    /// Fold one feed event into the dashboard and present the result.
    pub fn handle_event<W: Write>(&self, event: FeedEvent, out: &mut W) -> AppResult<()> {
        Metrics::feed_event(event.kind());

        let curve = match &event {
            FeedEvent::Message(curve) => {
                record_snapshot(curve);
                Some(curve.clone())
            }
            FeedEvent::Error(e) => {
                warn!(error = %e, "Feed error");
                None
            }
            FeedEvent::Open => {
                if self.state.connection() == ConnectionState::Error {
                    Metrics::feed_reconnected();
                    info!("Feed reconnected");
                } else {
                    info!("Feed connected");
                }
                None
            }
        };

        self.state.apply(event);
        Metrics::feed_state_set(self.state.connection().as_str());
        self.present(out, curve.as_ref())
    }

    fn present<W: Write>(&self, out: &mut W, new_curve: Option<&CurveMessage>) -> AppResult<()> {
        let dashboard = &self.config.dashboard;
        let snapshot = self.state.collect_snapshot();

        if dashboard.json {
            serde_json::to_writer(&mut *out, &snapshot)?;
            writeln!(out)?;
        } else if dashboard.print_text {
            writeln!(out, "{}", render_text(&snapshot))?;
        }
        out.flush()?;

        if let (Some(path), Some(curve)) = (&dashboard.svg_out, new_curve) {
            match ChartModel::build(curve) {
                Some(chart) => {
                    // Logged only; the feed keeps running.
                    if let Err(e) = std::fs::write(path, chart.render_svg()) {
                        warn!(path = %path.display(), error = %e, "Failed to write chart");
                    } else {
                        debug!(path = %path.display(), "Chart written");
                    }
                }
                None => debug!("Curve has no points, chart skipped"),
            }
        }
        Ok(())
    }

    /// Serve the static site over HTTP until `shutdown` resolves.
    pub async fn run_serve<F>(&self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let site = Arc::new(StaticSite::load(&self.config.site.dist_dir)?);
        curvemon_site::run_server(site, &self.config.site, shutdown).await?;
        Ok(())
    }

    /// Answer one gateway event against the configured dist directory.
    pub fn invoke(&self, source: &EventSource) -> AppResult<GatewayResponse> {
        let raw = match source {
            EventSource::Stdin => {
                let mut buf = String::new();
                std::io::stdin().read_to_string(&mut buf)?;
                buf
            }
            EventSource::File(path) => std::fs::read_to_string(path)?,
        };
        let event: GatewayEvent = serde_json::from_str(&raw)?;

        let site = StaticSite::load(&self.config.site.dist_dir)?;
        let response = site.handle_event(&event);
        Metrics::site_response(response.status_code);
        info!(
            method = %event.method(),
            path = %event.path(),
            status = response.status_code,
            "Gateway event handled"
        );
        Ok(response)
    }

    /// Stage the deployable bundle.
    pub fn package(&self, skip_build: bool) -> AppResult<PathBuf> {
        let site = &self.config.site;
        let options = PackageOptions {
            dist_dir: site.dist_dir.clone(),
            build_dir: site.build_dir.clone(),
            build_command: if skip_build {
                None
            } else {
                site.build_command.clone()
            },
        };
        Ok(prepare_bundle(&options)?)
    }
}

fn record_snapshot(curve: &CurveMessage) {
    if let Err(e) = curve.validate() {
        warn!(error = %e, timestamp = %curve.timestamp, "Curve series lengths differ");
    }
    let timestamp = curve.parsed_timestamp().ok().map(|ts| ts.timestamp());
    Metrics::snapshot_received(curve.raw_points().len(), timestamp);
    debug!(
        timestamp = %curve.timestamp,
        raw_points = curve.tenor_years.len(),
        fit_points = curve.fit.grid_years.len(),
        "Curve received"
    );
}
