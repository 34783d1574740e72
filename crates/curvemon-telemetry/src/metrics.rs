//! Prometheus metrics for curvemon.
//!
//! Covers:
//! - Feed connection state and event counts
//! - Latest snapshot shape and age
//! - Static site responses
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. Registration only fails on duplicate
//! metric names, which is a startup bug, and only during static
//! initialization.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_gauge_vec, register_int_counter,
    register_int_gauge, CounterVec, Encoder, Gauge, GaugeVec, IntCounter, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Feed connection state (1 = open, 0 = otherwise).
pub static FEED_CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!("curvemon_feed_connected", "Feed connection state (1=open)").unwrap()
});

/// Feed state machine current state.
/// Labels: state (connecting/open/error)
pub static FEED_STATE: Lazy<GaugeVec> = Lazy::new(|| {
    register_gauge_vec!(
        "curvemon_feed_state",
        "Feed connection state (1=active, 0=inactive)",
        &["state"]
    )
    .unwrap()
});

/// Feed events received, by kind (open/message/error).
pub static FEED_EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "curvemon_feed_events_total",
        "Total feed events received",
        &["kind"]
    )
    .unwrap()
});

/// Successful reconnections after a feed error.
pub static FEED_RECONNECTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "curvemon_feed_reconnects_total",
        "Feed connections re-established after an error"
    )
    .unwrap()
});

/// Raw observations in the latest snapshot.
pub static SNAPSHOT_POINTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "curvemon_snapshot_points",
        "Raw tenor observations in the latest snapshot"
    )
    .unwrap()
});

/// Producer timestamp of the latest snapshot (Unix seconds).
pub static SNAPSHOT_TIMESTAMP: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "curvemon_snapshot_timestamp_seconds",
        "Producer timestamp of the latest snapshot"
    )
    .unwrap()
});

/// Static site responses, by status code.
pub static SITE_RESPONSES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "curvemon_site_responses_total",
        "Total static site responses",
        &["status"]
    )
    .unwrap()
});

/// Assets preloaded into the static site bundle.
pub static SITE_ASSETS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("curvemon_site_assets", "Assets preloaded into memory").unwrap()
});

const FEED_STATES: [&str; 3] = ["connecting", "open", "error"];

/// Facade over the metric statics.
pub struct Metrics;

impl Metrics {
    /// Set the feed state. Only the active state is 1.
    pub fn feed_state_set(state: &str) {
        for s in FEED_STATES {
            FEED_STATE
                .with_label_values(&[s])
                .set(if s == state { 1.0 } else { 0.0 });
        }
        FEED_CONNECTED.set(if state == "open" { 1.0 } else { 0.0 });
    }

    /// Record a feed event.
    pub fn feed_event(kind: &str) {
        FEED_EVENTS_TOTAL.with_label_values(&[kind]).inc();
    }

    pub fn feed_reconnected() {
        FEED_RECONNECTS_TOTAL.inc();
    }

    /// Record the shape of the latest snapshot.
    pub fn snapshot_received(points: usize, timestamp_secs: Option<i64>) {
        SNAPSHOT_POINTS.set(points as i64);
        if let Some(ts) = timestamp_secs {
            SNAPSHOT_TIMESTAMP.set(ts as f64);
        }
    }

    /// Record a static site response.
    pub fn site_response(status: u16) {
        SITE_RESPONSES_TOTAL
            .with_label_values(&[&status.to_string()])
            .inc();
    }

    /// Record the preloaded asset count.
    pub fn site_assets(count: usize) {
        SITE_ASSETS.set(count as i64);
    }

    /// Render every registered metric in the text exposition format.
    pub fn gather_text() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
