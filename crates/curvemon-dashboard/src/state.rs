//! Dashboard state management.
//!
//! DashboardState folds feed events into what the view shows: the latest
//! curve, the connection state, and the last user-facing error.

use std::sync::Arc;

use chrono::Utc;
use curvemon_core::CurveMessage;
use curvemon_feed::{ConnectionState, FeedEvent};
use parking_lot::RwLock;
use tracing::debug;

use crate::types::DashboardSnapshot;

/// Message shown while the feed is retrying.
pub const RETRY_MESSAGE: &str = "Connection lost. Retrying automatically...";

#[derive(Debug, Default)]
struct Inner {
    curve: Option<CurveMessage>,
    connection: ConnectionState,
    last_error: Option<String>,
    /// Bumped on every applied event.
    version: u64,
    updated_at_ms: Option<i64>,
}

/// Shared dashboard state. Cloning shares the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    inner: Arc<RwLock<Inner>>,
}

impl DashboardState {
    /// Start in `Connecting` with no curve and no error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a feed event.
    pub fn apply(&self, event: FeedEvent) {
        let mut inner = self.inner.write();
        match event {
            FeedEvent::Message(curve) => {
                inner.curve = Some(curve);
                inner.connection = ConnectionState::Open;
                inner.last_error = None;
            }
            FeedEvent::Open => {
                inner.connection = ConnectionState::Open;
                inner.last_error = None;
            }
            FeedEvent::Error(e) => {
                debug!(error = %e, "Feed error applied to dashboard");
                inner.connection = ConnectionState::Error;
                inner.last_error = Some(RETRY_MESSAGE.to_string());
            }
        }
        inner.version += 1;
        inner.updated_at_ms = Some(Utc::now().timestamp_millis());
    }

    pub fn connection(&self) -> ConnectionState {
        self.inner.read().connection
    }

    pub fn curve(&self) -> Option<CurveMessage> {
        self.inner.read().curve.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Number of events applied so far.
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }

    /// Collect a consistent snapshot of the current state.
    pub fn collect_snapshot(&self) -> DashboardSnapshot {
        let inner = self.inner.read();
        DashboardSnapshot {
            connection: inner.connection,
            curve: inner.curve.clone(),
            last_error: inner.last_error.clone(),
            version: inner.version,
            updated_at_ms: inner.updated_at_ms,
        }
    }
}
