//! Events delivered to feed consumers.

use curvemon_core::CurveMessage;

use crate::error::FeedError;

/// A single notification from a running feed.
#[derive(Debug)]
pub enum FeedEvent {
    /// The event stream connected (stream mode only).
    Open,
    /// A new snapshot arrived.
    Message(CurveMessage),
    /// A network, status, or parse failure. The feed keeps retrying.
    Error(FeedError),
}

impl FeedEvent {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FeedEvent::Open => "open",
            FeedEvent::Message(_) => "message",
            FeedEvent::Error(_) => "error",
        }
    }
}

/// Connection state as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Open,
    Error,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Error => "error",
        }
    }
}
