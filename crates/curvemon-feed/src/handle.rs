//! Feed lifecycle.
//!
//! `spawn_feed` starts the configured acquisition task and hands back a
//! `FeedHandle` plus the event receiver. Stopping or dropping the handle tears
//! the feed down.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::{FeedConfig, FeedMode};
use crate::error::FeedResult;
use crate::event::FeedEvent;
use crate::event_stream::EventStreamClient;
use crate::poller::{HttpSnapshotSource, Poller, SnapshotSource};

/// Owner of a running feed task.
pub struct FeedHandle {
    shutdown: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl FeedHandle {
    fn new(shutdown: CancellationToken, task: Option<JoinHandle<()>>) -> Self {
        Self { shutdown, task }
    }

    /// Request teardown. Idempotent.
    pub fn stop(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Feed shutdown requested");
        }
        self.shutdown.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Whether an acquisition task was started and is still running.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the feed and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    error!(error = %e, "Feed task panicked");
                }
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Start the feed described by `config`.
///
/// A missing or empty URL starts nothing: the returned receiver is already
/// closed.
pub fn spawn_feed(config: &FeedConfig) -> FeedResult<(FeedHandle, mpsc::Receiver<FeedEvent>)> {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let shutdown = CancellationToken::new();

    let url = match config.url.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => url.to_string(),
        _ => {
            warn!("No feed URL configured, feed disabled");
            return Ok((FeedHandle::new(shutdown, None), rx));
        }
    };

    let task = match config.mode {
        FeedMode::Stream => {
            let client = EventStreamClient::new(url, config, tx, shutdown.clone())?;
            tokio::spawn(async move {
                if let Err(e) = client.run().await {
                    error!(error = %e, "Event stream stopped");
                }
            })
        }
        FeedMode::Poll => {
            let source = HttpSnapshotSource::new(url, config.request_timeout())?;
            let poller = Poller::new(source, config.poll_interval(), tx, shutdown.clone());
            tokio::spawn(poller.run())
        }
    };

    Ok((FeedHandle::new(shutdown, Some(task)), rx))
}

/// Start a poller over an arbitrary snapshot source.
pub fn spawn_poller<S: SnapshotSource>(
    source: S,
    config: &FeedConfig,
) -> (FeedHandle, mpsc::Receiver<FeedEvent>) {
    let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
    let shutdown = CancellationToken::new();
    let poller = Poller::new(source, config.poll_interval(), tx, shutdown.clone());
    let task = tokio::spawn(poller.run());
    (FeedHandle::new(shutdown, Some(task)), rx)
}
