//! Polling acquisition.
//!
//! Fetches a snapshot immediately and then on every tick. Only one request is
//! ever in flight: a tick cancels the previous request before starting the
//! next, and a cancelled request never produces an event. Cancelling the
//! shutdown token stops the ticker and aborts the outstanding request.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use curvemon_core::CurveMessage;
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::error::{FeedError, FeedResult};
use crate::event::FeedEvent;

/// Something that can produce the latest curve snapshot.
pub trait SnapshotSource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = FeedResult<CurveMessage>> + Send;
}

/// Snapshot source backed by an HTTP GET endpoint.
pub struct HttpSnapshotSource {
    client: Client,
    url: String,
}

impl HttpSnapshotSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl SnapshotSource for HttpSnapshotSource {
    async fn fetch(&self) -> FeedResult<CurveMessage> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::ConnectionFailed(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::ConnectionFailed(format!("Failed to read body: {e}")))?;

        CurveMessage::from_json(&body).map_err(|e| FeedError::Parse(e.to_string()))
    }
}

/// A request currently in flight.
struct InFlight {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl InFlight {
    fn cancel(self) {
        self.token.cancel();
        self.handle.abort();
    }
}

/// Periodic snapshot poller.
pub struct Poller<S> {
    source: Arc<S>,
    interval: Duration,
    events: mpsc::Sender<FeedEvent>,
    shutdown: CancellationToken,
}

impl<S: SnapshotSource> Poller<S> {
    pub fn new(
        source: S,
        interval: Duration,
        events: mpsc::Sender<FeedEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            source: Arc::new(source),
            interval,
            events,
            shutdown,
        }
    }

    /// Run until the shutdown token is cancelled or the consumer goes away.
    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis(), "Starting poller");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight: Option<InFlight> = None;

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => {
                    debug!("Poller shutdown requested");
                    break;
                }
                // The first tick completes immediately, giving the initial fetch.
                _ = ticker.tick() => {
                    if self.events.is_closed() {
                        debug!("Feed consumer dropped, stopping poller");
                        break;
                    }
                    if let Some(previous) = in_flight.take() {
                        if !previous.handle.is_finished() {
                            trace!("Cancelling superseded poll request");
                        }
                        previous.cancel();
                    }
                    in_flight = Some(self.start_request());
                }
            }
        }

        if let Some(previous) = in_flight.take() {
            previous.cancel();
        }
        info!("Poller stopped");
    }

    fn start_request(&self) -> InFlight {
        let token = self.shutdown.child_token();
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let request_token = token.clone();

        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                () = request_token.cancelled() => return,
                result = source.fetch() => result,
            };

            if request_token.is_cancelled() {
                return;
            }

            let event = match result {
                Ok(curve) => {
                    if let Err(e) = curve.validate() {
                        warn!(error = %e, "Snapshot arrays have mismatched lengths");
                    }
                    FeedEvent::Message(curve)
                }
                Err(e) => {
                    warn!(error = %e, "Poll request failed");
                    FeedEvent::Error(e)
                }
            };

            let _ = events.send(event).await;
        });

        InFlight { token, handle }
    }
}
