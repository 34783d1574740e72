//! Event-stream acquisition.
//!
//! Holds a long-lived GET open against a `text/event-stream` endpoint and
//! turns each `message` event into a curve snapshot. Reconnects after network
//! failures, non-200 statuses, and end of stream, waiting the server's
//! `retry:` value (or the configured delay) doubled per consecutive failure.
//! HTTP 204 tells the client to stop for good.
//!
//! Unlike a browser `EventSource`, which fails the connection permanently on a
//! non-200 status or a non-`text/event-stream` content type, this client
//! treats both as transient and reconnects; `max_reconnect_attempts` bounds
//! how long it keeps trying.

use std::time::Duration;

use curvemon_core::CurveMessage;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::event::FeedEvent;
use crate::sse::{SseDecoder, SseEvent};

const LAST_EVENT_ID: &str = "Last-Event-ID";

/// How a single connection ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// Shutdown requested or consumer gone.
    Shutdown,
    /// Server answered 204 No Content.
    NoContent,
}

/// Event-stream client with automatic reconnection.
pub struct EventStreamClient {
    url: String,
    client: Client,
    reconnect_delay: Duration,
    reconnect_max_delay: Duration,
    max_reconnect_attempts: u32,
    events: mpsc::Sender<FeedEvent>,
    shutdown: CancellationToken,
    decoder: SseDecoder,
}

impl EventStreamClient {
    pub fn new(
        url: impl Into<String>,
        config: &FeedConfig,
        events: mpsc::Sender<FeedEvent>,
        shutdown: CancellationToken,
    ) -> FeedResult<Self> {
        // No overall timeout: the response body is meant to stay open.
        let client = Client::builder()
            .connect_timeout(config.request_timeout())
            .build()
            .map_err(|e| FeedError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            client,
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            reconnect_max_delay: Duration::from_millis(config.reconnect_max_delay_ms),
            max_reconnect_attempts: config.max_reconnect_attempts,
            events,
            shutdown,
            decoder: SseDecoder::new(),
        })
    }

    /// Connect and keep reconnecting until shutdown, 204, or retries run out.
    pub async fn run(mut self) -> FeedResult<()> {
        let mut attempt = 0u32;

        loop {
            if self.shutdown.is_cancelled() {
                info!("Shutdown requested, exiting event stream loop");
                return Ok(());
            }

            let mut opened = false;
            match self.session(&mut opened).await {
                Ok(SessionEnd::Shutdown) => {
                    debug!("Event stream shut down");
                    return Ok(());
                }
                Ok(SessionEnd::NoContent) => {
                    info!(url = %self.url, "Server returned 204, not reconnecting");
                    return Ok(());
                }
                Err(e) => {
                    if self.shutdown.is_cancelled() {
                        return Ok(());
                    }
                    error!(error = %e, "Event stream connection error");
                    if self.events.send(FeedEvent::Error(e)).await.is_err() {
                        return Ok(());
                    }
                }
            }

            if opened {
                attempt = 0;
            }
            attempt += 1;

            if self.max_reconnect_attempts > 0 && attempt >= self.max_reconnect_attempts {
                error!(attempt, "Max reconnection attempts reached");
                return Err(FeedError::RetriesExhausted(attempt));
            }

            let delay = self.backoff_delay(attempt);
            warn!(attempt, delay_ms = delay.as_millis(), "Reconnecting");

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = self.shutdown.cancelled() => {
                    info!("Shutdown requested during backoff, exiting");
                    return Ok(());
                }
            }
        }
    }

    async fn session(&mut self, opened: &mut bool) -> FeedResult<SessionEnd> {
        info!(url = %self.url, "Connecting to event stream");

        let mut request = self
            .client
            .get(&self.url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = self.decoder.last_event_id().filter(|id| !id.is_empty()) {
            request = request.header(LAST_EVENT_ID, id);
        }

        let response = tokio::select! {
            biased;
            () = self.shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
            response = request.send() => response
                .map_err(|e| FeedError::ConnectionFailed(format!("HTTP request failed: {e}")))?,
        };

        let status = response.status();
        if status == StatusCode::NO_CONTENT {
            return Ok(SessionEnd::NoContent);
        }
        if status != StatusCode::OK {
            return Err(FeedError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(FeedError::ContentType(content_type));
        }

        *opened = true;
        info!("Event stream connected");
        if self.events.send(FeedEvent::Open).await.is_err() {
            return Ok(SessionEnd::Shutdown);
        }

        self.decoder.reset_partial();
        let mut body = response.bytes_stream();

        loop {
            tokio::select! {
                biased;
                () = self.shutdown.cancelled() => return Ok(SessionEnd::Shutdown),
                chunk = body.next() => match chunk {
                    Some(Ok(bytes)) => {
                        for event in self.decoder.feed(&bytes) {
                            if !self.deliver(event).await {
                                return Ok(SessionEnd::Shutdown);
                            }
                        }
                    }
                    Some(Err(e)) => {
                        return Err(FeedError::ConnectionFailed(format!("Stream read failed: {e}")));
                    }
                    None => return Err(FeedError::StreamClosed),
                },
            }
        }
    }

    /// Forward a decoded event. Returns `false` once the consumer is gone.
    async fn deliver(&self, event: SseEvent) -> bool {
        if event.event != "message" {
            trace!(event = %event.event, "Ignoring non-message event");
            return true;
        }

        let curve = match CurveMessage::from_json(&event.data) {
            Ok(curve) => curve,
            Err(e) => {
                error!(error = %e, "Failed to parse SSE payload");
                return true;
            }
        };
        if let Err(e) = curve.validate() {
            warn!(error = %e, "Snapshot arrays have mismatched lengths");
        }

        self.events.send(FeedEvent::Message(curve)).await.is_ok()
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let base = self.decoder.retry().unwrap_or(self.reconnect_delay);
        // A server-requested retry larger than the cap still wins.
        let max = self.reconnect_max_delay.max(base);

        // attempt=1 -> base, attempt=2 -> 2*base, attempt=3 -> 4*base
        let exponent = attempt.saturating_sub(1).min(10);
        base.saturating_mul(1u32 << exponent).min(max)
    }
}
