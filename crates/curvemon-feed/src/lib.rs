//! Curve snapshot acquisition for curvemon.
//!
//! Keeps a consumer in step with a live curve backend under either model:
//! - Push: `text/event-stream` with browser-style reconnection
//! - Pull: periodic GET with one request in flight at a time
//!
//! Both deliver `FeedEvent`s over an mpsc channel and stop when their
//! `FeedHandle` is stopped or dropped.

pub mod config;
pub mod error;
pub mod event;
pub mod event_stream;
pub mod handle;
pub mod poller;
pub mod sse;

pub use config::{FeedConfig, FeedMode};
pub use error::{FeedError, FeedResult};
pub use event::{ConnectionState, FeedEvent};
pub use event_stream::EventStreamClient;
pub use handle::{spawn_feed, spawn_poller, FeedHandle};
pub use poller::{HttpSnapshotSource, Poller, SnapshotSource};
pub use sse::{SseDecoder, SseEvent};
