//! # Feed
//!
//! The boundary to the score transport.
//!
//! - Push: [`FeedClient`] yields [`FeedEvent`]s. [`WsFeed`] drives a WebSocket connection,
//!   [`ChannelFeed`] is the in-process variant.
//! - Pull: [`SnapshotSource`] is the one-shot `GET /scores.json`, implemented by [`HttpSource`]
//!   together with the systems config fetch.
//!
//! Frames on the wire are JSON: `{"event": "scores", "data": {...}}`, `{"event": "connect"}`,
//! `{"event": "disconnect"}`.

pub mod channel;
pub mod http;
pub mod ws;

pub use channel::{channel, ChannelFeed, FeedSender};
pub use http::HttpSource;
pub use ws::WsFeed;

use crate::error::FetchError;
use crate::snapshot::ScoreSnapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One push feed event.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum FeedEvent {
    Connect,
    Disconnect,
    /// A full snapshot.
    Scores(ScoreSnapshot),
}

impl FeedEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
            Self::Scores(_) => "scores",
        }
    }
}

/// Live source of feed events.
#[async_trait]
pub trait FeedClient: Send {
    /// The next event, or `None` once the feed is closed for good.
    async fn next_event(&mut self) -> Option<FeedEvent>;
}

/// One-shot snapshot pull.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// `Ok(None)` when the endpoint answers with a non-success status.
    async fn fetch_snapshot(&self) -> Result<Option<ScoreSnapshot>, FetchError>;
}
