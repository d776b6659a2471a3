use super::{FeedClient, FeedEvent};
use async_trait::async_trait;
use tokio::sync::mpsc;

pub type FeedSender = mpsc::Sender<FeedEvent>;

/// Feed backed by a tokio MPSC channel.
///
/// Events sent before anyone reads wait in the channel, which is how events that arrive
/// while the topology is still loading are held back.
pub struct ChannelFeed {
    receiver: mpsc::Receiver<FeedEvent>,
}

impl ChannelFeed {
    pub fn new(receiver: mpsc::Receiver<FeedEvent>) -> Self {
        Self { receiver }
    }
}

/// Creates a connected sender/feed pair.
pub fn channel(capacity: usize) -> (FeedSender, ChannelFeed) {
    let (sender, receiver) = mpsc::channel(capacity);
    (sender, ChannelFeed::new(receiver))
}

#[async_trait]
impl FeedClient for ChannelFeed {
    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.receiver.recv().await
    }
}
