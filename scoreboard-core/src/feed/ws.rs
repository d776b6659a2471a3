use super::{channel, ChannelFeed, FeedEvent, FeedSender};
use crate::error::FeedError;
use futures::StreamExt;
use log::{debug, info, warn};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Push feed over a WebSocket.
///
/// The connection task emits `Connect` when a socket opens, `Scores` for every scores frame and
/// `Disconnect` when an open socket drops, then reconnects after `reconnect_delay`. Failed
/// connection attempts are only logged. The task ends once the feed is dropped.
pub struct WsFeed {
    url: String,
    reconnect_delay: Duration,
}

impl WsFeed {
    pub fn new(url: &str, reconnect_delay: Duration) -> Self {
        Self {
            url: url.to_string(),
            reconnect_delay,
        }
    }

    /// Starts the connection task and returns the feed it fills.
    pub fn spawn(self) -> (ChannelFeed, JoinHandle<()>) {
        let (sender, feed) = channel(64);
        let handle = tokio::spawn(self.run(sender));
        (feed, handle)
    }

    async fn run(self, sender: FeedSender) {
        loop {
            match connect_async(self.url.as_str()).await {
                Ok((socket, _)) => {
                    info!("Feed connected to {}", self.url);
                    if sender.send(FeedEvent::Connect).await.is_err() {
                        return;
                    }
                    let reason = match pump(socket, &sender).await {
                        Ok(()) => "closed by server".to_string(),
                        Err(e) => e.to_string(),
                    };
                    if sender.is_closed() {
                        return;
                    }
                    warn!("Feed disconnected from {}: {}", self.url, reason);
                    if sender.send(FeedEvent::Disconnect).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!("Feed connection to {} failed: {}", self.url, e),
            }

            tokio::time::sleep(self.reconnect_delay).await;
            if sender.is_closed() {
                return;
            }
        }
    }
}

/// Parses one text frame.
pub fn decode_frame(text: &str) -> Result<FeedEvent, FeedError> {
    Ok(serde_json::from_str(text)?)
}

/// Forwards scores frames until the socket closes or the feed is dropped.
async fn pump(mut socket: Socket, sender: &FeedSender) -> Result<(), FeedError> {
    while let Some(message) = socket.next().await {
        match message? {
            Message::Text(text) => match decode_frame(&text) {
                Ok(event @ FeedEvent::Scores(_)) => {
                    if sender.send(event).await.is_err() {
                        return Ok(());
                    }
                }
                Ok(other) => debug!("Feed: ignoring {} frame from server", other.name()),
                Err(e) => warn!("Feed: dropping frame: {}", e),
            },
            Message::Close(frame) => {
                debug!("Feed: close frame {:?}", frame);
                break;
            }
            _ => {}
        }
    }
    Ok(())
}
