//! Admin status feed: follows `/updates` and hands every snapshot to a
//! handler.
//!
//! The feed is read-only and treats every problem as transient: malformed
//! snapshots are reported with their raw payload and skipped, and a closed
//! or failed connection is reopened after the policy's delay. Snapshots are
//! full state, so missed messages are harmless.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{MozzieError, Result};
use crate::session::protocol::StatusSnapshot;
use crate::session::reconnect::ReconnectPolicy;

/// Receives everything the feed produces.
#[async_trait]
pub trait StatusHandler: Send {
    /// A snapshot arrived.
    async fn on_snapshot(&mut self, snapshot: StatusSnapshot);

    /// A message failed to parse; `raw` is kept for diagnostics. The feed
    /// keeps listening.
    async fn on_malformed(&mut self, _raw: &str, _error: &MozzieError) {}

    /// The connection ended (cleanly or not) and the feed is about to apply
    /// its reconnect policy.
    async fn on_disconnect(&mut self, _error: Option<&MozzieError>) {}
}

/// Persistent subscription to the admin status feed.
pub struct StatusFeed {
    url: String,
    policy: ReconnectPolicy,
}

impl StatusFeed {
    pub fn new(url: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            url: url.into(),
            policy,
        }
    }

    /// Follow the feed until the policy gives up.
    ///
    /// With the default unbounded policy this never returns. With a bounded
    /// policy it returns the last transport error once attempts are
    /// exhausted, or `Ok(())` if the final session ended cleanly.
    pub async fn run<H: StatusHandler>(&self, handler: &mut H) -> Result<()> {
        let mut completed_attempts = 0u32;
        loop {
            let outcome = self.connect_and_stream(handler).await;
            handler.on_disconnect(outcome.as_ref().err()).await;
            completed_attempts += 1;

            match self.policy.next_delay(completed_attempts) {
                Some(delay) => tokio::time::sleep(delay).await,
                None => return outcome,
            }
        }
    }

    /// One connection lifetime: connect, deliver snapshots until the socket
    /// ends.
    async fn connect_and_stream<H: StatusHandler>(&self, handler: &mut H) -> Result<()> {
        let (socket, _response) = connect_async(self.url.as_str()).await.map_err(|e| {
            MozzieError::transport(format!("Failed to connect to {}: {}", self.url, e))
        })?;
        let (_sink, mut stream) = socket.split();

        while let Some(message) = stream.next().await {
            let message = message
                .map_err(|e| MozzieError::transport(format!("Connection error: {}", e)))?;

            match message {
                Message::Text(text) => match StatusSnapshot::from_json(text.as_str()) {
                    Ok(snapshot) => handler.on_snapshot(snapshot).await,
                    Err(error) => handler.on_malformed(text.as_str(), &error).await,
                },
                Message::Close(_) => return Ok(()),
                _ => {}
            }
        }

        Ok(())
    }
}
