//! NATS replies for claim requests

use anyhow::{Context, Result};
use async_nats::{Client, Subject};
use serde::Serialize;
use tracing::{debug, warn};

/// Publishes JSON replies to request inboxes
#[derive(Clone)]
pub struct ReplyPublisher {
    client: Client,
}

impl ReplyPublisher {
    /// Create a new reply publisher
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Serialize `body` and send it to the reply subject.
    ///
    /// Requests published without a reply subject are dropped with a warning.
    pub async fn reply<T: Serialize>(&self, reply_to: Option<Subject>, body: &T) -> Result<()> {
        let Some(reply_to) = reply_to else {
            warn!("Request has no reply subject, dropping response");
            return Ok(());
        };

        let payload = serde_json::to_vec(body).context("Failed to serialize reply")?;
        let size = payload.len();
        self.client
            .publish(reply_to.clone(), payload.into())
            .await
            .with_context(|| format!("Failed to publish reply to {reply_to}"))?;

        debug!(subject = %reply_to, bytes = size, "Published reply");
        Ok(())
    }
}
