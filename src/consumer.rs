//! NATS subscriptions for incoming claim requests

use crate::config::NatsConfig;
use anyhow::Result;
use async_nats::{Client, Message};
use futures::stream::{self, BoxStream, StreamExt};
use tracing::info;

/// Request kinds served over NATS
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Predict,
    Metadata,
    Stats,
}

impl Endpoint {
    pub const ALL: [Endpoint; 3] = [Endpoint::Predict, Endpoint::Metadata, Endpoint::Stats];

    /// Configured subject for this endpoint
    pub fn subject(self, config: &NatsConfig) -> &str {
        match self {
            Endpoint::Predict => &config.predict_subject,
            Endpoint::Metadata => &config.metadata_subject,
            Endpoint::Stats => &config.stats_subject,
        }
    }
}

/// Consumer for claim scoring, metadata and stats requests
pub struct ClaimRequestConsumer {
    client: Client,
    config: NatsConfig,
}

impl ClaimRequestConsumer {
    /// Create a new request consumer
    pub fn new(client: Client, config: &NatsConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    /// Subscribe to every endpoint and merge the requests into one stream
    pub async fn subscribe(&self) -> Result<BoxStream<'static, (Endpoint, Message)>> {
        let mut streams = Vec::with_capacity(Endpoint::ALL.len());
        for endpoint in Endpoint::ALL {
            let subject = endpoint.subject(&self.config).to_string();
            let subscriber = self.client.subscribe(subject.clone()).await?;
            info!(subject = %subject, endpoint = ?endpoint, "Subscribed to request subject");
            streams.push(subscriber.map(move |message| (endpoint, message)).boxed());
        }
        Ok(stream::select_all(streams).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_endpoint_subjects() {
        let config = AppConfig::default().nats;
        assert_eq!(Endpoint::Predict.subject(&config), "claims.predict");
        assert_eq!(Endpoint::Metadata.subject(&config), "claims.metadata");
        assert_eq!(Endpoint::Stats.subject(&config), "claims.stats");
    }
}
