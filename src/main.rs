//! Claim Fraud Scoring - Main Entry Point
//!
//! Loads (or trains) the model artifact, then answers scoring, metadata and
//! stats requests over NATS. Requests are handled in parallel up to the
//! configured worker count.

use anyhow::{Context, Result};
use claim_fraud_scoring::{
    config::AppConfig,
    consumer::{ClaimRequestConsumer, Endpoint},
    metrics::{ClaimStatsStore, MetricsReporter},
    models::{inference::InferenceEngine, loader::ModelLoader},
    producer::ReplyPublisher,
    service::ClaimScoringService,
};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::load_from_path(&path)
            .with_context(|| format!("Failed to load configuration from {path}"))?,
        None => AppConfig::load()?,
    };
    config.logging.init()?;

    info!("Starting Claim Fraud Scoring service");
    info!(
        artifact = %config.model.artifact_path,
        dataset = %config.model.dataset_path,
        train_if_missing = config.model.train_if_missing,
        "Configuration loaded"
    );

    // Training is CPU bound; keep it off the async workers
    let model_config = config.model.clone();
    let artifact = tokio::task::spawn_blocking(move || ModelLoader::load_or_train(&model_config))
        .await
        .context("Model loading task panicked")??;
    info!(
        accuracy = artifact.accuracy,
        auc = artifact.auc,
        trained_at = %artifact.trained_at,
        "Model ready"
    );

    let engine = Arc::new(InferenceEngine::new(Arc::new(artifact))?);
    let stats = Arc::new(ClaimStatsStore::new());
    let service = ClaimScoringService::new(engine, stats.clone());

    tokio::spawn(MetricsReporter::new(stats.clone(), config.pipeline.report_interval_secs).start());

    let client = async_nats::connect(&config.nats.url)
        .await
        .with_context(|| format!("Failed to connect to NATS at {}", config.nats.url))?;
    info!("Connected to NATS at {}", config.nats.url);

    let consumer = ClaimRequestConsumer::new(client.clone(), &config.nats);
    let publisher = ReplyPublisher::new(client);

    let num_workers = config.pipeline.workers.max(1);
    let semaphore = Arc::new(Semaphore::new(num_workers));
    info!(workers = num_workers, "Serving claim requests");

    let mut requests = consumer.subscribe().await?;
    loop {
        let (endpoint, message) = tokio::select! {
            next = requests.next() => match next {
                Some(request) => request,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        };

        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker semaphore closed")?;
        let service = service.clone();
        let publisher = publisher.clone();

        tokio::spawn(async move {
            let reply = match endpoint {
                Endpoint::Predict => serde_json::to_value(service.score_payload(&message.payload)),
                Endpoint::Metadata => serde_json::to_value(service.metadata()),
                Endpoint::Stats => serde_json::to_value(service.stats()),
            };

            match reply {
                Ok(body) => {
                    if let Err(e) = publisher.reply(message.reply, &body).await {
                        error!(endpoint = ?endpoint, error = %e, "Failed to send reply");
                    } else {
                        debug!(endpoint = ?endpoint, "Request handled");
                    }
                }
                Err(e) => error!(endpoint = ?endpoint, error = %e, "Failed to encode reply"),
            }

            drop(permit);
        });
    }

    info!("Claim scoring service shutting down...");
    stats.log_summary();

    Ok(())
}
