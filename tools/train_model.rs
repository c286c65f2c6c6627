//! Model Trainer
//!
//! Trains the claim fraud classifier from a CSV dataset and writes the
//! JSON artifact the scoring service loads.
//!
//! Usage: train-model [dataset.csv] [artifact.json]
//! Paths default to the ones in config/config.toml, or built-in defaults
//! when that file does not exist.

use anyhow::{Context, Result};
use claim_fraud_scoring::{
    config::AppConfig, models::gbdt::BoostingParams, training::train_from_csv,
};
use std::path::PathBuf;
use tracing::info;

fn main() -> Result<()> {
    let config = AppConfig::load_or_default("config/config.toml")?;
    config.logging.init()?;

    let args: Vec<String> = std::env::args().collect();
    let dataset = PathBuf::from(args.get(1).unwrap_or(&config.model.dataset_path));
    let artifact = PathBuf::from(args.get(2).unwrap_or(&config.model.artifact_path));

    let params = BoostingParams::default();
    info!(
        dataset = %dataset.display(),
        artifact = %artifact.display(),
        n_estimators = params.n_estimators,
        max_depth = params.max_depth,
        "Starting training run"
    );

    let model = train_from_csv(&dataset, &artifact, params)
        .with_context(|| format!("Training from {} failed", dataset.display()))?;

    info!(
        accuracy = model.accuracy,
        auc = model.auc,
        train_rows = model.train_rows,
        test_rows = model.test_rows,
        "Model trained. Accuracy: {}% AUC: {}",
        model.accuracy,
        model.auc
    );
    Ok(())
}
