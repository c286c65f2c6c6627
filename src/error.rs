//! Error types for training, persistence and inference

use std::path::PathBuf;

/// Errors raised by the gradient boosted classifier
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LabelCount { rows: usize, labels: usize },

    #[error("Training labels contain a single class ({positives} positives out of {total})")]
    SingleClass { positives: usize, total: usize },

    #[error("Row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Feature vector has {found} values, model expects {expected}")]
    FeatureCount { expected: usize, found: usize },

    #[error("Invalid boosting parameters: {0}")]
    InvalidParams(String),
}

/// Errors loading or saving a model artifact
#[derive(thiserror::Error, Debug)]
pub enum ArtifactError {
    #[error("Model artifact not found at {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model artifact {}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Fatal training failures. Nothing is persisted when one of these occurs.
#[derive(thiserror::Error, Debug)]
pub enum TrainingError {
    #[error("Dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("Failed to read dataset: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("Dataset contains no rows")]
    EmptyDataset,

    #[error("Label column '{column}' has a single class ({positives} fraud rows out of {total})")]
    SingleClass {
        column: String,
        positives: usize,
        total: usize,
    },

    #[error("Model fitting failed: {0}")]
    Model(#[from] ModelError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Errors during a single inference call
#[derive(thiserror::Error, Debug)]
pub enum InferenceError {
    #[error("Invalid claim payload: {0}")]
    InvalidClaim(String),

    #[error("Artifact schema has {found} features, expected {expected}")]
    SchemaLength { expected: usize, found: usize },

    #[error("Artifact feature {position} is '{found}', expected '{expected}'")]
    SchemaOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("Artifact has no encoder for column '{0}'")]
    MissingEncoder(String),

    #[error("Prediction failed: {0}")]
    Model(#[from] ModelError),
}
