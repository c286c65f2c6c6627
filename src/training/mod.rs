//! Offline training pipeline

pub mod dataset;
pub mod evaluation;
pub mod pipeline;
pub mod split;

pub use dataset::ClaimDataset;
pub use pipeline::{train_from_csv, TrainingPipeline};
