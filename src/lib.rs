//! Claim Fraud Scoring Library
//!
//! Trains a gradient boosted classifier on historical insurance claims and
//! scores incoming claims with a fraud probability, a decision tier and
//! rule-based explanations.

pub mod config;
pub mod consumer;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod producer;
pub mod rules;
pub mod schema;
pub mod service;
pub mod training;
pub mod types;

pub use config::AppConfig;
pub use consumer::ClaimRequestConsumer;
pub use error::{ArtifactError, InferenceError, ModelError, TrainingError};
pub use feature_extractor::FeatureExtractor;
pub use metrics::ClaimStatsStore;
pub use models::artifact::ModelArtifact;
pub use models::inference::InferenceEngine;
pub use producer::ReplyPublisher;
pub use service::ClaimScoringService;
pub use training::TrainingPipeline;
pub use types::{ClaimRecord, PredictionResult, ScoreResponse, ScoredClaim};
