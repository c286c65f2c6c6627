//! Trained model artifact

use crate::models::encoder::EncoderRegistry;
use crate::models::gbdt::GradientBoostedClassifier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Frozen output of a training run.
///
/// The encoders, the feature order and the classifier only make sense
/// together; an artifact is never partially updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub classifier: GradientBoostedClassifier,
    pub encoders: EncoderRegistry,
    /// Feature names in model input order
    pub features: Vec<String>,
    /// Held-out accuracy in percent, one decimal
    pub accuracy: f64,
    /// Held-out ROC-AUC, four decimals
    pub auc: f64,
    pub vocabularies: Vocabularies,
    pub trained_at: DateTime<Utc>,
    pub train_rows: usize,
    pub test_rows: usize,
}

impl ModelArtifact {
    /// Vocabulary lists and evaluation metrics for UI population
    pub fn metadata(&self) -> ArtifactMetadata {
        ArtifactMetadata {
            vocabularies: self.vocabularies.clone(),
            accuracy: self.accuracy,
            auc: self.auc,
        }
    }
}

/// Sorted distinct values seen in training, per UI dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabularies {
    pub incident_types: Vec<String>,
    pub severities: Vec<String>,
    pub collision_types: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
    pub makes: Vec<String>,
    pub occupations: Vec<String>,
    pub hobbies: Vec<String>,
    pub relationships: Vec<String>,
}

/// Metadata entry point payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(flatten)]
    pub vocabularies: Vocabularies,
    pub accuracy: f64,
    pub auc: f64,
}
