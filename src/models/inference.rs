//! Claim scoring against a trained artifact

use crate::error::InferenceError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::artifact::ModelArtifact;
use crate::rules::RuleEngine;
use crate::schema::CategoricalColumn;
use crate::types::claim::ClaimRecord;
use crate::types::prediction::PredictionResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Scores claims with the classifier and explains them with the rule engine.
///
/// The artifact is shared read-only, so one engine serves any number of
/// concurrent requests without locking.
pub struct InferenceEngine {
    artifact: Arc<ModelArtifact>,
    extractor: FeatureExtractor,
    rules: RuleEngine,
}

impl InferenceEngine {
    /// Build an engine, rejecting artifacts whose schema does not match
    pub fn new(artifact: Arc<ModelArtifact>) -> Result<Self, InferenceError> {
        let extractor = FeatureExtractor::new();
        extractor.check_schema(&artifact.features)?;

        if let Some(column) = CategoricalColumn::ALL
            .iter()
            .find(|c| !artifact.encoders.contains(c.column_name()))
        {
            return Err(InferenceError::MissingEncoder(column.column_name().to_string()));
        }

        if artifact.classifier.n_features() != extractor.feature_count() {
            return Err(InferenceError::SchemaLength {
                expected: extractor.feature_count(),
                found: artifact.classifier.n_features(),
            });
        }

        let rules = RuleEngine::new();
        info!(
            features = extractor.feature_count(),
            trees = artifact.classifier.n_trees(),
            rules = rules.rule_count(),
            "Inference engine initialized"
        );

        Ok(Self {
            artifact,
            extractor,
            rules,
        })
    }

    /// Score a single claim
    pub fn predict(&self, claim: &ClaimRecord) -> Result<PredictionResult, InferenceError> {
        let started = Instant::now();

        let vector = self.extractor.extract(claim, &self.artifact.encoders);
        if !vector.fallbacks.is_empty() {
            debug!(
                columns = ?vector.fallbacks.iter().map(|c| c.column_name()).collect::<Vec<_>>(),
                "Unseen category values encoded with fallback code"
            );
        }

        let probability = self.artifact.classifier.predict_proba(&vector.values)?;
        let risk_factors = self.rules.evaluate(claim);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        let result = PredictionResult::new(probability, risk_factors, elapsed_ms);
        debug!(
            score = result.fraud_score,
            decision = ?result.decision,
            factors = result.risk_factors.len(),
            "Claim scored"
        );
        Ok(result)
    }

    /// Score a batch of claims independently
    pub fn predict_batch(&self, claims: &[ClaimRecord]) -> Vec<Result<PredictionResult, InferenceError>> {
        claims.iter().map(|claim| self.predict(claim)).collect()
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn feature_count(&self) -> usize {
        self.extractor.feature_count()
    }
}
