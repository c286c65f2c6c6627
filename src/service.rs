//! Request handling shared by every transport

use crate::error::InferenceError;
use crate::metrics::{ClaimStatsStore, StatsSnapshot};
use crate::models::artifact::ArtifactMetadata;
use crate::models::inference::InferenceEngine;
use crate::types::claim::ClaimRecord;
use crate::types::prediction::{ScoreResponse, ScoredClaim};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

/// Scores claims and keeps the aggregate statistics in step.
///
/// Failures never touch the stats store; they come back to the caller as
/// [`ScoreResponse::Error`].
#[derive(Clone)]
pub struct ClaimScoringService {
    engine: Arc<InferenceEngine>,
    stats: Arc<ClaimStatsStore>,
}

impl ClaimScoringService {
    pub fn new(engine: Arc<InferenceEngine>, stats: Arc<ClaimStatsStore>) -> Self {
        Self { engine, stats }
    }

    /// Score a raw JSON payload. An empty payload is an empty claim.
    pub fn score_payload(&self, payload: &[u8]) -> ScoreResponse {
        let parsed = if payload.iter().all(u8::is_ascii_whitespace) {
            Ok(ClaimRecord::default())
        } else {
            parse_claim(payload)
        };

        match parsed.and_then(|claim| self.score(&claim)) {
            Ok(scored) => ScoreResponse::Scored(scored),
            Err(e) => {
                error!(error = %e, "Claim scoring failed");
                ScoreResponse::error(e.to_string())
            }
        }
    }

    /// Score a decoded claim and record it
    pub fn score(&self, claim: &ClaimRecord) -> Result<ScoredClaim, InferenceError> {
        let result = self.engine.predict(claim)?;
        let scored = ScoredClaim::new(result, claim.reporting_city());
        self.stats.record(&scored, claim.total_claim_amount.trunc() as i64);

        info!(
            claim_id = %scored.claim_id,
            score = scored.result.fraud_score,
            decision = ?scored.result.decision,
            factors = scored.result.risk_factors.len(),
            response_ms = scored.result.response_ms,
            "Claim scored"
        );
        Ok(scored)
    }

    /// Vocabulary lists and held-out metrics from the artifact
    pub fn metadata(&self) -> ArtifactMetadata {
        self.engine.artifact().metadata()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn stats_store(&self) -> &Arc<ClaimStatsStore> {
        &self.stats
    }
}

fn parse_claim(payload: &[u8]) -> Result<ClaimRecord, InferenceError> {
    let value: Value = serde_json::from_slice(payload)
        .map_err(|e| InferenceError::InvalidClaim(format!("malformed JSON: {e}")))?;
    ClaimRecord::try_from(value).map_err(InferenceError::InvalidClaim)
}
