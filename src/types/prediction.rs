//! Scoring results returned to callers

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Highest score that is still auto-approved
pub const APPROVED_MAX_SCORE: u8 = 30;

/// Highest score routed to manual review; anything above is flagged
pub const REVIEW_MAX_SCORE: u8 = 70;

/// Severity of a risk factor, also used as the risk level of a decision tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Decision tier derived from the fraud score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DecisionTier {
    Approved,
    Review,
    Flagged,
}

impl DecisionTier {
    /// Map a 0-100 score to its tier. Boundary scores belong to the lower tier.
    pub fn from_score(score: u8) -> Self {
        if score <= APPROVED_MAX_SCORE {
            DecisionTier::Approved
        } else if score <= REVIEW_MAX_SCORE {
            DecisionTier::Review
        } else {
            DecisionTier::Flagged
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DecisionTier::Approved => "Auto Approved",
            DecisionTier::Review => "Manual Review",
            DecisionTier::Flagged => "Flagged as Fraud",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DecisionTier::Approved => "green",
            DecisionTier::Review => "yellow",
            DecisionTier::Flagged => "red",
        }
    }

    pub fn risk_level(self) -> RiskLevel {
        match self {
            DecisionTier::Approved => RiskLevel::Low,
            DecisionTier::Review => RiskLevel::Medium,
            DecisionTier::Flagged => RiskLevel::High,
        }
    }
}

/// Convert a probability to the integer 0-100 fraud score
pub fn score_from_probability(probability: f64) -> u8 {
    (probability.clamp(0.0, 1.0) * 100.0).round_ties_even() as u8
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Human-readable explanation produced by the rule engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub label: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub weight: RiskLevel,
}

impl RiskFactor {
    pub fn new(label: impl Into<String>, description: impl Into<String>, weight: RiskLevel) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            weight,
        }
    }
}

/// Outcome of scoring one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Fraud score (0-100)
    pub fraud_score: u8,
    /// Positive-class probability rounded to 4 decimals
    pub probability: f64,
    pub decision: DecisionTier,
    pub decision_label: String,
    pub decision_color: String,
    pub risk_level: RiskLevel,
    /// Rule explanations in rule order
    pub risk_factors: Vec<RiskFactor>,
    /// Processing time in milliseconds
    pub response_ms: f64,
}

impl PredictionResult {
    pub fn new(probability: f64, risk_factors: Vec<RiskFactor>, response_ms: f64) -> Self {
        let fraud_score = score_from_probability(probability);
        let decision = DecisionTier::from_score(fraud_score);

        Self {
            fraud_score,
            probability: round_to(probability, 4),
            decision,
            decision_label: decision.label().to_string(),
            decision_color: decision.color().to_string(),
            risk_level: decision.risk_level(),
            risk_factors,
            response_ms: round_to(response_ms, 1),
        }
    }
}

/// A prediction tagged with a claim id for the caller and the stats feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredClaim {
    pub claim_id: String,
    #[serde(flatten)]
    pub result: PredictionResult,
    pub city: String,
    pub scored_at: DateTime<Utc>,
}

impl ScoredClaim {
    pub fn new(result: PredictionResult, city: impl Into<String>) -> Self {
        Self {
            claim_id: generate_claim_id(),
            result,
            city: city.into(),
            scored_at: Utc::now(),
        }
    }
}

/// Random claim reference of the form `INS-NNNNN`
pub fn generate_claim_id() -> String {
    format!("INS-{}", rand::thread_rng().gen_range(10_000..=99_999))
}

/// Structured failure returned instead of a decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Reply to a scoring request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScoreResponse {
    Scored(ScoredClaim),
    Error(ErrorResponse),
}

impl ScoreResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ScoreResponse::Error(ErrorResponse {
            error: message.into(),
        })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ScoreResponse::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(DecisionTier::from_score(0), DecisionTier::Approved);
        assert_eq!(DecisionTier::from_score(30), DecisionTier::Approved);
        assert_eq!(DecisionTier::from_score(31), DecisionTier::Review);
        assert_eq!(DecisionTier::from_score(70), DecisionTier::Review);
        assert_eq!(DecisionTier::from_score(71), DecisionTier::Flagged);
        assert_eq!(DecisionTier::from_score(100), DecisionTier::Flagged);
    }

    #[test]
    fn test_tier_presentation() {
        assert_eq!(DecisionTier::Review.label(), "Manual Review");
        assert_eq!(DecisionTier::Flagged.color(), "red");
        assert_eq!(DecisionTier::Approved.risk_level(), RiskLevel::Low);
    }

    #[test]
    fn test_prediction_result_rounding() {
        let result = PredictionResult::new(0.70494, Vec::new(), 1.26);
        assert_eq!(result.fraud_score, 70);
        assert_eq!(result.probability, 0.7049);
        assert_eq!(result.decision, DecisionTier::Review);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert_eq!(result.response_ms, 1.3);

        let result = PredictionResult::new(0.706, Vec::new(), 0.0);
        assert_eq!(result.fraud_score, 71);
        assert_eq!(result.decision, DecisionTier::Flagged);
    }

    #[test]
    fn test_half_scores_round_to_even() {
        let result = PredictionResult::new(0.305, Vec::new(), 0.0);
        assert_eq!(result.fraud_score, 30);
        assert_eq!(result.decision, DecisionTier::Approved);

        let result = PredictionResult::new(0.705, Vec::new(), 0.0);
        assert_eq!(result.fraud_score, 70);
        assert_eq!(result.decision, DecisionTier::Review);

        assert_eq!(round_to(0.5, 0), 0.0);
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(0.25, 1), 0.2);
    }

    #[test]
    fn test_claim_id_format() {
        let id = generate_claim_id();
        assert!(id.starts_with("INS-"));
        let number: u32 = id[4..].parse().unwrap();
        assert!((10_000..=99_999).contains(&number));
    }

    #[test]
    fn test_scored_claim_serialization() {
        let result = PredictionResult::new(
            0.82,
            vec![RiskFactor::new("No Police Report", "Incident not reported to police", RiskLevel::Medium)],
            2.0,
        );
        let scored = ScoredClaim::new(result, "Columbus");

        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["decision"], "FLAGGED");
        assert_eq!(json["risk_level"], "HIGH");
        assert_eq!(json["fraud_score"], 82);
        assert_eq!(json["risk_factors"][0]["desc"], "Incident not reported to police");
        assert_eq!(json["risk_factors"][0]["weight"], "MEDIUM");

        let response: ScoreResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response, ScoreResponse::Scored(scored));
    }

    #[test]
    fn test_error_response_shape() {
        let response = ScoreResponse::error("boom");
        assert!(response.is_error());
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"error":"boom"}"#);
    }

    proptest! {
        #[test]
        fn prop_score_and_tier_follow_probability(probability in 0.0f64..=1.0) {
            let result = PredictionResult::new(probability, Vec::new(), 0.0);
            prop_assert!(result.fraud_score <= 100);
            let expected = match result.fraud_score {
                0..=30 => DecisionTier::Approved,
                31..=70 => DecisionTier::Review,
                _ => DecisionTier::Flagged,
            };
            prop_assert_eq!(result.decision, expected);
            prop_assert_eq!(result.risk_level, expected.risk_level());
        }
    }
}
