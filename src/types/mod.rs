//! Type definitions for claim scoring

pub mod claim;
pub mod prediction;

pub use claim::ClaimRecord;
pub use prediction::{
    DecisionTier, ErrorResponse, PredictionResult, RiskFactor, RiskLevel, ScoreResponse,
    ScoredClaim,
};
