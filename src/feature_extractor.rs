//! Feature extraction for claim fraud model training and inference.
//!
//! Training rows and incoming claims are both reduced to [`ClaimFeatures`]
//! and assembled by the same code, so the two sides cannot drift apart.
//! Features are emitted in [`FEATURE_NAMES`] order.

use crate::error::InferenceError;
use crate::models::encoder::{EncodeOutcome, EncoderRegistry};
use crate::schema::{
    CategoricalColumn, CATEGORICAL_COUNT, FEATURE_COUNT, FEATURE_NAMES, NUMERIC_FEATURE_COUNT,
};
use crate::types::claim::{ClaimRecord, YES};

/// Year the vehicle age is measured against
pub const REFERENCE_YEAR: f64 = 2016.0;

/// Manufacture year assumed when the dataset has none
pub const DEFAULT_MANUFACTURE_YEAR: f64 = 2005.0;

/// Upper bound on vehicle age in years
pub const MAX_VEHICLE_AGE: f64 = 30.0;

/// Pre-encoding view of one claim
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimFeatures<'a> {
    /// First [`NUMERIC_FEATURE_COUNT`] features, already coerced
    pub numeric: [f64; NUMERIC_FEATURE_COUNT],
    /// Raw categorical values in [`CategoricalColumn::ALL`] order
    pub categories: [&'a str; CATEGORICAL_COUNT],
}

/// Assembled feature vector plus the columns that needed the fallback code
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    pub values: Vec<f64>,
    pub fallbacks: Vec<CategoricalColumn>,
}

/// Vehicle age from a manufacture year, clamped to [0, 30]
pub fn vehicle_age(manufacture_year: Option<f64>) -> f64 {
    let year = manufacture_year.unwrap_or(DEFAULT_MANUFACTURE_YEAR);
    (REFERENCE_YEAR - year).clamp(0.0, MAX_VEHICLE_AGE).trunc()
}

/// 1.0 only for the exact string "YES"
pub fn yes_flag(value: &str) -> f64 {
    if value == YES {
        1.0
    } else {
        0.0
    }
}

/// Feature extractor that turns claims into model input vectors.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Confirm an artifact's stored feature order matches this extractor
    pub fn check_schema<S: AsRef<str>>(&self, feature_names: &[S]) -> Result<(), InferenceError> {
        if feature_names.len() != FEATURE_COUNT {
            return Err(InferenceError::SchemaLength {
                expected: FEATURE_COUNT,
                found: feature_names.len(),
            });
        }
        for (position, (found, expected)) in feature_names.iter().zip(FEATURE_NAMES).enumerate() {
            if found.as_ref() != expected {
                return Err(InferenceError::SchemaOrder {
                    position,
                    expected: expected.to_string(),
                    found: found.as_ref().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Reduce an incoming claim to its pre-encoding features
    pub fn claim_features<'a>(&self, claim: &'a ClaimRecord) -> ClaimFeatures<'a> {
        ClaimFeatures {
            numeric: [
                claim.policy_age_months as f64,
                claim.age as f64,
                claim.policy_deductable,
                claim.policy_annual_premium,
                claim.umbrella_limit,
                claim.capital_gains,
                claim.capital_loss,
                claim.incident_hour as f64,
                claim.number_of_vehicles_involved as f64,
                claim.bodily_injuries as f64,
                claim.witnesses as f64,
                yes_flag(&claim.police_report),
                yes_flag(&claim.property_damage),
                claim.total_claim_amount,
                claim.injury_claim,
                claim.property_claim,
                claim.vehicle_claim,
                claim.vehicle_age as f64,
            ],
            categories: CategoricalColumn::ALL.map(|column| claim.category(column)),
        }
    }

    /// Encode categoricals and lay out the full vector
    pub fn assemble(&self, features: &ClaimFeatures<'_>, encoders: &EncoderRegistry) -> FeatureVector {
        let mut values = Vec::with_capacity(FEATURE_COUNT);
        let mut fallbacks = Vec::new();

        values.extend_from_slice(&features.numeric);

        for (column, value) in CategoricalColumn::ALL.iter().zip(features.categories) {
            let outcome = encoders.encode(column.column_name(), value);
            if let EncodeOutcome::Fallback(_) = outcome {
                fallbacks.push(*column);
            }
            values.push(outcome.code() as f64);
        }

        FeatureVector { values, fallbacks }
    }

    /// Extract the model input vector for a claim.
    pub fn extract(&self, claim: &ClaimRecord, encoders: &EncoderRegistry) -> FeatureVector {
        self.assemble(&self.claim_features(claim), encoders)
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names in model input order.
    pub fn feature_names(&self) -> Vec<&'static str> {
        FEATURE_NAMES.to_vec()
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
