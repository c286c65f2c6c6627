//! Rule-based risk factor explanations
//!
//! Rules read the raw claim, never the encoded feature vector or the model
//! score. Every rule runs on every claim and the output keeps rule order.

use crate::schema::CategoricalColumn;
use crate::types::claim::{ClaimRecord, YES};
use crate::types::prediction::{RiskFactor, RiskLevel};

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Policies younger than this many months are "very new"
pub const VERY_NEW_POLICY_MONTHS: i64 = 3;

/// Policies younger than this many months are "new"
pub const NEW_POLICY_MONTHS: i64 = 6;

/// Claims above this amount are flagged
pub const HIGH_CLAIM_AMOUNT: f64 = 50_000.0;

/// Claims above this amount carry a HIGH weight instead of MEDIUM
pub const VERY_HIGH_CLAIM_AMOUNT: f64 = 150_000.0;

/// Prior claims at or above this count mark a repeat claimant
pub const REPEAT_CLAIMANT_COUNT: i64 = 3;

/// Late night window: hour >= start or hour < end
pub const LATE_NIGHT_START_HOUR: i64 = 22;
pub const LATE_NIGHT_END_HOUR: i64 = 6;

pub const TRIVIAL_DAMAGE: &str = "Trivial Damage";
pub const VEHICLE_THEFT: &str = "Vehicle Theft";

/// A single explanation rule
pub type Rule = fn(&ClaimRecord) -> Option<RiskFactor>;

/// Fixed, ordered rule set
pub struct RuleEngine {
    rules: Vec<(&'static str, Rule)>,
}

impl RuleEngine {
    /// Create the standard rule set
    pub fn new() -> Self {
        Self {
            rules: vec![
                ("policy_age", policy_age as Rule),
                ("injury_damage_mismatch", injury_damage_mismatch as Rule),
                ("no_witnesses", no_witnesses as Rule),
                ("high_claim_amount", high_claim_amount as Rule),
                ("repeat_claimant", repeat_claimant as Rule),
                ("no_police_report", no_police_report as Rule),
                ("unwitnessed_theft", unwitnessed_theft as Rule),
                ("late_night_incident", late_night_incident as Rule),
            ],
        }
    }

    /// Run every rule and collect the factors in rule order
    pub fn evaluate(&self, claim: &ClaimRecord) -> Vec<RiskFactor> {
        self.rules.iter().filter_map(|(_, rule)| rule(claim)).collect()
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|(name, _)| *name).collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn policy_age(claim: &ClaimRecord) -> Option<RiskFactor> {
    let months = claim.policy_age_months;
    if months < VERY_NEW_POLICY_MONTHS {
        Some(RiskFactor::new(
            "Very New Policy",
            format!("Policy only {months} months old"),
            RiskLevel::High,
        ))
    } else if months < NEW_POLICY_MONTHS {
        Some(RiskFactor::new(
            "New Policy (< 6 months)",
            "Policy under 6 months old",
            RiskLevel::High,
        ))
    } else {
        None
    }
}

fn injury_damage_mismatch(claim: &ClaimRecord) -> Option<RiskFactor> {
    let severity = claim.category_raw(CategoricalColumn::IncidentSeverity);
    (severity == Some(TRIVIAL_DAMAGE) && claim.bodily_injuries > 0).then(|| {
        RiskFactor::new(
            "Injury–Damage Mismatch",
            "Injuries reported for trivial damage",
            RiskLevel::High,
        )
    })
}

fn no_witnesses(claim: &ClaimRecord) -> Option<RiskFactor> {
    let vehicles = claim.number_of_vehicles_involved;
    (vehicles >= 2 && claim.witnesses == 0).then(|| {
        RiskFactor::new(
            "No Witnesses",
            format!("{vehicles} vehicles, zero witnesses"),
            RiskLevel::High,
        )
    })
}

fn high_claim_amount(claim: &ClaimRecord) -> Option<RiskFactor> {
    let amount = claim.total_claim_amount;
    (amount > HIGH_CLAIM_AMOUNT).then(|| {
        let weight = if amount > VERY_HIGH_CLAIM_AMOUNT {
            RiskLevel::High
        } else {
            RiskLevel::Medium
        };
        RiskFactor::new(
            "High Claim Amount",
            format!("Claim of {}", format_dollars(amount)),
            weight,
        )
    })
}

fn repeat_claimant(claim: &ClaimRecord) -> Option<RiskFactor> {
    let prior = claim.prior_claims;
    (prior >= REPEAT_CLAIMANT_COUNT).then(|| {
        RiskFactor::new(
            "Repeat Claimant",
            format!("{prior} prior claims on record"),
            RiskLevel::High,
        )
    })
}

fn no_police_report(claim: &ClaimRecord) -> Option<RiskFactor> {
    (claim.police_report != YES).then(|| {
        RiskFactor::new(
            "No Police Report",
            "Incident not reported to police",
            RiskLevel::Medium,
        )
    })
}

fn unwitnessed_theft(claim: &ClaimRecord) -> Option<RiskFactor> {
    // An absent incident type never matches here, unlike the model default
    let incident_type = claim.category_raw(CategoricalColumn::IncidentType);
    (incident_type == Some(VEHICLE_THEFT) && claim.witnesses == 0).then(|| {
        RiskFactor::new(
            "Unwitnessed Theft",
            "No witnesses to reported theft",
            RiskLevel::Medium,
        )
    })
}

fn late_night_incident(claim: &ClaimRecord) -> Option<RiskFactor> {
    let hour = claim.incident_hour;
    (hour >= LATE_NIGHT_START_HOUR || hour < LATE_NIGHT_END_HOUR).then(|| {
        RiskFactor::new(
            "Late Night Incident",
            format!("Reported at {hour:02}:00 hrs"),
            RiskLevel::Medium,
        )
    })
}

/// Whole-dollar amount with thousands separators, e.g. `$200,000`
fn format_dollars(amount: f64) -> String {
    let rounded = amount.round_ties_even();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("$-{grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn claim(value: Value) -> ClaimRecord {
        serde_json::from_value(value).unwrap()
    }

    fn labels(factors: &[RiskFactor]) -> Vec<&str> {
        factors.iter().map(|f| f.label.as_str()).collect()
    }

    #[test]
    fn test_default_claim_has_no_factors() {
        let engine = RuleEngine::new();
        assert!(engine.evaluate(&ClaimRecord::default()).is_empty());
        assert_eq!(engine.rule_count(), 8);
    }

    #[test]
    fn test_very_new_policy_then_mismatch() {
        let engine = RuleEngine::new();
        let factors = engine.evaluate(&claim(json!({
            "policy_age_months": 2,
            "incident_severity": "Trivial Damage",
            "bodily_injuries": 1,
        })));

        assert_eq!(labels(&factors), vec!["Very New Policy", "Injury–Damage Mismatch"]);
        assert!(factors.iter().all(|f| f.weight == RiskLevel::High));
        assert_eq!(factors[0].description, "Policy only 2 months old");
    }

    #[test]
    fn test_policy_age_bands() {
        let engine = RuleEngine::new();
        let at = |months: i64| engine.evaluate(&claim(json!({ "policy_age_months": months })));

        assert_eq!(labels(&at(0)), vec!["Very New Policy"]);
        assert_eq!(labels(&at(3)), vec!["New Policy (< 6 months)"]);
        assert_eq!(labels(&at(5)), vec!["New Policy (< 6 months)"]);
        assert!(at(6).is_empty());
    }

    #[test]
    fn test_claim_amount_weights() {
        let engine = RuleEngine::new();

        let high = engine.evaluate(&claim(json!({ "total_claim_amount": 200000 })));
        assert_eq!(labels(&high), vec!["High Claim Amount"]);
        assert_eq!(high[0].weight, RiskLevel::High);
        assert_eq!(high[0].description, "Claim of $200,000");

        let medium = engine.evaluate(&claim(json!({ "total_claim_amount": 60000 })));
        assert_eq!(medium[0].weight, RiskLevel::Medium);
        assert_eq!(medium[0].description, "Claim of $60,000");

        assert!(engine
            .evaluate(&claim(json!({ "total_claim_amount": 50000 })))
            .is_empty());
    }

    #[test]
    fn test_police_report_then_late_night() {
        let engine = RuleEngine::new();
        let factors = engine.evaluate(&claim(json!({ "police_report": "NO", "incident_hour": 23 })));

        assert_eq!(labels(&factors), vec!["No Police Report", "Late Night Incident"]);
        assert!(factors.iter().all(|f| f.weight == RiskLevel::Medium));
        assert_eq!(factors[1].description, "Reported at 23:00 hrs");
    }

    #[test]
    fn test_non_string_police_report_counts_as_missing() {
        let engine = RuleEngine::new();
        for value in [json!(null), json!(true), json!(false)] {
            let factors = engine.evaluate(&claim(json!({ "police_report": value })));
            assert_eq!(labels(&factors), vec!["No Police Report"]);
            assert_eq!(factors[0].weight, RiskLevel::Medium);
        }
    }

    #[test]
    fn test_null_severity_never_mismatches() {
        let engine = RuleEngine::new();
        let factors = engine.evaluate(&claim(json!({
            "incident_severity": null,
            "bodily_injuries": 1,
        })));
        assert!(factors.is_empty(), "unexpected factors: {:?}", labels(&factors));
    }

    #[test]
    fn test_late_night_window() {
        let engine = RuleEngine::new();
        let at = |hour: i64| engine.evaluate(&claim(json!({ "incident_hour": hour })));

        assert_eq!(at(5)[0].description, "Reported at 05:00 hrs");
        assert_eq!(labels(&at(22)), vec!["Late Night Incident"]);
        assert!(at(6).is_empty());
        assert!(at(21).is_empty());
    }

    #[test]
    fn test_witness_rules() {
        let engine = RuleEngine::new();

        let multi = engine.evaluate(&claim(json!({ "number_of_vehicles_involved": 3, "witnesses": 0 })));
        assert_eq!(labels(&multi), vec!["No Witnesses"]);
        assert_eq!(multi[0].description, "3 vehicles, zero witnesses");

        let theft = engine.evaluate(&claim(json!({ "incident_type": "Vehicle Theft", "witnesses": 0 })));
        assert_eq!(labels(&theft), vec!["Unwitnessed Theft"]);
        assert_eq!(theft[0].weight, RiskLevel::Medium);

        // the defaulted incident type is not a theft
        assert!(engine.evaluate(&claim(json!({ "witnesses": 0 }))).is_empty());
    }

    #[test]
    fn test_repeat_claimant() {
        let engine = RuleEngine::new();
        let factors = engine.evaluate(&claim(json!({ "prior_claims": 3 })));
        assert_eq!(labels(&factors), vec!["Repeat Claimant"]);
        assert_eq!(factors[0].description, "3 prior claims on record");
        assert!(engine.evaluate(&claim(json!({ "prior_claims": 2 }))).is_empty());
    }

    #[test]
    fn test_all_rules_fire_in_fixed_order() {
        let engine = RuleEngine::new();
        let input = json!({
            "policy_age_months": 1,
            "incident_severity": "Trivial Damage",
            "bodily_injuries": 2,
            "number_of_vehicles_involved": 2,
            "witnesses": 0,
            "total_claim_amount": 175000,
            "prior_claims": 4,
            "police_report": "?",
            "incident_type": "Vehicle Theft",
            "incident_hour": 2,
        });

        let first = engine.evaluate(&claim(input.clone()));
        assert_eq!(
            labels(&first),
            vec![
                "Very New Policy",
                "Injury–Damage Mismatch",
                "No Witnesses",
                "High Claim Amount",
                "Repeat Claimant",
                "No Police Report",
                "Unwitnessed Theft",
                "Late Night Incident",
            ]
        );
        assert_eq!(engine.evaluate(&claim(input)), first);
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0.0), "$0");
        assert_eq!(format_dollars(999.4), "$999");
        assert_eq!(format_dollars(1000.0), "$1,000");
        assert_eq!(format_dollars(1234567.6), "$1,234,568");
        assert_eq!(format_dollars(50000.5), "$50,000");
        assert_eq!(format_dollars(50001.5), "$50,002");
        assert_eq!(format_dollars(-52000.0), "$-52,000");
    }
}
