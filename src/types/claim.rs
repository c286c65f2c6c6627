//! Insurance claim record as received from callers
//!
//! Requests are loosely typed JSON objects. Every field is optional and has a
//! fixed default that also applies when the supplied value cannot be coerced,
//! so a claim record can always be built from any JSON object.

use crate::schema::CategoricalColumn;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Canonical value for yes/no fields
pub const YES: &str = "YES";

/// A claim with every field resolved to its coerced value or default
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub struct ClaimRecord {
    /// Months since the policy was bound
    pub policy_age_months: i64,
    /// Insured's age in years
    pub age: i64,
    pub policy_deductable: f64,
    pub policy_annual_premium: f64,
    pub umbrella_limit: f64,
    pub capital_gains: f64,
    pub capital_loss: f64,
    /// Hour of day the incident occurred (0-23)
    pub incident_hour: i64,
    pub number_of_vehicles_involved: i64,
    pub bodily_injuries: i64,
    pub witnesses: i64,
    /// Raw police report flag, compared against "YES"
    pub police_report: String,
    /// Raw property damage flag, compared against "YES"
    pub property_damage: String,
    pub total_claim_amount: f64,
    pub injury_claim: f64,
    pub property_claim: f64,
    pub vehicle_claim: f64,
    /// Vehicle age in years
    pub vehicle_age: i64,
    /// Prior claims on record. Only the rule engine reads this.
    pub prior_claims: i64,
    /// Categorical values as supplied, `None` when absent or not a string/number
    pub incident_type: Option<String>,
    pub incident_severity: Option<String>,
    pub collision_type: Option<String>,
    pub insured_sex: Option<String>,
    pub insured_education_level: Option<String>,
    pub insured_occupation: Option<String>,
    pub insured_hobbies: Option<String>,
    pub insured_relationship: Option<String>,
    pub incident_state: Option<String>,
    pub incident_city: Option<String>,
    pub auto_make: Option<String>,
}

impl ClaimRecord {
    /// Build a claim from a JSON object, applying per-field defaults
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            policy_age_months: int_field(map, "policy_age_months", 24),
            age: int_field(map, "age", 35),
            policy_deductable: float_field(map, "policy_deductable", 500.0),
            policy_annual_premium: float_field(map, "policy_annual_premium", 1200.0),
            umbrella_limit: float_field(map, "umbrella_limit", 0.0),
            capital_gains: float_field(map, "capital_gains", 0.0),
            capital_loss: float_field(map, "capital_loss", 0.0),
            incident_hour: int_field(map, "incident_hour", 12),
            number_of_vehicles_involved: int_field(map, "number_of_vehicles_involved", 1),
            bodily_injuries: int_field(map, "bodily_injuries", 0),
            witnesses: int_field(map, "witnesses", 1),
            police_report: flag_field(map, "police_report", YES),
            property_damage: flag_field(map, "property_damage", "NO"),
            total_claim_amount: float_field(map, "total_claim_amount", 10_000.0),
            injury_claim: float_field(map, "injury_claim", 0.0),
            property_claim: float_field(map, "property_claim", 0.0),
            vehicle_claim: float_field(map, "vehicle_claim", 0.0),
            vehicle_age: int_field(map, "vehicle_age", 5),
            prior_claims: int_field(map, "prior_claims", 0),
            incident_type: text_field(map, "incident_type"),
            incident_severity: text_field(map, "incident_severity"),
            collision_type: text_field(map, "collision_type"),
            insured_sex: text_field(map, "insured_sex"),
            insured_education_level: text_field(map, "insured_education_level"),
            insured_occupation: text_field(map, "insured_occupation"),
            insured_hobbies: text_field(map, "insured_hobbies"),
            insured_relationship: text_field(map, "insured_relationship"),
            incident_state: text_field(map, "incident_state"),
            incident_city: text_field(map, "incident_city"),
            auto_make: text_field(map, "auto_make"),
        }
    }

    /// Raw categorical value as supplied, if any
    pub fn category_raw(&self, column: CategoricalColumn) -> Option<&str> {
        let value = match column {
            CategoricalColumn::IncidentType => &self.incident_type,
            CategoricalColumn::IncidentSeverity => &self.incident_severity,
            CategoricalColumn::CollisionType => &self.collision_type,
            CategoricalColumn::InsuredSex => &self.insured_sex,
            CategoricalColumn::InsuredEducationLevel => &self.insured_education_level,
            CategoricalColumn::InsuredOccupation => &self.insured_occupation,
            CategoricalColumn::InsuredHobbies => &self.insured_hobbies,
            CategoricalColumn::InsuredRelationship => &self.insured_relationship,
            CategoricalColumn::IncidentState => &self.incident_state,
            CategoricalColumn::IncidentCity => &self.incident_city,
            CategoricalColumn::AutoMake => &self.auto_make,
        };
        value.as_deref()
    }

    /// Categorical value with the request default applied
    pub fn category(&self, column: CategoricalColumn) -> &str {
        self.category_raw(column)
            .unwrap_or_else(|| column.request_default())
    }

    /// City used for reporting; falls back to "Unknown" rather than the model default
    pub fn reporting_city(&self) -> &str {
        self.incident_city.as_deref().unwrap_or("Unknown")
    }

    pub fn has_police_report(&self) -> bool {
        self.police_report == YES
    }

    pub fn has_property_damage(&self) -> bool {
        self.property_damage == YES
    }
}

impl Default for ClaimRecord {
    fn default() -> Self {
        Self::from_map(&Map::new())
    }
}

impl TryFrom<Value> for ClaimRecord {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self::from_map(&map)),
            other => Err(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            )),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Integer coercion: numbers truncate toward zero, strings must hold an integer
fn int_field(map: &Map<String, Value>, key: &str, default: i64) -> i64 {
    match map.get(key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(default),
        _ => default,
    }
}

/// Float coercion: finite numbers or numeric strings
fn float_field(map: &Map<String, Value>, key: &str, default: f64) -> f64 {
    let parsed = match map.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|f| f.is_finite()).unwrap_or(default)
}

/// YES/NO flag: the default applies only when the key is absent.
/// Any other non-string value keeps its JSON rendering and never equals "YES".
fn flag_field(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        None => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Text coercion: strings verbatim, numbers stringified
fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claim(value: Value) -> ClaimRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let c = claim(json!({}));
        assert_eq!(c.policy_age_months, 24);
        assert_eq!(c.age, 35);
        assert_eq!(c.policy_deductable, 500.0);
        assert_eq!(c.policy_annual_premium, 1200.0);
        assert_eq!(c.incident_hour, 12);
        assert_eq!(c.number_of_vehicles_involved, 1);
        assert_eq!(c.witnesses, 1);
        assert_eq!(c.total_claim_amount, 10_000.0);
        assert_eq!(c.vehicle_age, 5);
        assert_eq!(c.prior_claims, 0);
        assert!(c.has_police_report());
        assert!(!c.has_property_damage());
        assert_eq!(c.category(CategoricalColumn::IncidentCity), "Columbus");
        assert_eq!(c.reporting_city(), "Unknown");
        assert_eq!(c, ClaimRecord::default());
    }

    #[test]
    fn test_numeric_coercion() {
        let c = claim(json!({
            "policy_age_months": "7",
            "age": 41.9,
            "witnesses": "two",
            "bodily_injuries": null,
            "total_claim_amount": "62000.5",
            "umbrella_limit": true,
            "incident_hour": "3.5",
        }));
        assert_eq!(c.policy_age_months, 7);
        assert_eq!(c.age, 41);
        assert_eq!(c.witnesses, 1);
        assert_eq!(c.bodily_injuries, 0);
        assert_eq!(c.total_claim_amount, 62_000.5);
        assert_eq!(c.umbrella_limit, 0.0);
        // integer fields do not accept fractional strings
        assert_eq!(c.incident_hour, 12);
    }

    #[test]
    fn test_yes_flags_require_exact_match() {
        for value in ["yes", "Yes", " YES", "YES ", "Y", "?"] {
            let c = claim(json!({ "police_report": value, "property_damage": value }));
            assert!(!c.has_police_report(), "{value:?} must not count as YES");
            assert!(!c.has_property_damage());
        }
        let c = claim(json!({ "police_report": "YES", "property_damage": "YES" }));
        assert!(c.has_police_report());
        assert!(c.has_property_damage());

        for value in [json!(true), json!(false), json!(null), json!(1), json!(["YES"])] {
            let c = claim(json!({ "police_report": value.clone(), "property_damage": value.clone() }));
            assert!(!c.has_police_report(), "{value} must not count as YES");
            assert!(!c.has_property_damage(), "{value} must not count as YES");
        }
    }

    #[test]
    fn test_absent_flags_take_defaults() {
        let c = claim(json!({ "property_damage": "YES" }));
        assert_eq!(c.police_report, "YES");
        assert!(c.has_police_report());
        assert!(c.has_property_damage());

        let c = claim(json!({ "police_report": null }));
        assert_eq!(c.police_report, "null");
        assert_eq!(c.property_damage, "NO");
    }

    #[test]
    fn test_categorical_values() {
        let c = claim(json!({ "incident_city": "Springfield", "auto_make": 42, "insured_sex": false }));
        assert_eq!(c.category(CategoricalColumn::IncidentCity), "Springfield");
        assert_eq!(c.reporting_city(), "Springfield");
        assert_eq!(c.category(CategoricalColumn::AutoMake), "42");
        assert_eq!(c.category_raw(CategoricalColumn::InsuredSex), None);
        assert_eq!(c.category(CategoricalColumn::InsuredSex), "MALE");
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(serde_json::from_value::<ClaimRecord>(json!([1, 2, 3])).is_err());
        assert!(serde_json::from_str::<ClaimRecord>("\"claim\"").is_err());
    }
}
