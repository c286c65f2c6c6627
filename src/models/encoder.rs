//! Label encoders for categorical claim attributes

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Code substituted for values outside an encoder's vocabulary
pub const FALLBACK_CODE: u32 = 0;

/// Result of encoding one categorical value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeOutcome {
    /// Value is in the vocabulary
    Known(u32),
    /// Value was unseen during training; the fallback code applies
    Fallback(u32),
}

impl EncodeOutcome {
    pub fn code(self) -> u32 {
        match self {
            EncodeOutcome::Known(code) | EncodeOutcome::Fallback(code) => code,
        }
    }

    pub fn is_fallback(self) -> bool {
        matches!(self, EncodeOutcome::Fallback(_))
    }
}

/// Maps a sorted vocabulary of strings to dense integer codes.
///
/// Codes are vocabulary positions in lexicographic order, so they are only
/// meaningful together with the artifact the encoder was trained into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Learn the vocabulary from observed values
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        Self {
            classes: classes.into_iter().collect(),
        }
    }

    /// Encode a value, falling back to [`FALLBACK_CODE`] when it is unknown
    pub fn encode(&self, value: &str) -> EncodeOutcome {
        match self.classes.binary_search_by(|c| c.as_str().cmp(value)) {
            Ok(index) => EncodeOutcome::Known(index as u32),
            Err(_) => EncodeOutcome::Fallback(FALLBACK_CODE),
        }
    }

    /// Vocabulary in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl TryFrom<Vec<String>> for LabelEncoder {
    type Error = String;

    fn try_from(classes: Vec<String>) -> Result<Self, Self::Error> {
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "encoder classes must be strictly ascending, found '{}' before '{}'",
                pair[0], pair[1]
            ));
        }
        Ok(Self { classes })
    }
}

impl From<LabelEncoder> for Vec<String> {
    fn from(encoder: LabelEncoder) -> Self {
        encoder.classes
    }
}

/// One label encoder per categorical column, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncoderRegistry {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl EncoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, encoder: LabelEncoder) {
        self.encoders.insert(column.into(), encoder);
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.encoders.contains_key(column)
    }

    /// Encode a value for a column. A column without an encoder also falls back.
    pub fn encode(&self, column: &str, value: &str) -> EncodeOutcome {
        match self.encoders.get(column) {
            Some(encoder) => encoder.encode(value),
            None => EncodeOutcome::Fallback(FALLBACK_CODE),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.encoders.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_sorts_and_dedups() {
        let encoder = LabelEncoder::fit(["Toyota", "BMW", "Audi", "BMW", "Toyota"]);
        assert_eq!(encoder.classes(), &["Audi", "BMW", "Toyota"]);
        assert_eq!(encoder.encode("Audi"), EncodeOutcome::Known(0));
        assert_eq!(encoder.encode("Toyota"), EncodeOutcome::Known(2));
    }

    #[test]
    fn test_fit_is_order_independent() {
        let a = LabelEncoder::fit(["c", "a", "b"]);
        let b = LabelEncoder::fit(["b", "c", "a", "a"]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_is_idempotent() {
        let encoder = LabelEncoder::fit(["Columbus", "Arlington", "Springfield"]);
        let first = encoder.encode("Springfield");
        for _ in 0..10 {
            assert_eq!(encoder.encode("Springfield"), first);
        }
    }

    #[test]
    fn test_unseen_value_falls_back() {
        let encoder = LabelEncoder::fit(["Major Damage", "Minor Damage"]);
        let outcome = encoder.encode("Atlantis");
        assert!(outcome.is_fallback());
        assert_eq!(outcome.code(), FALLBACK_CODE);
        assert!(encoder.encode("minor damage").is_fallback());
    }

    #[test]
    fn test_registry_missing_column_falls_back() {
        let mut registry = EncoderRegistry::new();
        registry.insert("auto_make", LabelEncoder::fit(["Audi", "BMW"]));

        assert_eq!(registry.encode("auto_make", "BMW"), EncodeOutcome::Known(1));
        assert_eq!(
            registry.encode("incident_city", "Columbus"),
            EncodeOutcome::Fallback(FALLBACK_CODE)
        );
    }

    #[test]
    fn test_serialization_rejects_unsorted_classes() {
        let encoder = LabelEncoder::fit(["b", "a"]);
        let json = serde_json::to_string(&encoder).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        assert_eq!(serde_json::from_str::<LabelEncoder>(&json).unwrap(), encoder);

        assert!(serde_json::from_str::<LabelEncoder>(r#"["b","a"]"#).is_err());
        assert!(serde_json::from_str::<LabelEncoder>(r#"["a","a"]"#).is_err());
    }
}
