//! Fixed feature schema shared by training and inference.
//!
//! The column order defined here is written into every trained artifact and
//! checked again when an inference engine is built from one.

/// Number of numeric and binary features ahead of the encoded categoricals
pub const NUMERIC_FEATURE_COUNT: usize = 18;

/// Number of label-encoded categorical columns
pub const CATEGORICAL_COUNT: usize = 11;

/// Total feature vector length
pub const FEATURE_COUNT: usize = NUMERIC_FEATURE_COUNT + CATEGORICAL_COUNT;

/// Feature names in model input order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    // Numeric, engineered and binary (18)
    "policy_age_months",
    "age",
    "policy_deductable",
    "policy_annual_premium",
    "umbrella_limit",
    "capital-gains",
    "capital-loss",
    "incident_hour_of_the_day",
    "number_of_vehicles_involved",
    "bodily_injuries",
    "witnesses",
    "police_report_bin",
    "property_damage_bin",
    "total_claim_amount",
    "injury_claim",
    "property_claim",
    "vehicle_claim",
    "vehicle_age",
    // Encoded categoricals (11)
    "incident_type_enc",
    "incident_severity_enc",
    "collision_type_enc",
    "insured_sex_enc",
    "insured_education_level_enc",
    "insured_occupation_enc",
    "insured_hobbies_enc",
    "insured_relationship_enc",
    "incident_state_enc",
    "incident_city_enc",
    "auto_make_enc",
];

/// Ground-truth label column and its positive value
pub const LABEL_COLUMN: &str = "fraud_reported";
pub const FRAUD_LABEL: &str = "Y";

/// Dataset columns copied straight into the feature vector
pub const PASSTHROUGH_COLUMNS: [&str; 14] = [
    "age",
    "policy_deductable",
    "policy_annual_premium",
    "umbrella_limit",
    "capital-gains",
    "capital-loss",
    "incident_hour_of_the_day",
    "number_of_vehicles_involved",
    "bodily_injuries",
    "witnesses",
    "total_claim_amount",
    "injury_claim",
    "property_claim",
    "vehicle_claim",
];

/// Dataset columns feeding the engineered features
pub const MONTHS_AS_CUSTOMER_COLUMN: &str = "months_as_customer";
pub const AUTO_YEAR_COLUMN: &str = "auto_year";
pub const POLICE_REPORT_COLUMN: &str = "police_report_available";
pub const PROPERTY_DAMAGE_COLUMN: &str = "property_damage";

/// Every column a training dataset must carry
pub fn required_columns() -> Vec<&'static str> {
    let mut columns = vec![LABEL_COLUMN, MONTHS_AS_CUSTOMER_COLUMN, AUTO_YEAR_COLUMN];
    columns.extend(PASSTHROUGH_COLUMNS);
    columns.push(POLICE_REPORT_COLUMN);
    columns.push(PROPERTY_DAMAGE_COLUMN);
    columns.extend(CategoricalColumn::ALL.iter().map(|c| c.column_name()));
    columns
}

/// Categorical claim attributes, in feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoricalColumn {
    IncidentType,
    IncidentSeverity,
    CollisionType,
    InsuredSex,
    InsuredEducationLevel,
    InsuredOccupation,
    InsuredHobbies,
    InsuredRelationship,
    IncidentState,
    IncidentCity,
    AutoMake,
}

impl CategoricalColumn {
    pub const ALL: [CategoricalColumn; CATEGORICAL_COUNT] = [
        CategoricalColumn::IncidentType,
        CategoricalColumn::IncidentSeverity,
        CategoricalColumn::CollisionType,
        CategoricalColumn::InsuredSex,
        CategoricalColumn::InsuredEducationLevel,
        CategoricalColumn::InsuredOccupation,
        CategoricalColumn::InsuredHobbies,
        CategoricalColumn::InsuredRelationship,
        CategoricalColumn::IncidentState,
        CategoricalColumn::IncidentCity,
        CategoricalColumn::AutoMake,
    ];

    /// Column name in the dataset, in claim requests and in the encoder registry
    pub fn column_name(self) -> &'static str {
        match self {
            CategoricalColumn::IncidentType => "incident_type",
            CategoricalColumn::IncidentSeverity => "incident_severity",
            CategoricalColumn::CollisionType => "collision_type",
            CategoricalColumn::InsuredSex => "insured_sex",
            CategoricalColumn::InsuredEducationLevel => "insured_education_level",
            CategoricalColumn::InsuredOccupation => "insured_occupation",
            CategoricalColumn::InsuredHobbies => "insured_hobbies",
            CategoricalColumn::InsuredRelationship => "insured_relationship",
            CategoricalColumn::IncidentState => "incident_state",
            CategoricalColumn::IncidentCity => "incident_city",
            CategoricalColumn::AutoMake => "auto_make",
        }
    }

    /// Value assumed when a claim request omits the field
    pub fn request_default(self) -> &'static str {
        match self {
            CategoricalColumn::IncidentType => "Single Vehicle Collision",
            CategoricalColumn::IncidentSeverity => "Minor Damage",
            CategoricalColumn::CollisionType => "Front Collision",
            CategoricalColumn::InsuredSex => "MALE",
            CategoricalColumn::InsuredEducationLevel => "College",
            CategoricalColumn::InsuredOccupation => "tech-support",
            CategoricalColumn::InsuredHobbies => "reading",
            CategoricalColumn::InsuredRelationship => "husband",
            CategoricalColumn::IncidentState => "OH",
            CategoricalColumn::IncidentCity => "Columbus",
            CategoricalColumn::AutoMake => "Toyota",
        }
    }

    /// Position of this column's code in the feature vector
    pub fn feature_index(self) -> usize {
        NUMERIC_FEATURE_COUNT + self as usize
    }
}

/// Value substituted for missing categoricals in training data
pub const MISSING_CATEGORY: &str = "Unknown";
