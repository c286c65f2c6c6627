//! Claims dataset loaded from CSV

use crate::error::TrainingError;
use crate::feature_extractor::{vehicle_age, yes_flag, ClaimFeatures};
use crate::schema::{
    required_columns, CategoricalColumn, AUTO_YEAR_COLUMN, FRAUD_LABEL, LABEL_COLUMN,
    MISSING_CATEGORY, MONTHS_AS_CUSTOMER_COLUMN, NUMERIC_FEATURE_COUNT, PASSTHROUGH_COLUMNS,
    POLICE_REPORT_COLUMN, PROPERTY_DAMAGE_COLUMN,
};
use csv::StringRecord;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Raw training rows with resolved column positions
#[derive(Debug, Clone)]
pub struct ClaimDataset {
    columns: HashMap<&'static str, usize>,
    rows: Vec<StringRecord>,
}

impl ClaimDataset {
    /// Load a CSV file with a header row
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Self, TrainingError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(TrainingError::DatasetNotFound(path.to_path_buf()));
        }
        info!(path = %path.display(), "Loading dataset");
        let reader = csv::ReaderBuilder::new().flexible(false).from_path(path)?;
        Self::from_csv_reader(reader)
    }

    /// Load CSV data from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TrainingError> {
        Self::from_csv_reader(csv::ReaderBuilder::new().from_reader(reader))
    }

    fn from_csv_reader<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, TrainingError> {
        let headers = reader.headers()?.clone();
        let positions: HashMap<&str, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim(), i))
            .collect();

        let mut columns = HashMap::new();
        for column in required_columns() {
            match positions.get(column) {
                Some(&index) => {
                    columns.insert(column, index);
                }
                None => return Err(TrainingError::MissingColumn(column.to_string())),
            }
        }

        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;
        if rows.is_empty() {
            return Err(TrainingError::EmptyDataset);
        }

        debug!(rows = rows.len(), columns = headers.len(), "Dataset parsed");
        Ok(Self { columns, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = DatasetRow<'_>> {
        self.rows.iter().map(move |record| DatasetRow {
            columns: &self.columns,
            record,
        })
    }

    /// 0/1 fraud target for every row
    pub fn labels(&self) -> Vec<u8> {
        self.rows().map(|row| u8::from(row.is_fraud())).collect()
    }

    /// Sorted distinct non-missing values of a column
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        self.rows()
            .filter_map(|row| row.text(column))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Categorical column values with missing cells filled, for encoder fitting
    pub fn category_values(&self, column: CategoricalColumn) -> impl Iterator<Item = &str> {
        self.rows()
            .map(move |row| row.text(column.column_name()).unwrap_or(MISSING_CATEGORY))
    }
}

/// Borrowed view of one dataset row
#[derive(Debug, Clone, Copy)]
pub struct DatasetRow<'a> {
    columns: &'a HashMap<&'static str, usize>,
    record: &'a StringRecord,
}

impl<'a> DatasetRow<'a> {
    /// Trimmed cell text, `None` when empty or the column is unknown
    pub fn text(&self, column: &str) -> Option<&'a str> {
        let index = *self.columns.get(column)?;
        self.record
            .get(index)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Numeric cell, `None` when missing or unparseable
    pub fn number(&self, column: &str) -> Option<f64> {
        self.text(column)?
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }

    pub fn is_fraud(&self) -> bool {
        self.text(LABEL_COLUMN) == Some(FRAUD_LABEL)
    }

    /// Engineered, pre-encoding features for this row
    pub fn claim_features(&self) -> ClaimFeatures<'a> {
        let mut numeric = [0.0; NUMERIC_FEATURE_COUNT];

        numeric[0] = self.number(MONTHS_AS_CUSTOMER_COLUMN).unwrap_or(0.0).trunc();
        // passthrough columns fill slots 1..=10 and 13..=16
        for (offset, column) in PASSTHROUGH_COLUMNS.iter().enumerate() {
            let slot = if offset < 10 { offset + 1 } else { offset + 3 };
            numeric[slot] = self.number(column).unwrap_or(0.0);
        }
        numeric[11] = yes_flag(self.text(POLICE_REPORT_COLUMN).unwrap_or("NO"));
        numeric[12] = yes_flag(self.text(PROPERTY_DAMAGE_COLUMN).unwrap_or("NO"));
        numeric[17] = vehicle_age(self.number(AUTO_YEAR_COLUMN));

        ClaimFeatures {
            numeric,
            categories: CategoricalColumn::ALL.map(|column| {
                self.text(column.column_name()).unwrap_or(MISSING_CATEGORY)
            }),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::schema::required_columns;

    /// CSV with every required column; `rows` supplies values for the
    /// listed overrides and defaults everything else.
    pub fn csv_with(rows: &[&[(&str, &str)]]) -> String {
        let columns = required_columns();
        let mut out = columns.join(",");
        out.push('\n');
        for row in rows {
            let cells: Vec<String> = columns
                .iter()
                .map(|column| {
                    row.iter()
                        .find(|(name, _)| name == column)
                        .map(|(_, value)| value.to_string())
                        .unwrap_or_else(|| default_cell(column).to_string())
                })
                .collect();
            out.push_str(&cells.join(","));
            out.push('\n');
        }
        out
    }

    fn default_cell(column: &str) -> &'static str {
        match column {
            "fraud_reported" => "N",
            "police_report_available" | "property_damage" => "NO",
            "incident_type" => "Single Vehicle Collision",
            "incident_severity" => "Minor Damage",
            "collision_type" => "Front Collision",
            "insured_sex" => "FEMALE",
            "insured_education_level" => "MD",
            "insured_occupation" => "sales",
            "insured_hobbies" => "chess",
            "insured_relationship" => "wife",
            "incident_state" => "NY",
            "incident_city" => "Arlington",
            "auto_make" => "Saab",
            "auto_year" => "2010",
            _ => "1",
        }
    }
}
