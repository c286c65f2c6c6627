//! End-to-end training: dataset → encoders → classifier → artifact

use crate::error::TrainingError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::artifact::{ModelArtifact, Vocabularies};
use crate::models::encoder::{EncoderRegistry, LabelEncoder};
use crate::models::gbdt::{BoostingParams, GradientBoostedClassifier};
use crate::models::loader::ModelLoader;
use crate::schema::{CategoricalColumn, FEATURE_NAMES, LABEL_COLUMN};
use crate::training::dataset::ClaimDataset;
use crate::training::evaluation::{accuracy, roc_auc, ClassificationReport};
use crate::training::split::{stratified_split, SPLIT_SEED, TEST_FRACTION};
use crate::types::prediction::round_to;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};

/// Trains a [`ModelArtifact`] from a claims dataset
pub struct TrainingPipeline {
    params: BoostingParams,
    test_fraction: f64,
    split_seed: u64,
}

impl TrainingPipeline {
    pub fn new() -> Self {
        Self::with_params(BoostingParams::default())
    }

    pub fn with_params(params: BoostingParams) -> Self {
        Self {
            params,
            test_fraction: TEST_FRACTION,
            split_seed: SPLIT_SEED,
        }
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    /// Fit encoders and the classifier, then evaluate on the held-out split
    pub fn run(&self, dataset: &ClaimDataset) -> Result<ModelArtifact, TrainingError> {
        let started = Instant::now();
        let labels = dataset.labels();
        let positives = labels.iter().filter(|&&l| l == 1).count();
        if positives == 0 || positives == labels.len() {
            return Err(TrainingError::SingleClass {
                column: LABEL_COLUMN.to_string(),
                positives,
                total: labels.len(),
            });
        }
        info!(
            rows = labels.len(),
            fraud = positives,
            fraud_pct = round_to(positives as f64 / labels.len() as f64 * 100.0, 1),
            "Training dataset loaded"
        );

        let mut encoders = EncoderRegistry::new();
        for column in CategoricalColumn::ALL {
            let encoder = LabelEncoder::fit(dataset.category_values(column));
            info!(column = column.column_name(), classes = encoder.len(), "Fitted label encoder");
            encoders.insert(column.column_name(), encoder);
        }

        let extractor = FeatureExtractor::new();
        let matrix: Vec<Vec<f64>> = dataset
            .rows()
            .map(|row| extractor.assemble(&row.claim_features(), &encoders).values)
            .collect();

        let split = stratified_split(&labels, self.test_fraction, self.split_seed);
        let (x_train, y_train) = select(&matrix, &labels, &split.train);
        let (x_test, y_test) = select(&matrix, &labels, &split.test);
        info!(train = x_train.len(), test = x_test.len(), "Stratified split");

        info!(
            n_estimators = self.params.n_estimators,
            max_depth = self.params.max_depth,
            learning_rate = self.params.learning_rate,
            "Fitting gradient boosted classifier"
        );
        let classifier = GradientBoostedClassifier::fit(&x_train, &y_train, self.params)?;

        let mut scores = Vec::with_capacity(x_test.len());
        for row in &x_test {
            scores.push(classifier.predict_proba(row)?);
        }
        let predictions: Vec<u8> = scores.iter().map(|&p| u8::from(p > 0.5)).collect();

        if x_test.is_empty() {
            warn!("Held-out split is empty; metrics are not meaningful");
        }
        let accuracy_pct = round_to(accuracy(&y_test, &predictions) * 100.0, 1);
        let auc = round_to(roc_auc(&y_test, &scores), 4);
        let report = ClassificationReport::new(&y_test, &predictions);

        info!(accuracy = accuracy_pct, auc, "Held-out evaluation");
        for (class, metrics) in [("legit", report.legitimate), ("fraud", report.fraud)] {
            info!(
                class,
                precision = round_to(metrics.precision, 2),
                recall = round_to(metrics.recall, 2),
                f1 = round_to(metrics.f1, 2),
                support = metrics.support,
                "Classification report"
            );
        }

        let vocabularies = Vocabularies {
            incident_types: dataset.distinct_values(CategoricalColumn::IncidentType.column_name()),
            severities: dataset.distinct_values(CategoricalColumn::IncidentSeverity.column_name()),
            collision_types: dataset.distinct_values(CategoricalColumn::CollisionType.column_name()),
            states: dataset.distinct_values(CategoricalColumn::IncidentState.column_name()),
            cities: dataset.distinct_values(CategoricalColumn::IncidentCity.column_name()),
            makes: dataset.distinct_values(CategoricalColumn::AutoMake.column_name()),
            occupations: dataset.distinct_values(CategoricalColumn::InsuredOccupation.column_name()),
            hobbies: dataset.distinct_values(CategoricalColumn::InsuredHobbies.column_name()),
            relationships: dataset
                .distinct_values(CategoricalColumn::InsuredRelationship.column_name()),
        };

        info!(
            trees = classifier.n_trees(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Training complete"
        );

        Ok(ModelArtifact {
            classifier,
            encoders,
            features: FEATURE_NAMES.iter().map(|name| name.to_string()).collect(),
            accuracy: accuracy_pct,
            auc,
            vocabularies,
            trained_at: Utc::now(),
            train_rows: x_train.len(),
            test_rows: x_test.len(),
        })
    }
}

impl Default for TrainingPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn select(matrix: &[Vec<f64>], labels: &[u8], indices: &[usize]) -> (Vec<Vec<f64>>, Vec<u8>) {
    indices
        .iter()
        .map(|&i| (matrix[i].clone(), labels[i]))
        .unzip()
}

/// Train from a CSV file and persist the artifact.
///
/// Nothing is written unless training succeeds.
pub fn train_from_csv(
    dataset_path: &Path,
    artifact_path: &Path,
    params: BoostingParams,
) -> Result<ModelArtifact, TrainingError> {
    let dataset = ClaimDataset::from_csv_path(dataset_path)?;
    let artifact = TrainingPipeline::with_params(params).run(&dataset)?;
    ModelLoader::save_artifact(artifact_path, &artifact)?;
    info!(path = %artifact_path.display(), "Model artifact saved");
    Ok(artifact)
}
