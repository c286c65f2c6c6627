//! Model artifact persistence

use crate::config::ModelConfig;
use crate::error::ArtifactError;
use crate::models::artifact::ModelArtifact;
use crate::models::gbdt::BoostingParams;
use crate::training::pipeline::train_from_csv;
use anyhow::{Context, Result};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Reads and writes JSON model artifacts
pub struct ModelLoader;

impl ModelLoader {
    /// Load an artifact from disk
    pub fn load_artifact<P: AsRef<Path>>(path: P) -> Result<ModelArtifact, ArtifactError> {
        let path = path.as_ref();
        let file = fs::File::open(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ArtifactError::NotFound(path.to_path_buf())
            } else {
                ArtifactError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let artifact: ModelArtifact =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Format {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            path = %path.display(),
            trees = artifact.classifier.n_trees(),
            features = artifact.features.len(),
            accuracy = artifact.accuracy,
            auc = artifact.auc,
            "Model artifact loaded"
        );
        Ok(artifact)
    }

    /// Persist an artifact through a temporary sibling and an atomic rename
    pub fn save_artifact<P: AsRef<Path>>(path: P, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let io_err = |source| ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let staging = staging_path(path);
        if let Err(source) = write_json(&staging, artifact).and_then(|_| fs::rename(&staging, path)) {
            let _ = fs::remove_file(&staging);
            return Err(io_err(source));
        }
        Ok(())
    }

    /// Load the configured artifact, training it first when allowed.
    ///
    /// Fails when the artifact is missing and either training is disabled
    /// or the dataset is absent.
    pub fn load_or_train(config: &ModelConfig) -> Result<ModelArtifact> {
        let artifact_path = Path::new(&config.artifact_path);
        match Self::load_artifact(artifact_path) {
            Ok(artifact) => Ok(artifact),
            Err(ArtifactError::NotFound(_)) if config.train_if_missing => {
                let dataset_path = Path::new(&config.dataset_path);
                warn!(
                    artifact = %artifact_path.display(),
                    dataset = %dataset_path.display(),
                    "Model artifact missing, training from dataset"
                );
                train_from_csv(dataset_path, artifact_path, BoostingParams::default())
                    .with_context(|| format!("Failed to train model from {}", dataset_path.display()))
            }
            Err(e) => Err(e).context("Failed to load model artifact"),
        }
    }
}

fn write_json(path: &Path, artifact: &ModelArtifact) -> std::io::Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer(&mut writer, artifact)?;
    writer.flush()
}

/// Sibling of `path`, unique per process and per call
fn staging_path(path: &Path) -> PathBuf {
    static NEXT: AtomicU64 = AtomicU64::new(0);
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "model".into());
    let seq = NEXT.fetch_add(1, Ordering::Relaxed);
    name.push(format!(".{}.{seq}.tmp", std::process::id()));
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::dataset::{fixtures::csv_with, ClaimDataset};
    use crate::training::pipeline::TrainingPipeline;

    fn artifact() -> &'static ModelArtifact {
        static ARTIFACT: std::sync::OnceLock<ModelArtifact> = std::sync::OnceLock::new();
        ARTIFACT.get_or_init(|| {
            let fraud: &[(&str, &str)] = &[("fraud_reported", "Y"), ("incident_severity", "Major Damage")];
            let layout: Vec<&[(&str, &str)]> =
                (0..20).map(|i| if i % 2 == 0 { fraud } else { &[][..] }).collect();
            let dataset = ClaimDataset::from_reader(csv_with(&layout).as_bytes()).unwrap();
            let params = BoostingParams {
                n_estimators: 5,
                max_depth: 2,
                ..BoostingParams::default()
            };
            TrainingPipeline::with_params(params).run(&dataset).unwrap()
        })
    }

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelLoader::load_artifact(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound(_)));
    }

    #[test]
    fn test_malformed_artifact_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        fs::write(&path, b"{\"classifier\": 12").unwrap();
        assert!(matches!(
            ModelLoader::load_artifact(&path),
            Err(ArtifactError::Format { .. })
        ));
    }

    #[test]
    fn test_staging_path_is_sibling() {
        let target = Path::new("/var/models/fraud.json");
        let staging = staging_path(target);
        assert_eq!(staging.parent(), target.parent());

        let name = staging.file_name().unwrap().to_str().unwrap();
        let pid = std::process::id().to_string();
        assert!(name.starts_with(&format!("fraud.json.{pid}.")), "{name}");
        assert!(name.ends_with(".tmp"), "{name}");
    }

    #[test]
    fn test_staging_paths_do_not_collide() {
        let target = Path::new("/var/models/fraud.json");
        assert_ne!(staging_path(target), staging_path(target));
    }

    #[test]
    fn test_save_leaves_no_staging_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fraud.json");
        ModelLoader::save_artifact(&path, artifact()).unwrap();
        ModelLoader::save_artifact(&path, artifact()).unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("fraud.json")]);
    }

    #[test]
    fn test_load_or_train_without_dataset_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig {
            artifact_path: dir.path().join("model.json").display().to_string(),
            dataset_path: dir.path().join("claims.csv").display().to_string(),
            train_if_missing: true,
        };
        let err = ModelLoader::load_or_train(&config).unwrap_err();
        assert!(format!("{err:#}").contains("Dataset not found"));
        assert!(!dir.path().join("model.json").exists());
    }

    #[test]
    fn test_load_or_train_respects_flag() {
        let dir = tempfile::tempdir().unwrap();
        let config = ModelConfig {
            artifact_path: dir.path().join("model.json").display().to_string(),
            dataset_path: dir.path().join("claims.csv").display().to_string(),
            train_if_missing: false,
        };
        let err = ModelLoader::load_or_train(&config).unwrap_err();
        assert!(format!("{err:#}").contains("not found"));
    }
}
