//! Classifier, encoders and artifact handling

pub mod artifact;
pub mod encoder;
pub mod gbdt;
pub mod inference;
pub mod loader;

pub use artifact::ModelArtifact;
pub use inference::InferenceEngine;
pub use loader::ModelLoader;
