//! Statistical risk models used ahead of the clinical rules.

pub mod forest;

pub use forest::{ForestModel, Node, Tree};

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while running a model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("expected {expected} features, got {actual}")]
    FeatureShape { expected: usize, actual: usize },
    #[error("inference failed: {0}")]
    Inference(String),
    #[error("model returned invalid probability {0}")]
    InvalidProbability(f64),
    #[error("model panicked during inference")]
    Panicked,
}

/// A trained classifier answering "probability of disease" for one feature vector.
pub trait RiskModel: Send + Sync {
    /// Short identifier for logs.
    fn name(&self) -> &str;

    /// Length of the feature vector the model was trained on.
    fn n_features(&self) -> usize;

    /// Positive-class probability.
    ///
    /// Report failures as `Err`. A panic here is caught and the caller falls
    /// back to the rules, but the process panic hook still runs first, so the
    /// default hook prints the panic message to stderr.
    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Load a model handle from a JSON forest file.
pub fn load_model(path: &Path) -> Result<Arc<dyn RiskModel>> {
    let forest = ForestModel::load(path)?;
    Ok(Arc::new(forest))
}
