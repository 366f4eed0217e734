use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::{ModelError, RiskModel};

/// Node of a flattened decision tree. Children are indices into `Tree::nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Positive-class probability at this leaf
        probability: f64,
    },
}

/// Decision tree stored as a node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root: `x[feature] <= threshold` goes left.
    pub fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(idx)
                .ok_or_else(|| ModelError::Inference(format!("node index {} out of range", idx)))?;
            match node {
                Node::Leaf { probability } => return Ok(*probability),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).ok_or_else(|| {
                        ModelError::Inference(format!("feature index {} out of range", feature))
                    })?;
                    idx = if *value <= *threshold { *left } else { *right };
                }
            }
        }
        Err(ModelError::Inference("tree contains a cycle".to_string()))
    }
}

/// Random-forest style classifier: the probability is the mean of the
/// leaf probabilities reached in every tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForestModel {
    #[serde(default = "default_name")]
    pub name: String,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

fn default_name() -> String {
    "forest".to_string()
}

impl ForestModel {
    /// Load a forest from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open model file at {}", path.display()))?;
        let model: ForestModel = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Failed to parse model file {}", path.display()))?;

        if model.trees.is_empty() {
            bail!("Model file {} contains no trees", path.display());
        }

        Ok(model)
    }
}

impl RiskModel for ForestModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureShape {
                expected: self.n_features,
                actual: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Inference("forest has no trees".to_string()));
        }

        let mut total = 0.0;
        for tree in &self.trees {
            total += tree.predict(features)?;
        }
        Ok(total / self.trees.len() as f64)
    }
}
