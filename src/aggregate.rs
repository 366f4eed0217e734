use serde::{Deserialize, Serialize};

use crate::scoring::engine::clamp_unit;

/// Default override threshold and floor for the heart and kidney scores.
pub const DEFAULT_OVERRIDE_THRESHOLD: f64 = 0.9;

/// One finished score per disease.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskScores {
    pub heart: f64,
    pub kidney: f64,
    pub diabetes: f64,
}

impl RiskScores {
    pub fn new(heart: f64, kidney: f64, diabetes: f64) -> Self {
        Self {
            heart,
            kidney,
            diabetes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiskWeights {
    pub heart: f64,
    pub kidney: f64,
    pub diabetes: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            heart: 0.5,
            kidney: 0.3,
            diabetes: 0.2,
        }
    }
}

impl RiskWeights {
    pub fn total(&self) -> f64 {
        self.heart + self.kidney + self.diabetes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeRisk {
    /// Final composite in [0, 1].
    pub value: f64,
    /// Weighted mean before the override.
    pub weighted_mean: f64,
    /// True when the heart/kidney override raised the value.
    pub override_applied: bool,
}

/// Combines the per-disease scores into one composite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAggregator {
    pub weights: RiskWeights,
    pub override_threshold: f64,
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self {
            weights: RiskWeights::default(),
            override_threshold: DEFAULT_OVERRIDE_THRESHOLD,
        }
    }
}

impl RiskAggregator {
    pub fn new(weights: RiskWeights, override_threshold: f64) -> Self {
        Self {
            weights,
            override_threshold,
        }
    }

    /// Weighted mean of the three scores. A heart or kidney score above the
    /// threshold lifts the composite to at least the threshold; diabetes
    /// never does.
    pub fn aggregate(&self, scores: &RiskScores) -> CompositeRisk {
        let w = &self.weights;
        let total = w.total();
        let weighted_mean = if total > 0.0 {
            clamp_unit(
                (scores.heart * w.heart + scores.kidney * w.kidney + scores.diabetes * w.diabetes)
                    / total,
            )
        } else {
            0.0
        };

        let t = self.override_threshold;
        let triggered = scores.heart > t || scores.kidney > t;
        let (value, override_applied) = if triggered && weighted_mean < t {
            tracing::debug!(
                heart = scores.heart,
                kidney = scores.kidney,
                weighted_mean,
                threshold = t,
                "high-risk override applied"
            );
            (t, true)
        } else {
            (weighted_mean, false)
        };

        CompositeRisk {
            value,
            weighted_mean,
            override_applied,
        }
    }
}

/// Aggregate with the default weights and threshold.
pub fn aggregate(scores: &RiskScores) -> CompositeRisk {
    RiskAggregator::default().aggregate(scores)
}
