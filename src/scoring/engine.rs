use serde::{Deserialize, Serialize};

use super::factors::FactorInput;
use super::noise::NoiseSource;
use super::observation::Observation;

/// Where a risk score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// Additive clinical rules.
    RuleBased,
    /// A statistical model answered.
    Model,
    /// A model was configured but failed; rules answered instead.
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub label: String,       // e.g. "Age", "Resting BP"
    pub value: f64,          // Attribute value the rule saw
    pub description: String, // e.g. "matched '>=140' -> +0.2"
    pub points: f64,         // Raw points added
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub raw_total: f64,
    pub normalizer: f64,
    /// `raw_total / normalizer` clamped to [0, 1], before jitter.
    pub normalized: f64,
    pub jitter: f64,
    pub factors: Vec<FactorContribution>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Risk probability in [0, 1].
    pub score: f64,
    pub source: ScoreSource,
    /// Present for rule-based scores only.
    pub breakdown: Option<ScoreBreakdown>,
}

impl ScoreResult {
    pub fn from_model(probability: f64) -> Self {
        Self {
            score: clamp_unit(probability),
            source: ScoreSource::Model,
            breakdown: None,
        }
    }
}

/// Sum the factor contributions, normalize, clamp, then jitter and re-clamp.
pub fn calculate_score(
    inputs: &[FactorInput],
    normalizer: f64,
    noise: &mut dyn NoiseSource,
) -> ScoreResult {
    let mut raw_total = 0.0;
    let mut factors = Vec::with_capacity(inputs.len());

    for input in inputs {
        let applied = input.effect.apply(input.value);
        raw_total += applied.points;
        factors.push(FactorContribution {
            label: input.label.to_string(),
            value: input.value,
            description: applied.description,
            points: applied.points,
        });
    }

    let normalized = if normalizer > 0.0 {
        clamp_unit(raw_total / normalizer)
    } else {
        0.0
    };
    let jitter = noise.sample();
    let score = clamp_unit(normalized + jitter);

    ScoreResult {
        score,
        source: ScoreSource::RuleBased,
        breakdown: Some(ScoreBreakdown {
            raw_total,
            normalizer,
            normalized,
            jitter,
            factors,
        }),
    }
}

/// Rule-based score for any observation.
pub fn rule_based<O: Observation>(observation: &O, noise: &mut dyn NoiseSource) -> ScoreResult {
    let sanitized = observation.clone().sanitized();
    calculate_score(&sanitized.rule_factors(), O::NORMALIZER, noise)
}

/// Clamp into [0, 1]; NaN maps to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}
