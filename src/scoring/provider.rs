use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::model::{ModelError, RiskModel};

use super::engine::{rule_based, ScoreResult, ScoreSource};
use super::noise::NoiseSource;
use super::observation::Observation;

/// Produces a risk score for one disease.
///
/// The model variant never surfaces a model failure: errors, panics and
/// out-of-range probabilities all degrade to the rule-based score, tagged
/// [`ScoreSource::Fallback`].
#[derive(Clone, Default)]
pub enum ScoreProvider {
    #[default]
    RuleBased,
    StatisticalModel(Arc<dyn RiskModel>),
}

impl fmt::Debug for ScoreProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreProvider::RuleBased => write!(f, "RuleBased"),
            ScoreProvider::StatisticalModel(model) => {
                write!(f, "StatisticalModel({})", model.name())
            }
        }
    }
}

impl ScoreProvider {
    pub fn model(model: Arc<dyn RiskModel>) -> Self {
        ScoreProvider::StatisticalModel(model)
    }

    pub fn has_model(&self) -> bool {
        matches!(self, ScoreProvider::StatisticalModel(_))
    }

    pub fn score<O: Observation>(
        &self,
        observation: &O,
        noise: &mut dyn NoiseSource,
    ) -> ScoreResult {
        let model = match self {
            ScoreProvider::RuleBased => return rule_based(observation, noise),
            ScoreProvider::StatisticalModel(model) => model,
        };

        let features = match observation.clone().sanitized().model_features() {
            Some(features) => features,
            None => return rule_based(observation, noise),
        };

        match predict_guarded(model.as_ref(), &features) {
            Ok(probability) => {
                tracing::debug!(
                    disease = %O::DISEASE,
                    model = model.name(),
                    probability,
                    "model score"
                );
                ScoreResult::from_model(probability)
            }
            Err(e) => {
                tracing::warn!(
                    disease = %O::DISEASE,
                    model = model.name(),
                    error = %e,
                    "model inference failed, using rule-based score"
                );
                let mut result = rule_based(observation, noise);
                result.source = ScoreSource::Fallback;
                result
            }
        }
    }
}

/// Run inference with panics caught and the probability validated.
fn predict_guarded(model: &dyn RiskModel, features: &[f64]) -> Result<f64, ModelError> {
    if features.len() != model.n_features() {
        return Err(ModelError::FeatureShape {
            expected: model.n_features(),
            actual: features.len(),
        });
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| model.predict_proba(features)))
        .map_err(|_| ModelError::Panicked)?;
    let probability = outcome?;

    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(ModelError::InvalidProbability(probability));
    }
    Ok(probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::diabetes::DiabetesObservation;
    use crate::scoring::heart::HeartObservation;
    use crate::scoring::kidney::{KidneyObservation, MODEL_FEATURES};
    use crate::scoring::noise::{NoJitter, UniformJitter};

    struct ConstantModel(f64);

    impl RiskModel for ConstantModel {
        fn name(&self) -> &str {
            "constant"
        }
        fn n_features(&self) -> usize {
            MODEL_FEATURES
        }
        fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct FailingModel;

    impl RiskModel for FailingModel {
        fn name(&self) -> &str {
            "failing"
        }
        fn n_features(&self) -> usize {
            MODEL_FEATURES
        }
        fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Err(ModelError::Inference("backend offline".to_string()))
        }
    }

    struct PanickingModel;

    impl RiskModel for PanickingModel {
        fn name(&self) -> &str {
            "panicking"
        }
        fn n_features(&self) -> usize {
            MODEL_FEATURES
        }
        fn predict_proba(&self, _features: &[f64]) -> Result<f64, ModelError> {
            panic!("index out of bounds")
        }
    }

    fn kidney() -> KidneyObservation {
        KidneyObservation {
            albumin: 3.0,
            blood_urea: 45.0,
            ..KidneyObservation::default()
        }
    }

    #[test]
    fn test_model_answer_used() {
        let provider = ScoreProvider::model(Arc::new(ConstantModel(0.72)));
        let result = provider.score(&kidney(), &mut NoJitter);
        assert_eq!(result.score, 0.72);
        assert_eq!(result.source, ScoreSource::Model);
        assert!(result.breakdown.is_none());
    }

    #[test]
    fn test_error_falls_back_to_rules() {
        let provider = ScoreProvider::model(Arc::new(FailingModel));
        let fallback = provider.score(&kidney(), &mut UniformJitter::seeded(0.05, 9));
        let direct = rule_based(&kidney(), &mut UniformJitter::seeded(0.05, 9));
        assert_eq!(fallback.score.to_bits(), direct.score.to_bits());
        assert_eq!(fallback.source, ScoreSource::Fallback);
        assert!(fallback.breakdown.is_some());
    }

    #[test]
    fn test_panic_falls_back_to_rules() {
        let provider = ScoreProvider::model(Arc::new(PanickingModel));
        let fallback = provider.score(&kidney(), &mut NoJitter);
        let direct = rule_based(&kidney(), &mut NoJitter);
        assert_eq!(fallback.score, direct.score);
        assert_eq!(fallback.source, ScoreSource::Fallback);
    }

    #[test]
    fn test_invalid_probability_falls_back() {
        for bad in [f64::NAN, 1.5, -0.1] {
            let provider = ScoreProvider::model(Arc::new(ConstantModel(bad)));
            let result = provider.score(&kidney(), &mut NoJitter);
            assert_eq!(result.source, ScoreSource::Fallback);
            assert!((0.0..=1.0).contains(&result.score));
        }
    }

    #[test]
    fn test_feature_shape_mismatch_falls_back() {
        // Kidney-shaped model applied to a 13-feature heart observation
        let provider = ScoreProvider::model(Arc::new(ConstantModel(0.9)));
        let result = provider.score(&HeartObservation::default(), &mut NoJitter);
        assert_eq!(result.source, ScoreSource::Fallback);
        assert!((result.score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_diabetes_ignores_model() {
        let provider = ScoreProvider::model(Arc::new(ConstantModel(0.9)));
        let result = provider.score(&DiabetesObservation::default(), &mut NoJitter);
        assert_eq!(result.source, ScoreSource::RuleBased);
    }

    #[test]
    fn test_rule_based_provider() {
        let provider = ScoreProvider::RuleBased;
        assert!(!provider.has_model());
        let result = provider.score(&kidney(), &mut NoJitter);
        assert_eq!(result.source, ScoreSource::RuleBased);
    }

    #[test]
    fn test_debug_names_model() {
        let provider = ScoreProvider::model(Arc::new(FailingModel));
        assert_eq!(format!("{:?}", provider), "StatisticalModel(failing)");
    }
}
