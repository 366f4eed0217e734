use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::aggregate::{CompositeRisk, RiskAggregator, RiskScores};
use crate::config::Config;
use crate::model::load_model;
use crate::premium::{resolve_premium, PremiumQuote};
use crate::scoring::{
    DiabetesObservation, Disease, HeartObservation, JitterPolicy, KidneyObservation, Observation,
    ScoreProvider, ScoreResult,
};
use crate::session::{AssessmentError, AssessmentState, SessionStore};

static RULE_BASED: ScoreProvider = ScoreProvider::RuleBased;

/// Observations for a full assessment. Missing sections take the
/// per-field defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssessmentInput {
    pub heart: HeartObservation,
    pub kidney: KidneyObservation,
    pub diabetes: DiabetesObservation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseScore {
    pub disease: Disease,
    pub result: ScoreResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub scores: RiskScores,
    pub composite: CompositeRisk,
    pub quote: PremiumQuote,
    /// Per-disease results in wizard order, as passed to `finalize`.
    pub details: Vec<DiseaseScore>,
    pub assessed_at: DateTime<Utc>,
}

/// Owns the score providers, aggregation settings and jitter policy.
///
/// `RiskEngine` holds no mutable state; share it behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct RiskEngine {
    heart: ScoreProvider,
    kidney: ScoreProvider,
    aggregator: RiskAggregator,
    jitter: JitterPolicy,
}

impl RiskEngine {
    /// Rule-based engine with the given aggregation and jitter settings.
    pub fn new(aggregator: RiskAggregator, jitter: JitterPolicy) -> Self {
        Self {
            heart: ScoreProvider::RuleBased,
            kidney: ScoreProvider::RuleBased,
            aggregator,
            jitter,
        }
    }

    /// Build from configuration, loading model files once. A model that
    /// fails to load leaves that disease on the rules.
    pub fn from_config(config: &Config) -> Self {
        let aggregator = RiskAggregator::new(config.weights(), config.override_threshold());
        Self::new(aggregator, config.jitter_policy())
            .with_heart_provider(load_provider::<HeartObservation>(config.heart_model()))
            .with_kidney_provider(load_provider::<KidneyObservation>(config.kidney_model()))
    }

    pub fn with_heart_provider(mut self, provider: ScoreProvider) -> Self {
        self.heart = provider;
        self
    }

    pub fn with_kidney_provider(mut self, provider: ScoreProvider) -> Self {
        self.kidney = provider;
        self
    }

    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn aggregator(&self) -> &RiskAggregator {
        &self.aggregator
    }

    pub fn jitter(&self) -> &JitterPolicy {
        &self.jitter
    }

    pub fn provider(&self, disease: Disease) -> &ScoreProvider {
        match disease {
            Disease::Heart => &self.heart,
            Disease::Kidney => &self.kidney,
            Disease::Diabetes => &RULE_BASED,
        }
    }

    /// Score one observation with the provider configured for its disease.
    pub fn score<O: Observation>(&self, observation: &O) -> ScoreResult {
        let mut noise = self.jitter.source_for(O::DISEASE);
        let result = self.provider(O::DISEASE).score(observation, noise.as_mut());
        tracing::debug!(
            disease = %O::DISEASE,
            score = result.score,
            source = ?result.source,
            "disease scored"
        );
        result
    }

    pub fn score_heart(&self, observation: &HeartObservation) -> ScoreResult {
        self.score(observation)
    }

    pub fn score_kidney(&self, observation: &KidneyObservation) -> ScoreResult {
        self.score(observation)
    }

    pub fn score_diabetes(&self, observation: &DiabetesObservation) -> ScoreResult {
        self.score(observation)
    }

    /// Score an observation and store the result in a session.
    pub fn submit<O: Observation>(
        &self,
        store: &SessionStore,
        session: &str,
        observation: &O,
    ) -> Result<DiseaseScore, AssessmentError> {
        let result = self.score(observation);
        store.record(session, O::DISEASE, result.score)?;
        Ok(DiseaseScore {
            disease: O::DISEASE,
            result,
        })
    }

    /// Aggregate a completed assessment and resolve its premium.
    pub fn finalize(
        &self,
        state: &AssessmentState,
        details: Vec<DiseaseScore>,
    ) -> Result<AssessmentReport, AssessmentError> {
        let scores = state.scores()?;
        let composite = self.aggregator.aggregate(&scores);
        let quote = resolve_premium(composite.value);
        Ok(AssessmentReport {
            scores,
            composite,
            quote,
            details,
            assessed_at: Utc::now(),
        })
    }

    /// Score all three diseases and produce the report.
    pub fn assess(&self, input: &AssessmentInput) -> AssessmentReport {
        let heart = self.score(&input.heart);
        let kidney = self.score(&input.kidney);
        let diabetes = self.score(&input.diabetes);

        let scores = RiskScores::new(heart.score, kidney.score, diabetes.score);
        let composite = self.aggregator.aggregate(&scores);

        AssessmentReport {
            scores,
            composite,
            quote: resolve_premium(composite.value),
            details: vec![
                DiseaseScore {
                    disease: Disease::Heart,
                    result: heart,
                },
                DiseaseScore {
                    disease: Disease::Kidney,
                    result: kidney,
                },
                DiseaseScore {
                    disease: Disease::Diabetes,
                    result: diabetes,
                },
            ],
            assessed_at: Utc::now(),
        }
    }
}

fn load_provider<O: Observation>(path: Option<&PathBuf>) -> ScoreProvider {
    let Some(path) = path else {
        return ScoreProvider::RuleBased;
    };
    match try_load::<O>(path) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::warn!(
                disease = %O::DISEASE,
                path = %path.display(),
                error = %e,
                "could not load model, using rule-based scoring"
            );
            ScoreProvider::RuleBased
        }
    }
}

fn try_load<O: Observation>(path: &Path) -> anyhow::Result<ScoreProvider> {
    let Some(expected) = O::default().model_features().map(|f| f.len()) else {
        anyhow::bail!("{} scoring has no model path", O::DISEASE);
    };
    let model = load_model(path)?;
    if model.n_features() != expected {
        anyhow::bail!(
            "model expects {} features, {} observations provide {}",
            model.n_features(),
            O::DISEASE,
            expected
        );
    }
    tracing::debug!(disease = %O::DISEASE, model = model.name(), "model loaded");
    Ok(ScoreProvider::model(model))
}
