pub mod aggregate;
pub mod assessment;
pub mod config;
pub mod model;
pub mod output;
pub mod premium;
pub mod scoring;
pub mod session;
pub mod wizard;

pub use aggregate::{aggregate, CompositeRisk, RiskAggregator, RiskScores, RiskWeights};
pub use assessment::{AssessmentInput, AssessmentReport, DiseaseScore, RiskEngine};
pub use premium::{resolve_premium, PremiumQuote, PremiumTier};
pub use scoring::{
    DiabetesObservation, Disease, HeartObservation, KidneyObservation, Observation, ScoreResult,
};
pub use session::{AssessmentError, AssessmentState, SessionStore};
