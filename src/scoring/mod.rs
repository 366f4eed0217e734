pub mod diabetes;
pub mod engine;
pub mod factors;
pub mod heart;
pub mod kidney;
pub mod noise;
pub mod observation;
pub mod provider;

pub use diabetes::DiabetesObservation;
pub use engine::{
    calculate_score, rule_based, FactorContribution, ScoreBreakdown, ScoreResult, ScoreSource,
};
pub use factors::{Bucket, Effect, FactorInput, RangeOp};
pub use heart::HeartObservation;
pub use kidney::KidneyObservation;
pub use noise::{JitterPolicy, NoJitter, NoiseSource, UniformJitter, DEFAULT_JITTER};
pub use observation::{parse_assignments, parse_value, Disease, FieldSpec, Observation};
pub use provider::ScoreProvider;
