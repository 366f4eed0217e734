use thiserror::Error;

use crate::scoring::Disease;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssessmentError {
    /// Aggregation was requested before every disease was scored.
    #[error("assessment incomplete: {next} score missing")]
    Incomplete { next: Disease },
    /// A score outside [0, 1], or not a number.
    #[error("invalid {disease} score {score}: must be a finite value in [0, 1]")]
    InvalidScore { disease: Disease, score: f64 },
    #[error("unknown session '{0}'")]
    UnknownSession(String),
}
