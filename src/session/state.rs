use serde::{Deserialize, Serialize};

use crate::aggregate::RiskScores;
use crate::scoring::Disease;

use super::error::AssessmentError;

/// Scores collected so far in one assessment, in wizard order.
///
/// Transitions are pure: each `with_*` returns a new state. Submitting a
/// disease twice keeps the later score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssessmentState {
    pub heart: Option<f64>,
    pub kidney: Option<f64>,
    pub diabetes: Option<f64>,
}

/// Reject scores that are not a finite probability.
pub fn check_score(disease: Disease, score: f64) -> Result<f64, AssessmentError> {
    if score.is_finite() && (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(AssessmentError::InvalidScore { disease, score })
    }
}

impl AssessmentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_heart(self, score: f64) -> Self {
        Self {
            heart: Some(score),
            ..self
        }
    }

    pub fn with_kidney(self, score: f64) -> Self {
        Self {
            kidney: Some(score),
            ..self
        }
    }

    pub fn with_diabetes(self, score: f64) -> Self {
        Self {
            diabetes: Some(score),
            ..self
        }
    }

    pub fn with_score(self, disease: Disease, score: f64) -> Self {
        match disease {
            Disease::Heart => self.with_heart(score),
            Disease::Kidney => self.with_kidney(score),
            Disease::Diabetes => self.with_diabetes(score),
        }
    }

    pub fn get(&self, disease: Disease) -> Option<f64> {
        match disease {
            Disease::Heart => self.heart,
            Disease::Kidney => self.kidney,
            Disease::Diabetes => self.diabetes,
        }
    }

    /// First disease still missing a score, in wizard order.
    pub fn next_step(&self) -> Option<Disease> {
        Disease::ALL.into_iter().find(|d| self.get(*d).is_none())
    }

    pub fn is_complete(&self) -> bool {
        self.next_step().is_none()
    }

    /// All three scores, or the first missing step. A stored score outside
    /// [0, 1] is an error rather than a silent clamp.
    pub fn scores(&self) -> Result<RiskScores, AssessmentError> {
        match (self.heart, self.kidney, self.diabetes) {
            (Some(heart), Some(kidney), Some(diabetes)) => Ok(RiskScores::new(
                check_score(Disease::Heart, heart)?,
                check_score(Disease::Kidney, kidney)?,
                check_score(Disease::Diabetes, diabetes)?,
            )),
            _ => Err(AssessmentError::Incomplete {
                next: self.next_step().unwrap_or(Disease::Heart),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_points_to_heart() {
        let state = AssessmentState::new();
        assert_eq!(state.next_step(), Some(Disease::Heart));
        assert_eq!(
            state.scores(),
            Err(AssessmentError::Incomplete {
                next: Disease::Heart
            })
        );
    }

    #[test]
    fn test_transitions_are_pure() {
        let empty = AssessmentState::new();
        let with_heart = empty.with_heart(0.4);
        assert_eq!(empty.heart, None);
        assert_eq!(with_heart.heart, Some(0.4));
        assert_eq!(with_heart.next_step(), Some(Disease::Kidney));
    }

    #[test]
    fn test_missing_middle_step_reported() {
        let state = AssessmentState::new().with_heart(0.4).with_diabetes(0.3);
        assert_eq!(
            state.scores(),
            Err(AssessmentError::Incomplete {
                next: Disease::Kidney
            })
        );
    }

    #[test]
    fn test_complete_state() {
        let state = AssessmentState::new()
            .with_score(Disease::Heart, 0.4)
            .with_score(Disease::Kidney, 0.5)
            .with_score(Disease::Diabetes, 0.3);
        assert!(state.is_complete());
        assert_eq!(state.scores().unwrap(), RiskScores::new(0.4, 0.5, 0.3));
    }

    #[test]
    fn test_scores_rejects_nan() {
        let state = AssessmentState::new()
            .with_heart(f64::NAN)
            .with_kidney(0.5)
            .with_diabetes(0.5);
        assert!(matches!(
            state.scores(),
            Err(AssessmentError::InvalidScore {
                disease: Disease::Heart,
                ..
            })
        ));
    }

    #[test]
    fn test_check_score_bounds() {
        assert_eq!(check_score(Disease::Kidney, 0.0), Ok(0.0));
        assert_eq!(check_score(Disease::Kidney, 1.0), Ok(1.0));
        assert!(check_score(Disease::Kidney, 1.01).is_err());
        assert!(check_score(Disease::Kidney, -0.01).is_err());
        assert!(check_score(Disease::Kidney, f64::INFINITY).is_err());
    }

    #[test]
    fn test_resubmission_overwrites() {
        let state = AssessmentState::new().with_heart(0.4).with_heart(0.7);
        assert_eq!(state.get(Disease::Heart), Some(0.7));
    }
}
