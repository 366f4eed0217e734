//! Diabetes symptom observation and rule-based scoring. There is no model
//! path for diabetes: scoring is always rule-based.

use serde::{Deserialize, Serialize};

use super::factors::{Bucket, Effect, FactorInput, RangeOp};
use super::observation::{Disease, FieldSpec, Observation};

const AGE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterEqual(60.0), 0.2),
    Bucket::new(RangeOp::GreaterEqual(40.0), 0.1),
    Bucket::new(RangeOp::GreaterEqual(30.0), 0.05),
];

/// 12-attribute diabetes observation. Every field but `age` is a 0/1 flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DiabetesObservation {
    pub age: f64,
    /// 1 = male, 0 = female
    pub gender: f64,
    pub polyuria: f64,
    pub polydipsia: f64,
    pub sudden_weight_loss: f64,
    pub weakness: f64,
    pub polyphagia: f64,
    pub genital_thrush: f64,
    pub visual_blurring: f64,
    pub itching: f64,
    pub irritability: f64,
    pub delayed_healing: f64,
}

impl Default for DiabetesObservation {
    fn default() -> Self {
        Self {
            age: 40.0,
            gender: 0.0,
            polyuria: 0.0,
            polydipsia: 0.0,
            sudden_weight_loss: 0.0,
            weakness: 0.0,
            polyphagia: 0.0,
            genital_thrush: 0.0,
            visual_blurring: 0.0,
            itching: 0.0,
            irritability: 0.0,
            delayed_healing: 0.0,
        }
    }
}

impl DiabetesObservation {
    /// 1 when male and 50 or older, else 0.
    fn older_male(&self) -> f64 {
        if self.gender == 1.0 && self.age >= 50.0 {
            1.0
        } else {
            0.0
        }
    }
}

impl Observation for DiabetesObservation {
    const DISEASE: Disease = Disease::Diabetes;
    const NORMALIZER: f64 = 1.6;
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::new("age", "Age (years)", 40.0),
        FieldSpec::new("gender", "Gender (1 = male, 0 = female)", 0.0),
        FieldSpec::new("polyuria", "Excessive urination (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("polydipsia", "Excessive thirst (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("sudden_weight_loss", "Sudden weight loss (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("weakness", "Weakness (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("polyphagia", "Excessive hunger (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("genital_thrush", "Genital thrush (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("visual_blurring", "Visual blurring (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("itching", "Itching (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("irritability", "Irritability (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("delayed_healing", "Delayed healing (1 = yes, 0 = no)", 0.0),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.age,
            self.gender,
            self.polyuria,
            self.polydipsia,
            self.sudden_weight_loss,
            self.weakness,
            self.polyphagia,
            self.genital_thrush,
            self.visual_blurring,
            self.itching,
            self.irritability,
            self.delayed_healing,
        ]
    }

    fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "age" => &mut self.age,
            "gender" => &mut self.gender,
            "polyuria" => &mut self.polyuria,
            "polydipsia" => &mut self.polydipsia,
            "sudden_weight_loss" => &mut self.sudden_weight_loss,
            "weakness" => &mut self.weakness,
            "polyphagia" => &mut self.polyphagia,
            "genital_thrush" => &mut self.genital_thrush,
            "visual_blurring" => &mut self.visual_blurring,
            "itching" => &mut self.itching,
            "irritability" => &mut self.irritability,
            "delayed_healing" => &mut self.delayed_healing,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn rule_factors(&self) -> Vec<FactorInput> {
        vec![
            FactorInput::new("Age", self.age, Effect::Buckets(AGE)),
            FactorInput::flag("Male, 50+", self.older_male(), 0.05),
            // Major symptoms
            FactorInput::flag("Polyuria", self.polyuria, 0.15),
            FactorInput::flag("Polydipsia", self.polydipsia, 0.15),
            FactorInput::flag("Sudden weight loss", self.sudden_weight_loss, 0.15),
            FactorInput::flag("Weakness", self.weakness, 0.1),
            FactorInput::flag("Polyphagia", self.polyphagia, 0.15),
            // Secondary
            FactorInput::flag("Genital thrush", self.genital_thrush, 0.1),
            FactorInput::flag("Visual blurring", self.visual_blurring, 0.1),
            FactorInput::flag("Itching", self.itching, 0.05),
            FactorInput::flag("Irritability", self.irritability, 0.05),
            FactorInput::flag("Delayed healing", self.delayed_healing, 0.1),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::engine::rule_based;
    use crate::scoring::noise::NoJitter;

    fn all_symptoms(age: f64, gender: f64) -> DiabetesObservation {
        DiabetesObservation {
            age,
            gender,
            polyuria: 1.0,
            polydipsia: 1.0,
            sudden_weight_loss: 1.0,
            weakness: 1.0,
            polyphagia: 1.0,
            genital_thrush: 1.0,
            visual_blurring: 1.0,
            itching: 1.0,
            irritability: 1.0,
            delayed_healing: 1.0,
        }
    }

    #[test]
    fn test_default_observation_score() {
        // age 40 -> 0.1
        let result = rule_based(&DiabetesObservation::default(), &mut NoJitter);
        assert!((result.score - 0.1 / 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_young_without_symptoms_is_zero() {
        let observation = DiabetesObservation {
            age: 25.0,
            ..DiabetesObservation::default()
        };
        assert_eq!(rule_based(&observation, &mut NoJitter).score, 0.0);
    }

    #[test]
    fn test_age_brackets() {
        for (age, raw) in [(30.0, 0.05), (45.0, 0.1), (60.0, 0.2)] {
            let observation = DiabetesObservation {
                age,
                ..DiabetesObservation::default()
            };
            let score = rule_based(&observation, &mut NoJitter).score;
            assert!((score - raw / 1.6).abs() < 1e-9, "age {}", age);
        }
    }

    #[test]
    fn test_male_increment_needs_age_50() {
        let young_male = DiabetesObservation {
            age: 45.0,
            gender: 1.0,
            ..DiabetesObservation::default()
        };
        let older_male = DiabetesObservation {
            age: 50.0,
            gender: 1.0,
            ..DiabetesObservation::default()
        };
        let older_female = DiabetesObservation {
            age: 50.0,
            gender: 0.0,
            ..DiabetesObservation::default()
        };
        let young = rule_based(&young_male, &mut NoJitter).score;
        let male = rule_based(&older_male, &mut NoJitter).score;
        let female = rule_based(&older_female, &mut NoJitter).score;
        assert!((young - 0.1 / 1.6).abs() < 1e-9);
        assert!((male - female - 0.05 / 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_major_symptoms_weighted() {
        let observation = DiabetesObservation {
            age: 20.0,
            polyuria: 1.0,
            polydipsia: 1.0,
            ..DiabetesObservation::default()
        };
        let score = rule_based(&observation, &mut NoJitter).score;
        assert!((score - 0.3 / 1.6).abs() < 1e-9);
    }

    #[test]
    fn test_every_symptom_saturates() {
        // 0.2 + 0.05 + 0.7 + 0.2 + 0.1 + 0.1 = 1.35, below the 1.6 normalizer
        let score = rule_based(&all_symptoms(65.0, 1.0), &mut NoJitter).score;
        assert!((score - 1.35 / 1.6).abs() < 1e-9);
        assert!(score < 1.0);
    }

    #[test]
    fn test_no_model_features() {
        assert!(all_symptoms(50.0, 1.0).model_features().is_none());
    }

    #[test]
    fn test_schema_defaults_match_default_impl() {
        let defaults = DiabetesObservation::default().values();
        assert_eq!(DiabetesObservation::SCHEMA.len(), 12);
        for (spec, value) in DiabetesObservation::SCHEMA.iter().zip(defaults) {
            assert_eq!(spec.default, value, "default mismatch for {}", spec.name);
        }
    }
}
