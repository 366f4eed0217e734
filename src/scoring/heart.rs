//! Heart disease observation and rule-based scoring.

use serde::{Deserialize, Serialize};

use super::factors::{Bucket, Effect, FactorInput, RangeOp};
use super::observation::{Disease, FieldSpec, Observation};

const AGE: &[Bucket] = &[
    Bucket::new(RangeOp::LessThan(40.0), 0.1),
    Bucket::new(RangeOp::LessThan(50.0), 0.2),
    Bucket::new(RangeOp::LessThan(60.0), 0.3),
    Bucket::new(RangeOp::LessThan(70.0), 0.4),
    Bucket::new(RangeOp::Any, 0.5),
];

// Typical angina (0) outranks asymptomatic (3). Do not reorder without
// clinical sign-off.
const CHEST_PAIN: &[Bucket] = &[
    Bucket::new(RangeOp::Equal(0.0), 0.3),
    Bucket::new(RangeOp::Equal(1.0), 0.2),
    Bucket::new(RangeOp::Equal(2.0), 0.1),
    Bucket::new(RangeOp::Equal(3.0), 0.05),
];

const RESTING_BP: &[Bucket] = &[
    Bucket::new(RangeOp::LessThan(120.0), 0.05),
    Bucket::new(RangeOp::LessThan(130.0), 0.1),
    Bucket::new(RangeOp::LessThan(140.0), 0.2),
    Bucket::new(RangeOp::LessThan(160.0), 0.3),
    Bucket::new(RangeOp::Any, 0.4),
];

const CHOLESTEROL: &[Bucket] = &[
    Bucket::new(RangeOp::LessThan(200.0), 0.05),
    Bucket::new(RangeOp::LessThan(240.0), 0.1),
    Bucket::new(RangeOp::Any, 0.3),
];

const RESTING_ECG: &[Bucket] = &[Bucket::new(RangeOp::GreaterThan(0.0), 0.1)];

// Lower peak heart rate means worse fitness.
const MAX_HEART_RATE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterThan(160.0), 0.05),
    Bucket::new(RangeOp::GreaterThan(140.0), 0.1),
    Bucket::new(RangeOp::Any, 0.2),
];

const ST_SLOPE: &[Bucket] = &[Bucket::new(RangeOp::Equal(2.0), 0.2)];

const THALASSEMIA: &[Bucket] = &[Bucket::new(RangeOp::GreaterThan(1.0), 0.2)];

/// 13-attribute heart observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeartObservation {
    pub age: f64,
    /// 1 = male, 0 = female
    pub sex: f64,
    /// 0 typical angina, 1 atypical angina, 2 non-anginal pain, 3 asymptomatic
    pub chest_pain_type: f64,
    /// Resting systolic blood pressure (mm Hg)
    pub resting_bp: f64,
    /// Serum cholesterol (mg/dl)
    pub cholesterol: f64,
    /// Fasting blood sugar > 120 mg/dl
    pub fasting_blood_sugar_high: f64,
    /// 0 normal, 1 ST-T abnormality, 2 LV hypertrophy
    pub resting_ecg: f64,
    pub max_heart_rate: f64,
    pub exercise_angina: f64,
    /// ST depression induced by exercise relative to rest
    pub st_depression: f64,
    /// 0 upsloping, 1 flat, 2 downsloping
    pub st_slope: f64,
    /// Major vessels colored by fluoroscopy (0-3)
    pub vessels_colored: f64,
    /// 1 normal, 2 fixed defect, 3 reversible defect
    pub thalassemia: f64,
}

impl Default for HeartObservation {
    fn default() -> Self {
        Self {
            age: 50.0,
            sex: 0.0,
            chest_pain_type: 0.0,
            resting_bp: 120.0,
            cholesterol: 200.0,
            fasting_blood_sugar_high: 0.0,
            resting_ecg: 0.0,
            max_heart_rate: 150.0,
            exercise_angina: 0.0,
            st_depression: 0.0,
            st_slope: 0.0,
            vessels_colored: 0.0,
            thalassemia: 0.0,
        }
    }
}

impl Observation for HeartObservation {
    const DISEASE: Disease = Disease::Heart;
    const NORMALIZER: f64 = 3.0;
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::new("age", "Age (years)", 50.0),
        FieldSpec::new("sex", "Sex (1 = male, 0 = female)", 0.0),
        FieldSpec::new(
            "chest_pain_type",
            "Chest pain type (0 typical, 1 atypical, 2 non-anginal, 3 asymptomatic)",
            0.0,
        ),
        FieldSpec::new("resting_bp", "Resting blood pressure (mm Hg)", 120.0),
        FieldSpec::new("cholesterol", "Serum cholesterol (mg/dl)", 200.0),
        FieldSpec::new(
            "fasting_blood_sugar_high",
            "Fasting blood sugar > 120 mg/dl (1 = yes, 0 = no)",
            0.0,
        ),
        FieldSpec::new(
            "resting_ecg",
            "Resting ECG (0 normal, 1 ST-T abnormality, 2 LV hypertrophy)",
            0.0,
        ),
        FieldSpec::new("max_heart_rate", "Maximum heart rate achieved", 150.0),
        FieldSpec::new("exercise_angina", "Exercise-induced angina (1 = yes, 0 = no)", 0.0),
        FieldSpec::new("st_depression", "ST depression induced by exercise", 0.0),
        FieldSpec::new(
            "st_slope",
            "Slope of peak exercise ST segment (0 up, 1 flat, 2 down)",
            0.0,
        ),
        FieldSpec::new("vessels_colored", "Major vessels colored by fluoroscopy (0-3)", 0.0),
        FieldSpec::new(
            "thalassemia",
            "Thalassemia (1 normal, 2 fixed defect, 3 reversible defect)",
            0.0,
        ),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.age,
            self.sex,
            self.chest_pain_type,
            self.resting_bp,
            self.cholesterol,
            self.fasting_blood_sugar_high,
            self.resting_ecg,
            self.max_heart_rate,
            self.exercise_angina,
            self.st_depression,
            self.st_slope,
            self.vessels_colored,
            self.thalassemia,
        ]
    }

    fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "age" => &mut self.age,
            "sex" => &mut self.sex,
            "chest_pain_type" => &mut self.chest_pain_type,
            "resting_bp" => &mut self.resting_bp,
            "cholesterol" => &mut self.cholesterol,
            "fasting_blood_sugar_high" => &mut self.fasting_blood_sugar_high,
            "resting_ecg" => &mut self.resting_ecg,
            "max_heart_rate" => &mut self.max_heart_rate,
            "exercise_angina" => &mut self.exercise_angina,
            "st_depression" => &mut self.st_depression,
            "st_slope" => &mut self.st_slope,
            "vessels_colored" => &mut self.vessels_colored,
            "thalassemia" => &mut self.thalassemia,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn rule_factors(&self) -> Vec<FactorInput> {
        vec![
            FactorInput::new("Age", self.age, Effect::Buckets(AGE)),
            FactorInput::flag("Male sex", self.sex, 0.1),
            FactorInput::new("Chest pain type", self.chest_pain_type, Effect::Buckets(CHEST_PAIN)),
            FactorInput::new("Resting BP", self.resting_bp, Effect::Buckets(RESTING_BP)),
            FactorInput::new("Cholesterol", self.cholesterol, Effect::Buckets(CHOLESTEROL)),
            FactorInput::flag("High fasting sugar", self.fasting_blood_sugar_high, 0.1),
            FactorInput::new("Resting ECG", self.resting_ecg, Effect::Buckets(RESTING_ECG)),
            FactorInput::new(
                "Max heart rate",
                self.max_heart_rate,
                Effect::Buckets(MAX_HEART_RATE),
            ),
            FactorInput::flag("Exercise angina", self.exercise_angina, 0.3),
            FactorInput::new(
                "ST depression",
                self.st_depression,
                Effect::Linear { rate: 0.1, cap: 0.3 },
            ),
            FactorInput::new("ST slope", self.st_slope, Effect::Buckets(ST_SLOPE)),
            FactorInput::new(
                "Vessels colored",
                self.vessels_colored,
                Effect::Linear { rate: 0.1, cap: 0.3 },
            ),
            FactorInput::new("Thalassemia", self.thalassemia, Effect::Buckets(THALASSEMIA)),
        ]
    }

    fn model_features(&self) -> Option<Vec<f64>> {
        Some(self.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::engine::rule_based;
    use crate::scoring::noise::{NoJitter, UniformJitter};
    use std::collections::HashMap;

    fn reference_patient() -> HeartObservation {
        HeartObservation {
            age: 63.0,
            sex: 1.0,
            chest_pain_type: 3.0,
            resting_bp: 145.0,
            cholesterol: 233.0,
            fasting_blood_sugar_high: 1.0,
            resting_ecg: 0.0,
            max_heart_rate: 150.0,
            exercise_angina: 0.0,
            st_depression: 2.3,
            st_slope: 0.0,
            vessels_colored: 0.0,
            thalassemia: 1.0,
        }
    }

    #[test]
    fn test_reference_patient_unjittered() {
        // 0.4 + 0.1 + 0.05 + 0.3 + 0.1 + 0.1 + 0.1 + 0.23 = 1.38, / 3
        let result = rule_based(&reference_patient(), &mut NoJitter);
        assert!((result.score - 0.46).abs() < 1e-9);
    }

    #[test]
    fn test_reference_patient_jitter_bound() {
        let mut noise = UniformJitter::new(0.05);
        for _ in 0..100 {
            let result = rule_based(&reference_patient(), &mut noise);
            assert!((result.score - 0.46).abs() <= 0.05 + 1e-9);
        }
    }

    #[test]
    fn test_deterministic_without_jitter() {
        let a = rule_based(&reference_patient(), &mut NoJitter);
        let b = rule_based(&reference_patient(), &mut NoJitter);
        assert_eq!(a.score.to_bits(), b.score.to_bits());
    }

    #[test]
    fn test_default_observation_score() {
        // age 50 -> 0.3, cp 0 -> 0.3, bp 120 -> 0.1, chol 200 -> 0.1, hr 150 -> 0.1
        let result = rule_based(&HeartObservation::default(), &mut NoJitter);
        assert!((result.score - 0.9 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_chest_pain_inversion_preserved() {
        let typical = HeartObservation {
            chest_pain_type: 0.0,
            ..HeartObservation::default()
        };
        let asymptomatic = HeartObservation {
            chest_pain_type: 3.0,
            ..HeartObservation::default()
        };
        let t = rule_based(&typical, &mut NoJitter).score;
        let a = rule_based(&asymptomatic, &mut NoJitter).score;
        assert!(t > a);
        assert!(((t - a) - 0.25 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_worst_case_clamped() {
        let worst = HeartObservation {
            age: 80.0,
            sex: 1.0,
            chest_pain_type: 0.0,
            resting_bp: 200.0,
            cholesterol: 300.0,
            fasting_blood_sugar_high: 1.0,
            resting_ecg: 2.0,
            max_heart_rate: 90.0,
            exercise_angina: 1.0,
            st_depression: 6.0,
            st_slope: 2.0,
            vessels_colored: 3.0,
            thalassemia: 3.0,
        };
        let result = rule_based(&worst, &mut NoJitter);
        // 3.3 raw / 3.0 saturates
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_extreme_inputs_stay_in_range() {
        let extreme = HeartObservation {
            age: -1e9,
            st_depression: -1e12,
            vessels_colored: -50.0,
            ..HeartObservation::default()
        };
        let result = rule_based(&extreme, &mut NoJitter);
        assert!((0.0..=1.0).contains(&result.score));
    }

    #[test]
    fn test_non_finite_inputs_defaulted() {
        let broken = HeartObservation {
            age: f64::NAN,
            cholesterol: f64::INFINITY,
            ..HeartObservation::default()
        };
        let fixed = rule_based(&broken, &mut NoJitter);
        let default = rule_based(&HeartObservation::default(), &mut NoJitter);
        assert_eq!(fixed.score, default.score);
    }

    #[test]
    fn test_schema_defaults_match_default_impl() {
        let defaults = HeartObservation::default().values();
        assert_eq!(HeartObservation::SCHEMA.len(), 13);
        for (spec, value) in HeartObservation::SCHEMA.iter().zip(defaults) {
            assert_eq!(spec.default, value, "default mismatch for {}", spec.name);
        }
    }

    #[test]
    fn test_from_fields_defaults_missing_and_invalid() {
        let mut fields = HashMap::new();
        fields.insert("age".to_string(), "63".to_string());
        fields.insert("resting_bp".to_string(), "not a number".to_string());
        let observation = HeartObservation::from_fields(&fields);
        assert_eq!(observation.age, 63.0);
        assert_eq!(observation.resting_bp, 120.0);
        assert_eq!(observation.max_heart_rate, 150.0);
    }

    #[test]
    fn test_partial_yaml_parse() {
        let yaml = r#"
age: 63
sex: 1
st_depression: 2.3
"#;
        let observation: HeartObservation = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(observation.age, 63.0);
        assert_eq!(observation.st_depression, 2.3);
        assert_eq!(observation.cholesterol, 200.0);
    }

    #[test]
    fn test_unknown_yaml_field_rejected() {
        let yaml = "age: 63\nweight: 80\n";
        let parsed: Result<HeartObservation, _> = serde_saphyr::from_str(yaml);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_breakdown_lists_every_field() {
        let result = rule_based(&reference_patient(), &mut NoJitter);
        let breakdown = result.breakdown.unwrap();
        assert_eq!(breakdown.factors.len(), 13);
        assert_eq!(breakdown.normalizer, 3.0);
    }

    #[test]
    fn test_model_features_full_vector() {
        let features = reference_patient().model_features().unwrap();
        assert_eq!(features.len(), 13);
        assert_eq!(features[0], 63.0);
        assert_eq!(features[9], 2.3);
    }
}
