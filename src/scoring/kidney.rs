//! Chronic kidney disease observation and rule-based scoring.

use serde::{Deserialize, Serialize};

use super::factors::{Bucket, Effect, FactorInput, RangeOp};
use super::observation::{Disease, FieldSpec, Observation};

const AGE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterEqual(60.0), 0.2),
    Bucket::new(RangeOp::GreaterEqual(40.0), 0.1),
];

const BLOOD_PRESSURE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterEqual(140.0), 0.2),
    Bucket::new(RangeOp::GreaterEqual(130.0), 0.1),
];

const GLUCOSE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterThan(200.0), 0.2),
    Bucket::new(RangeOp::GreaterThan(140.0), 0.1),
];

const UREA: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterThan(50.0), 0.3),
    Bucket::new(RangeOp::GreaterThan(40.0), 0.2),
    Bucket::new(RangeOp::GreaterThan(30.0), 0.1),
];

const CREATININE: &[Bucket] = &[
    Bucket::new(RangeOp::GreaterThan(1.5), 0.3),
    Bucket::new(RangeOp::GreaterThan(1.2), 0.2),
    Bucket::new(RangeOp::GreaterThan(0.9), 0.1),
];

/// Number of features the kidney model expects (specific gravity dropped).
pub const MODEL_FEATURES: usize = 11;

/// 12-attribute kidney observation.
///
/// `specific_gravity` is collected for completeness but neither the rules
/// nor the model feature vector use it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KidneyObservation {
    pub age: f64,
    pub blood_pressure: f64,
    pub specific_gravity: f64,
    /// 0-5
    pub albumin: f64,
    /// 0-5
    pub sugar: f64,
    /// 1 = abnormal
    pub red_blood_cells: f64,
    /// 1 = abnormal
    pub pus_cell: f64,
    /// 1 = present
    pub pus_cell_clumps: f64,
    /// 1 = present
    pub bacteria: f64,
    /// mg/dl
    pub blood_glucose_random: f64,
    /// mg/dl
    pub blood_urea: f64,
    /// mg/dl
    pub serum_creatinine: f64,
}

impl Default for KidneyObservation {
    fn default() -> Self {
        Self {
            age: 50.0,
            blood_pressure: 120.0,
            specific_gravity: 1.015,
            albumin: 0.0,
            sugar: 0.0,
            red_blood_cells: 0.0,
            pus_cell: 0.0,
            pus_cell_clumps: 0.0,
            bacteria: 0.0,
            blood_glucose_random: 120.0,
            blood_urea: 30.0,
            serum_creatinine: 1.0,
        }
    }
}

impl Observation for KidneyObservation {
    const DISEASE: Disease = Disease::Kidney;
    const NORMALIZER: f64 = 2.0;
    const SCHEMA: &'static [FieldSpec] = &[
        FieldSpec::new("age", "Age (years)", 50.0),
        FieldSpec::new("blood_pressure", "Blood pressure (mm Hg)", 120.0),
        FieldSpec::new("specific_gravity", "Urine specific gravity", 1.015),
        FieldSpec::new("albumin", "Albumin (0-5)", 0.0),
        FieldSpec::new("sugar", "Sugar (0-5)", 0.0),
        FieldSpec::new("red_blood_cells", "Red blood cells (1 = abnormal, 0 = normal)", 0.0),
        FieldSpec::new("pus_cell", "Pus cells (1 = abnormal, 0 = normal)", 0.0),
        FieldSpec::new("pus_cell_clumps", "Pus cell clumps (1 = present, 0 = absent)", 0.0),
        FieldSpec::new("bacteria", "Bacteria (1 = present, 0 = absent)", 0.0),
        FieldSpec::new("blood_glucose_random", "Random blood glucose (mg/dl)", 120.0),
        FieldSpec::new("blood_urea", "Blood urea (mg/dl)", 30.0),
        FieldSpec::new("serum_creatinine", "Serum creatinine (mg/dl)", 1.0),
    ];

    fn values(&self) -> Vec<f64> {
        vec![
            self.age,
            self.blood_pressure,
            self.specific_gravity,
            self.albumin,
            self.sugar,
            self.red_blood_cells,
            self.pus_cell,
            self.pus_cell_clumps,
            self.bacteria,
            self.blood_glucose_random,
            self.blood_urea,
            self.serum_creatinine,
        ]
    }

    fn set(&mut self, name: &str, value: f64) -> bool {
        let slot = match name {
            "age" => &mut self.age,
            "blood_pressure" => &mut self.blood_pressure,
            "specific_gravity" => &mut self.specific_gravity,
            "albumin" => &mut self.albumin,
            "sugar" => &mut self.sugar,
            "red_blood_cells" => &mut self.red_blood_cells,
            "pus_cell" => &mut self.pus_cell,
            "pus_cell_clumps" => &mut self.pus_cell_clumps,
            "bacteria" => &mut self.bacteria,
            "blood_glucose_random" => &mut self.blood_glucose_random,
            "blood_urea" => &mut self.blood_urea,
            "serum_creatinine" => &mut self.serum_creatinine,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn rule_factors(&self) -> Vec<FactorInput> {
        vec![
            FactorInput::new("Age", self.age, Effect::Buckets(AGE)),
            FactorInput::new(
                "Blood pressure",
                self.blood_pressure,
                Effect::Buckets(BLOOD_PRESSURE),
            ),
            FactorInput::new("Albumin", self.albumin, Effect::Linear { rate: 0.06, cap: 0.3 }),
            FactorInput::new("Sugar", self.sugar, Effect::Linear { rate: 0.04, cap: 0.2 }),
            FactorInput::flag("Abnormal red cells", self.red_blood_cells, 0.1),
            FactorInput::flag("Abnormal pus cells", self.pus_cell, 0.1),
            FactorInput::flag("Pus cell clumps", self.pus_cell_clumps, 0.1),
            FactorInput::flag("Bacteria", self.bacteria, 0.1),
            FactorInput::new("Blood glucose", self.blood_glucose_random, Effect::Buckets(GLUCOSE)),
            FactorInput::new("Blood urea", self.blood_urea, Effect::Buckets(UREA)),
            FactorInput::new(
                "Serum creatinine",
                self.serum_creatinine,
                Effect::Buckets(CREATININE),
            ),
        ]
    }

    fn model_features(&self) -> Option<Vec<f64>> {
        Some(vec![
            self.age,
            self.blood_pressure,
            self.albumin,
            self.sugar,
            self.red_blood_cells,
            self.pus_cell,
            self.pus_cell_clumps,
            self.bacteria,
            self.blood_glucose_random,
            self.blood_urea,
            self.serum_creatinine,
        ])
    }
}
