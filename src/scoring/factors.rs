use std::fmt;

/// Comparison applied to a single clinical attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeOp {
    LessThan(f64),
    GreaterThan(f64),
    GreaterEqual(f64),
    Equal(f64),
    Any,
}

impl RangeOp {
    pub fn matches(&self, value: f64) -> bool {
        match self {
            RangeOp::LessThan(n) => value < *n,
            RangeOp::GreaterThan(n) => value > *n,
            RangeOp::GreaterEqual(n) => value >= *n,
            RangeOp::Equal(n) => value == *n,
            RangeOp::Any => true,
        }
    }
}

impl fmt::Display for RangeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeOp::LessThan(n) => write!(f, "<{}", n),
            RangeOp::GreaterThan(n) => write!(f, ">{}", n),
            RangeOp::GreaterEqual(n) => write!(f, ">={}", n),
            RangeOp::Equal(n) => write!(f, "={}", n),
            RangeOp::Any => write!(f, "otherwise"),
        }
    }
}

/// A bracket in a step table: when `range` matches, add `points`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bucket {
    pub range: RangeOp,
    pub points: f64,
}

impl Bucket {
    pub const fn new(range: RangeOp, points: f64) -> Self {
        Self { range, points }
    }
}

/// How one attribute turns into risk points.
#[derive(Debug, Clone, Copy)]
pub enum Effect {
    /// Step table; the first matching bucket wins, no match adds nothing.
    Buckets(&'static [Bucket]),
    /// `min(cap, value * rate)`
    Linear { rate: f64, cap: f64 },
    /// Flat increment when the value is exactly 1.
    Flag(f64),
}

/// Result of evaluating an effect against a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub points: f64,
    pub description: String,
}

impl Effect {
    pub fn apply(&self, value: f64) -> Applied {
        match self {
            Effect::Buckets(buckets) => match buckets.iter().find(|b| b.range.matches(value)) {
                Some(bucket) => Applied {
                    points: bucket.points,
                    description: format!("matched '{}' -> {:+}", bucket.range, bucket.points),
                },
                None => Applied {
                    points: 0.0,
                    description: "no bracket matched".to_string(),
                },
            },
            Effect::Linear { rate, cap } => {
                let points = (value * rate).min(*cap);
                Applied {
                    points,
                    description: format!("min({}, {} x {}) -> {:+}", cap, value, rate, points),
                }
            }
            Effect::Flag(points) => {
                if value == 1.0 {
                    Applied {
                        points: *points,
                        description: format!("present -> {:+}", points),
                    }
                } else {
                    Applied {
                        points: 0.0,
                        description: "absent".to_string(),
                    }
                }
            }
        }
    }
}

/// One attribute of an observation paired with its effect.
#[derive(Debug, Clone)]
pub struct FactorInput {
    pub label: &'static str,
    pub value: f64,
    pub effect: Effect,
}

impl FactorInput {
    pub fn new(label: &'static str, value: f64, effect: Effect) -> Self {
        Self {
            label,
            value,
            effect,
        }
    }

    /// Flat increment when the value equals 1.
    pub fn flag(label: &'static str, value: f64, points: f64) -> Self {
        Self::new(label, value, Effect::Flag(points))
    }
}
