use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::factors::FactorInput;

/// The three diseases assessed, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disease {
    Heart,
    Kidney,
    Diabetes,
}

impl Disease {
    pub const ALL: [Disease; 3] = [Disease::Heart, Disease::Kidney, Disease::Diabetes];

    pub fn index(&self) -> usize {
        match self {
            Disease::Heart => 0,
            Disease::Kidney => 1,
            Disease::Diabetes => 2,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Disease::Heart => "Heart Disease",
            Disease::Kidney => "Kidney Disease",
            Disease::Diabetes => "Diabetes",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Disease::Heart => write!(f, "heart"),
            Disease::Kidney => write!(f, "kidney"),
            Disease::Diabetes => write!(f, "diabetes"),
        }
    }
}

impl FromStr for Disease {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heart" => Ok(Disease::Heart),
            "kidney" => Ok(Disease::Kidney),
            "diabetes" => Ok(Disease::Diabetes),
            other => bail!("Unknown disease '{}': expected heart, kidney or diabetes", other),
        }
    }
}

/// Schema entry for one clinical attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub prompt: &'static str,
    pub default: f64,
}

impl FieldSpec {
    pub const fn new(name: &'static str, prompt: &'static str, default: f64) -> Self {
        Self {
            name,
            prompt,
            default,
        }
    }
}

/// A fixed-schema set of clinical attributes for one disease.
///
/// Every attribute resolves to a finite number before scoring: missing,
/// unparseable or non-finite values take the documented default from
/// [`Observation::SCHEMA`] instead of being rejected.
pub trait Observation: Default + Clone {
    const DISEASE: Disease;
    /// Attribute schema in scoring order.
    const SCHEMA: &'static [FieldSpec];
    /// Divisor applied to the raw additive score.
    const NORMALIZER: f64;

    /// Attribute values in `SCHEMA` order.
    fn values(&self) -> Vec<f64>;

    /// Set an attribute by schema name. Returns false for unknown names.
    fn set(&mut self, name: &str, value: f64) -> bool;

    /// Per-attribute rule contributions.
    fn rule_factors(&self) -> Vec<FactorInput>;

    /// Feature vector for a statistical model, or None when the disease
    /// has no model path.
    fn model_features(&self) -> Option<Vec<f64>> {
        None
    }

    /// Replace every non-finite attribute with its default.
    fn sanitized(mut self) -> Self {
        let values = self.values();
        for (spec, value) in Self::SCHEMA.iter().zip(values) {
            if !value.is_finite() {
                self.set(spec.name, spec.default);
            }
        }
        self
    }

    /// Build an observation from raw string fields, as a form would post them.
    fn from_fields(fields: &HashMap<String, String>) -> Self {
        let mut observation = Self::default();
        for spec in Self::SCHEMA {
            let value = fields
                .get(spec.name)
                .and_then(|raw| parse_value(raw))
                .unwrap_or(spec.default);
            observation.set(spec.name, value);
        }
        observation
    }
}

/// Parse a single raw attribute. None for empty, unparseable or non-finite input.
pub fn parse_value(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse `KEY=VALUE` pairs into a field map. Pairs without `=` are ignored.
pub fn parse_assignments<S: AsRef<str>>(pairs: &[S]) -> HashMap<String, String> {
    pairs
        .iter()
        .filter_map(|pair| pair.as_ref().split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disease_from_str() {
        assert_eq!("heart".parse::<Disease>().unwrap(), Disease::Heart);
        assert_eq!(" Kidney ".parse::<Disease>().unwrap(), Disease::Kidney);
        assert_eq!("DIABETES".parse::<Disease>().unwrap(), Disease::Diabetes);
        assert!("lung".parse::<Disease>().is_err());
    }

    #[test]
    fn test_disease_display_roundtrip() {
        for disease in Disease::ALL {
            assert_eq!(disease.to_string().parse::<Disease>().unwrap(), disease);
        }
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("63"), Some(63.0));
        assert_eq!(parse_value(" 2.3 "), Some(2.3));
        assert_eq!(parse_value(""), None);
        assert_eq!(parse_value("abc"), None);
        assert_eq!(parse_value("NaN"), None);
        assert_eq!(parse_value("inf"), None);
    }

    #[test]
    fn test_parse_assignments() {
        let fields = parse_assignments(&["age=63", "sex = 1", "garbage"]);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields.get("age").map(String::as_str), Some("63"));
        assert_eq!(fields.get("sex").map(String::as_str), Some("1"));
    }
}
