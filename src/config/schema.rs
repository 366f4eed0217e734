use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::aggregate::{RiskWeights, DEFAULT_OVERRIDE_THRESHOLD};
use crate::scoring::{JitterPolicy, DEFAULT_JITTER};

/// Idle time after which an assessment session is discarded.
pub const DEFAULT_SESSION_TTL: &str = "30m";

/// Engine configuration.
///
/// Every field is optional; missing values fall back to the built-in
/// defaults.
///
/// Example YAML:
/// ```yaml
/// weights: { heart: 0.5, kidney: 0.3, diabetes: 0.2 }
/// override_threshold: 0.9
/// jitter: { enabled: true, amplitude: 0.05 }
/// models:
///   kidney: /opt/cardialink/kidney_forest.json
/// session_ttl: "30m"
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Per-disease weights for the composite (default: 0.5 / 0.3 / 0.2)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<RiskWeights>,

    /// Heart or kidney score above this lifts the composite to it (default: 0.9)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jitter: Option<JitterConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelsConfig>,

    /// Humantime duration, e.g. "30m" or "2h"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct JitterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Half-width of the uniform jitter (default: 0.05)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amplitude: Option<f64>,
    /// Fixed seed for reproducible scores
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Paths to statistical model files. Diabetes has no model path.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModelsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kidney: Option<PathBuf>,
}

impl Config {
    pub fn weights(&self) -> RiskWeights {
        self.weights.unwrap_or_default()
    }

    pub fn override_threshold(&self) -> f64 {
        self.override_threshold.unwrap_or(DEFAULT_OVERRIDE_THRESHOLD)
    }

    pub fn jitter_policy(&self) -> JitterPolicy {
        let jitter = self.jitter.clone().unwrap_or_default();
        if !jitter.enabled.unwrap_or(true) {
            return JitterPolicy::disabled();
        }
        JitterPolicy {
            amplitude: jitter.amplitude.unwrap_or(DEFAULT_JITTER),
            seed: jitter.seed,
        }
    }

    pub fn heart_model(&self) -> Option<&PathBuf> {
        self.models.as_ref().and_then(|m| m.heart.as_ref())
    }

    pub fn kidney_model(&self) -> Option<&PathBuf> {
        self.models.as_ref().and_then(|m| m.kidney.as_ref())
    }

    pub fn session_ttl(&self) -> Result<Duration> {
        let raw = self.session_ttl.as_deref().unwrap_or(DEFAULT_SESSION_TTL);
        humantime::parse_duration(raw)
            .with_context(|| format!("Invalid session_ttl '{}'", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_saphyr::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.weights(), RiskWeights::default());
        assert_eq!(config.override_threshold(), 0.9);
        assert_eq!(config.jitter_policy(), JitterPolicy::default());
        assert_eq!(config.session_ttl().unwrap(), Duration::from_secs(1800));
        assert!(config.kidney_model().is_none());
    }

    #[test]
    fn test_full_config_parses() {
        let yaml = r#"
weights:
  heart: 0.6
  kidney: 0.2
  diabetes: 0.2
override_threshold: 0.85
jitter:
  enabled: true
  amplitude: 0.02
  seed: 7
models:
  kidney: /tmp/kidney_forest.json
session_ttl: "2h"
"#;
        let config: Config = serde_saphyr::from_str(yaml).unwrap();
        assert_eq!(config.weights().heart, 0.6);
        assert_eq!(config.override_threshold(), 0.85);
        assert_eq!(config.jitter_policy(), JitterPolicy::seeded(0.02, 7));
        assert_eq!(
            config.kidney_model(),
            Some(&PathBuf::from("/tmp/kidney_forest.json"))
        );
        assert!(config.heart_model().is_none());
        assert_eq!(config.session_ttl().unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_partial_weights_fill_defaults() {
        let config: Config = serde_saphyr::from_str("weights:\n  heart: 0.7\n").unwrap();
        let weights = config.weights();
        assert_eq!(weights.heart, 0.7);
        assert_eq!(weights.kidney, 0.3);
        assert_eq!(weights.diabetes, 0.2);
    }

    #[test]
    fn test_jitter_disabled() {
        let config: Config =
            serde_saphyr::from_str("jitter:\n  enabled: false\n  amplitude: 0.1\n").unwrap();
        assert!(!config.jitter_policy().is_enabled());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let parsed: Result<Config, _> = serde_saphyr::from_str("premium_multiplier: 2\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_diabetes_model_rejected() {
        let parsed: Result<Config, _> =
            serde_saphyr::from_str("models:\n  diabetes: /tmp/d.json\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_bad_ttl() {
        let config = Config {
            session_ttl: Some("soon".to_string()),
            ..Config::default()
        };
        assert!(config.session_ttl().is_err());
    }
}
