use super::schema::Config;

/// Largest accepted jitter half-width.
pub const MAX_JITTER_AMPLITUDE: f64 = 0.5;

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Some(weights) = config.weights {
        for (name, value) in [
            ("heart", weights.heart),
            ("kidney", weights.kidney),
            ("diabetes", weights.diabetes),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(format!(
                    "weights.{}: must be a non-negative number, got {}",
                    name, value
                ));
            }
        }
        if weights.total().is_finite() && weights.total() <= 0.0 {
            errors.push("weights: at least one weight must be positive".to_string());
        }
    }

    if let Some(threshold) = config.override_threshold {
        if !(0.0..=1.0).contains(&threshold) {
            errors.push(format!(
                "override_threshold: must be between 0 and 1, got {}",
                threshold
            ));
        }
    }

    if let Some(amplitude) = config.jitter.as_ref().and_then(|j| j.amplitude) {
        if !(0.0..=MAX_JITTER_AMPLITUDE).contains(&amplitude) {
            errors.push(format!(
                "jitter.amplitude: must be between 0 and {}, got {}",
                MAX_JITTER_AMPLITUDE, amplitude
            ));
        }
    }

    if let Some(ref ttl) = config.session_ttl {
        if let Err(e) = humantime::parse_duration(ttl) {
            errors.push(format!("session_ttl: invalid duration '{}' - {}", ttl, e));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::RiskWeights;
    use crate::config::JitterConfig;

    #[test]
    fn test_default_config_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_valid_config() {
        let config = Config {
            weights: Some(RiskWeights {
                heart: 0.4,
                kidney: 0.4,
                diabetes: 0.2,
            }),
            override_threshold: Some(0.8),
            jitter: Some(JitterConfig {
                enabled: Some(true),
                amplitude: Some(0.05),
                seed: None,
            }),
            models: None,
            session_ttl: Some("1h".to_string()),
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_negative_weight() {
        let config = Config {
            weights: Some(RiskWeights {
                heart: -0.5,
                kidney: 0.3,
                diabetes: 0.2,
            }),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("weights.heart"));
        assert!(errors[1].contains("positive"));
    }

    #[test]
    fn test_nan_weight() {
        let config = Config {
            weights: Some(RiskWeights {
                heart: f64::NAN,
                ..RiskWeights::default()
            }),
            ..Config::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_multiple_errors_collected() {
        let config = Config {
            weights: Some(RiskWeights {
                heart: 0.0,
                kidney: 0.0,
                diabetes: 0.0,
            }),
            override_threshold: Some(1.5),
            jitter: Some(JitterConfig {
                enabled: None,
                amplitude: Some(0.9),
                seed: None,
            }),
            models: None,
            session_ttl: Some("whenever".to_string()),
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().any(|e| e.starts_with("override_threshold")));
        assert!(errors.iter().any(|e| e.starts_with("jitter.amplitude")));
        assert!(errors.iter().any(|e| e.starts_with("session_ttl")));
    }
}
