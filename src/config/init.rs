use anyhow::Result;
use std::path::PathBuf;

use crate::aggregate::{RiskWeights, DEFAULT_OVERRIDE_THRESHOLD};
use crate::config::{
    get_config_path, save_config, Config, JitterConfig, ModelsConfig, DEFAULT_SESSION_TTL,
    MAX_JITTER_AMPLITUDE,
};
use crate::scoring::DEFAULT_JITTER;
use crate::wizard::prompt::{
    prompt, prompt_number, prompt_with_default, prompt_yes_no, typewriter,
};

fn non_negative(v: f64) -> Result<(), String> {
    if v < 0.0 {
        Err("must be non-negative".to_string())
    } else {
        Ok(())
    }
}

fn unit_interval(v: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err("must be between 0 and 1".to_string())
    }
}

fn prompt_model_path(disease: &str) -> Result<Option<PathBuf>> {
    loop {
        let input = prompt(&format!("  {} model file (JSON, empty for none): ", disease))?;
        if input.is_empty() {
            return Ok(None);
        }
        let path = PathBuf::from(&input);
        if path.exists() {
            return Ok(Some(path));
        }
        println!("  No file at {}. Try again.", path.display());
    }
}

/// Run the interactive init wizard to create a config file.
///
/// If `default_path` is Some, uses that as the config file path.
/// Otherwise, prompts the user with the default config path.
pub fn run_init_wizard(default_path: Option<PathBuf>) -> Result<()> {
    println!();
    typewriter("CardiaLink Configuration Wizard");
    println!("===============================");
    println!();

    // 1. Weights
    let defaults = RiskWeights::default();
    typewriter("The composite risk is a weighted mean of the heart, kidney and diabetes scores.");
    let custom_weights = prompt_yes_no("Customize weights? (n keeps 0.5 / 0.3 / 0.2)", false)?;
    let weights = if custom_weights {
        loop {
            let heart = prompt_number("  Heart weight", defaults.heart, non_negative)?;
            let kidney = prompt_number("  Kidney weight", defaults.kidney, non_negative)?;
            let diabetes = prompt_number("  Diabetes weight", defaults.diabetes, non_negative)?;
            let weights = RiskWeights {
                heart,
                kidney,
                diabetes,
            };
            if weights.total() > 0.0 {
                break Some(weights);
            }
            println!("  Invalid: at least one weight must be positive. Try again.");
        }
    } else {
        None
    };

    // 2. Override
    println!();
    typewriter("A heart or kidney score above the override threshold lifts the composite to at least that threshold.");
    let threshold = prompt_number(
        "Override threshold",
        DEFAULT_OVERRIDE_THRESHOLD,
        unit_interval,
    )?;
    let override_threshold = if threshold == DEFAULT_OVERRIDE_THRESHOLD {
        None
    } else {
        Some(threshold)
    };

    // 3. Jitter
    println!();
    typewriter("Rule-based scores get a small random jitter. Disable it, or fix a seed, for reproducible results.");
    let jitter = if prompt_yes_no("Enable jitter?", true)? {
        let amplitude = prompt_number("  Jitter amplitude", DEFAULT_JITTER, |v| {
            if (0.0..=MAX_JITTER_AMPLITUDE).contains(&v) {
                Ok(())
            } else {
                Err(format!("must be between 0 and {}", MAX_JITTER_AMPLITUDE))
            }
        })?;
        let seed = loop {
            let input = prompt("  Fixed seed (empty for random): ")?;
            if input.is_empty() {
                break None;
            }
            match input.parse::<u64>() {
                Ok(seed) => break Some(seed),
                Err(_) => println!("  Invalid: must be a whole number. Try again."),
            }
        };
        if amplitude == DEFAULT_JITTER && seed.is_none() {
            None
        } else {
            Some(JitterConfig {
                enabled: Some(true),
                amplitude: Some(amplitude),
                seed,
            })
        }
    } else {
        Some(JitterConfig {
            enabled: Some(false),
            amplitude: None,
            seed: None,
        })
    };

    // 4. Models
    println!();
    typewriter("Heart and kidney scores can come from a decision-forest model file instead of the clinical rules.");
    let models = if prompt_yes_no("Configure model files?", false)? {
        let heart = prompt_model_path("Heart")?;
        let kidney = prompt_model_path("Kidney")?;
        if heart.is_none() && kidney.is_none() {
            None
        } else {
            Some(ModelsConfig { heart, kidney })
        }
    } else {
        None
    };

    // 5. Session TTL
    println!();
    let session_ttl = loop {
        let input = prompt_with_default("Session idle timeout", DEFAULT_SESSION_TTL)?;
        match humantime::parse_duration(&input) {
            Ok(_) if input == DEFAULT_SESSION_TTL => break None,
            Ok(_) => break Some(input),
            Err(e) => println!("  Invalid: {}. Try again.", e),
        }
    };

    // 6. Config path
    let default_config_path = match default_path {
        Some(p) => p,
        None => get_config_path()?,
    };
    println!();
    let path_str = prompt_with_default(
        "Where should the config be saved?",
        &default_config_path.display().to_string(),
    )?;
    let config_path = PathBuf::from(&path_str);

    if config_path.exists() {
        let overwrite = prompt_yes_no(
            &format!(
                "Config already exists at {}. Overwrite?",
                config_path.display()
            ),
            false,
        )?;
        if !overwrite {
            println!("Aborted.");
            return Ok(());
        }
    }

    // 7. Write config
    let config = Config {
        weights,
        override_threshold,
        jitter,
        models,
        session_ttl,
    };
    save_config(&config_path, &config)?;

    println!();
    println!("Config written to {}", config_path.display());
    println!("Run `cardialink assess` to get started.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_checks() {
        assert!(non_negative(0.0).is_ok());
        assert!(non_negative(-0.1).is_err());
        assert!(unit_interval(0.9).is_ok());
        assert!(unit_interval(1.2).is_err());
    }
}
