use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Duration;

use cardialink::assessment::{AssessmentInput, AssessmentReport, DiseaseScore, RiskEngine};
use cardialink::scoring::{
    parse_assignments, parse_value, DiabetesObservation, Disease, HeartObservation, JitterPolicy,
    KidneyObservation, Observation,
};
use cardialink::session::SessionStore;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;
const EXIT_CONFIG: i32 = 4;
const EXIT_INPUT: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full heart, kidney, diabetes assessment (default if no subcommand)
    Assess {
        /// YAML file with `heart`, `kidney` and `diabetes` observations (skips the prompts)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Score a single disease
    Score {
        /// heart, kidney or diabetes
        disease: Disease,
        /// YAML file with the observation
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Attribute overrides, e.g. age=63 resting_bp=145
        fields: Vec<String>,
    },
    /// Resolve the premium tier for a risk probability
    Premium {
        /// Risk between 0 and 1
        risk: f64,
    },
    /// Create a config file interactively
    Init,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Human,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "cardialink")]
#[command(about = "Disease risk scoring and insurance premium estimation", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging and score breakdowns
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ~/.config/cardialink/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable the random jitter on rule-based scores
    #[arg(long, global = true)]
    no_jitter: bool,

    /// Seed the jitter for reproducible scores
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value = "human")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Read a YAML file into `T`.
fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file at {}", path.display()))?;
    serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse input: invalid YAML in {}", path.display()))
}

/// Build an observation from an optional YAML file plus KEY=VALUE overrides.
/// Unknown keys are an error; unparseable values take the field default.
fn load_observation<O: Observation + DeserializeOwned>(
    input: Option<&Path>,
    fields: &[String],
) -> Result<O> {
    let mut observation: O = match input {
        Some(path) => read_yaml(path)?,
        None => O::default(),
    };

    for pair in fields {
        if !pair.contains('=') {
            anyhow::bail!("Expected KEY=VALUE, got '{}'", pair);
        }
    }

    for (key, raw) in parse_assignments(fields) {
        let spec = O::SCHEMA
            .iter()
            .find(|s| s.name == key)
            .with_context(|| {
                let names: Vec<&str> = O::SCHEMA.iter().map(|s| s.name).collect();
                format!(
                    "Unknown {} field '{}'. Expected one of: {}",
                    O::DISEASE,
                    key,
                    names.join(", ")
                )
            })?;
        let value = parse_value(&raw).unwrap_or_else(|| {
            tracing::warn!(field = spec.name, value = %raw, "not a number, using default");
            spec.default
        });
        observation.set(spec.name, value);
    }

    Ok(observation)
}

fn score_one<O: Observation + DeserializeOwned>(
    engine: &RiskEngine,
    input: Option<&Path>,
    fields: &[String],
) -> Result<DiseaseScore> {
    let observation: O = load_observation(input, fields)?;
    Ok(DiseaseScore {
        disease: O::DISEASE,
        result: engine.score(&observation),
    })
}

/// Walk one session through heart, kidney, diabetes from file input.
fn assess_from_file(
    engine: &RiskEngine,
    store: &SessionStore,
    path: &Path,
) -> Result<AssessmentReport> {
    let input: AssessmentInput = read_yaml(path)?;
    let session = store.create();
    let details = vec![
        engine.submit(store, &session, &input.heart)?,
        engine.submit(store, &session, &input.kidney)?,
        engine.submit(store, &session, &input.diabetes)?,
    ];
    let state = store
        .end(&session)
        .context("Assessment session disappeared before it finished")?;
    Ok(engine.finalize(&state, details)?)
}

fn print_json<T: serde::Serialize>(value: &T) {
    match cardialink::output::format_json(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(EXIT_FAILURE);
        }
    }
}

/// Load and validate config, then build the engine with the CLI jitter overrides.
/// Exits with EXIT_CONFIG on any config problem.
fn build_engine(cli: &Cli) -> (RiskEngine, Duration) {
    // Load config
    let config = match cardialink::config::load_config(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    // Validate config at startup
    if let Err(errors) = cardialink::config::validate_config(&config) {
        eprintln!("Config errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        std::process::exit(EXIT_CONFIG);
    }

    let session_ttl = match config.session_ttl() {
        Ok(ttl) => ttl,
        Err(e) => {
            eprintln!("Config error: {:#}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    let mut engine = RiskEngine::from_config(&config);
    if cli.no_jitter {
        engine = engine.with_jitter(JitterPolicy::disabled());
    } else if let Some(seed) = cli.seed {
        let amplitude = engine.jitter().amplitude;
        engine = engine.with_jitter(JitterPolicy::seeded(amplitude, seed));
    }
    tracing::debug!(?engine, "engine ready");

    (engine, session_ttl)
}

fn main() {
    let mut cli = Cli::parse();
    init_logging(cli.verbose);
    let command = cli.command.take().unwrap_or(Commands::Assess { input: None });
    let use_colors = cli.format == OutputFormat::Human && cardialink::output::should_use_colors();

    match command {
        Commands::Init => {
            if let Err(e) = cardialink::config::init::run_init_wizard(cli.config.clone()) {
                eprintln!("Init failed: {:#}", e);
                std::process::exit(EXIT_FAILURE);
            }
        }
        Commands::Assess { input } => {
            let (engine, session_ttl) = build_engine(&cli);
            let store = SessionStore::with_ttl(session_ttl);

            let report = match input {
                Some(path) => match assess_from_file(&engine, &store, &path) {
                    Ok(r) => r,
                    Err(e) => {
                        eprintln!("Input error: {:#}", e);
                        std::process::exit(EXIT_INPUT);
                    }
                },
                None => {
                    match cardialink::wizard::run_assessment_wizard(&engine, &store, use_colors) {
                        Ok(r) => {
                            println!();
                            r
                        }
                        Err(e) => {
                            eprintln!("Assessment failed: {:#}", e);
                            std::process::exit(EXIT_FAILURE);
                        }
                    }
                }
            };

            match cli.format {
                OutputFormat::Json => print_json(&report),
                OutputFormat::Human => println!(
                    "{}",
                    cardialink::output::format_report(&report, cli.verbose, use_colors)
                ),
            }
        }
        Commands::Score {
            disease,
            input,
            fields,
        } => {
            let (engine, _) = build_engine(&cli);
            let input = input.as_deref();
            let scored = match disease {
                Disease::Heart => score_one::<HeartObservation>(&engine, input, &fields),
                Disease::Kidney => score_one::<KidneyObservation>(&engine, input, &fields),
                Disease::Diabetes => score_one::<DiabetesObservation>(&engine, input, &fields),
            };
            let scored = match scored {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Input error: {:#}", e);
                    std::process::exit(EXIT_INPUT);
                }
            };

            match cli.format {
                OutputFormat::Json => print_json(&scored),
                OutputFormat::Human => println!(
                    "{}",
                    cardialink::output::format_score_result(
                        scored.disease,
                        &scored.result,
                        cli.verbose,
                        use_colors
                    )
                ),
            }
        }
        Commands::Premium { risk } => {
            if !risk.is_finite() || !(0.0..=1.0).contains(&risk) {
                eprintln!("Risk must be between 0 and 1, got {}", risk);
                std::process::exit(EXIT_INPUT);
            }
            let quote = cardialink::premium::resolve_premium(risk);
            match cli.format {
                OutputFormat::Json => print_json(&quote),
                OutputFormat::Human => {
                    println!("{}", cardialink::output::format_quote(&quote, use_colors))
                }
            }
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
