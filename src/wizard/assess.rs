use anyhow::{Context, Result};

use crate::assessment::{AssessmentReport, DiseaseScore, RiskEngine};
use crate::output::format_score_line;
use crate::scoring::{
    parse_value, DiabetesObservation, FieldSpec, HeartObservation, KidneyObservation, Observation,
};
use crate::session::SessionStore;

use super::prompt::{format_default, prompt_with_default, typewriter};

/// Resolve one answer: empty takes the default, anything unparseable too.
fn resolve_answer(spec: &FieldSpec, answer: &str) -> (f64, bool) {
    match parse_value(answer) {
        Some(v) => (v, true),
        None => (spec.default, false),
    }
}

/// Ask for every attribute in the observation's schema.
pub fn collect_observation<O: Observation>() -> Result<O> {
    let mut observation = O::default();
    for spec in O::SCHEMA {
        let answer = prompt_with_default(spec.prompt, &format_default(spec.default))?;
        let (value, parsed) = resolve_answer(spec, &answer);
        if !parsed {
            println!("  Not a number, using {}.", format_default(spec.default));
        }
        observation.set(spec.name, value);
    }
    Ok(observation)
}

fn step<O: Observation>(
    engine: &RiskEngine,
    store: &SessionStore,
    session: &str,
    use_colors: bool,
) -> Result<DiseaseScore> {
    println!();
    typewriter(&format!("{} assessment", O::DISEASE.title()));
    println!("Press Enter to accept the value in brackets.");
    let observation: O = collect_observation()?;
    let detail = engine
        .submit(store, session, &observation)
        .context("Failed to record score")?;
    println!();
    println!("{}", format_score_line(detail.disease, &detail.result, use_colors));
    Ok(detail)
}

/// Run the heart, kidney, diabetes wizard in one session and produce the report.
pub fn run_assessment_wizard(
    engine: &RiskEngine,
    store: &SessionStore,
    use_colors: bool,
) -> Result<AssessmentReport> {
    let session = store.create();

    let details = vec![
        step::<HeartObservation>(engine, store, &session, use_colors)?,
        step::<KidneyObservation>(engine, store, &session, use_colors)?,
        step::<DiabetesObservation>(engine, store, &session, use_colors)?,
    ];

    let state = store
        .end(&session)
        .context("Assessment session disappeared before it finished")?;
    let report = engine.finalize(&state, details)?;
    Ok(report)
}
