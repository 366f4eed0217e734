pub mod assess;
pub mod prompt;

pub use assess::{collect_observation, run_assessment_wizard};
