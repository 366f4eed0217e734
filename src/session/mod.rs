pub mod error;
pub mod state;
pub mod store;

pub use error::AssessmentError;
pub use state::{check_score, AssessmentState};
pub use store::{SessionEntry, SessionId, SessionStore};
