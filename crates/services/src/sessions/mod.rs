mod plan;
mod progress;
mod results;
mod service;
mod state;
mod status;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::QuestionPlan;
pub use progress::SessionProgress;
pub use results::{AnswerRecord, SessionResults};
pub use service::QuizSession;
pub use state::{SubmitOutcome, TickOutcome};
pub use status::SessionStatus;
