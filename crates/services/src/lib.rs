#![forbid(unsafe_code)]

pub mod error;
pub mod sessions;

pub use quiz_core::Clock;

pub use error::SessionError;

pub use sessions::{
    AnswerRecord, QuestionPlan, QuizSession, SessionProgress, SessionResults, SessionStatus,
    SubmitOutcome, TickOutcome,
};
