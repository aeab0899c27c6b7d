use chrono::Duration;

use quiz_core::{Answer, GradingResult};

use super::status::SessionStatus;

/// What happened at one question position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerRecord {
    pub answer: Option<Answer>,
    pub result: Option<GradingResult>,
}

impl AnswerRecord {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.result.as_ref().is_some_and(GradingResult::is_correct)
    }
}

/// End-of-session summary for display.
///
/// `correct + incorrect + unanswered == total_questions`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionResults {
    pub total_questions: usize,
    pub correct: usize,
    /// Graded and wrong.
    pub incorrect: usize,
    pub unanswered: usize,
    pub score: u32,
    pub time_taken: Duration,
    pub status: SessionStatus,
    pub records: Vec<AnswerRecord>,
}

impl SessionResults {
    #[must_use]
    pub fn from_records(
        records: Vec<AnswerRecord>,
        score: u32,
        time_taken: Duration,
        status: SessionStatus,
    ) -> Self {
        let correct = records.iter().filter(|r| r.is_correct()).count();
        let unanswered = records.iter().filter(|r| r.result.is_none()).count();
        let total_questions = records.len();

        Self {
            total_questions,
            correct,
            incorrect: total_questions - correct - unanswered,
            unanswered,
            score,
            time_taken,
            status,
            records,
        }
    }

    /// Share of questions answered correctly, in `0.0..=1.0`.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total_questions as f64
    }
}
