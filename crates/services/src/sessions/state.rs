use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use quiz_core::{Answer, Grader, GradingResult, Navigation, Question, Rules, TimeMode};

use super::progress::SessionProgress;
use super::results::{AnswerRecord, SessionResults};
use super::status::SessionStatus;
use crate::error::SessionError;

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// Position of the question that was graded.
    pub index: usize,
    pub result: GradingResult,
    pub status: SessionStatus,
    /// Position after any automatic advance.
    pub current_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    /// True only for the tick that ran the clock out.
    pub expired: bool,
    pub status: SessionStatus,
}

//
// ─── SLOT ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Default)]
struct Slot {
    answer: Option<Answer>,
    result: Option<GradingResult>,
    // Score and penalties apply at most once per position, so resubmitting
    // before advancing only replaces the stored answer and result.
    credited: bool,
    penalized: bool,
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Unsynchronized session state; every transition takes the current time as
/// an argument so it stays deterministic. `QuizSession` wraps it in a lock.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    rules: Arc<Rules>,
    questions: Vec<Question>,
    slots: Vec<Slot>,
    current: usize,
    score: u32,
    lives: u32,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    time_remaining: Duration,
    status: SessionStatus,
}

impl SessionState {
    pub(crate) fn new(rules: Arc<Rules>, questions: Vec<Question>) -> Result<Self, SessionError> {
        rules.validate()?;
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            slots: vec![Slot::default(); questions.len()],
            lives: rules.lives.starting,
            rules,
            questions,
            current: 0,
            score: 0,
            started_at: None,
            ended_at: None,
            time_remaining: Duration::zero(),
            status: SessionStatus::NotStarted,
        })
    }

    pub(crate) fn begin(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.status != SessionStatus::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }

        self.status = SessionStatus::Running;
        self.started_at = Some(now);
        self.time_remaining = match self.rules.time.control {
            TimeMode::Unlimited => Duration::zero(),
            TimeMode::TotalDuration => self.rules.time.total_duration,
            TimeMode::PerQuestion | TimeMode::PerQuestionWithBonus => self.rules.time.per_question,
        };
        Ok(())
    }

    pub(crate) fn submit(
        &mut self,
        grader: &dyn Grader,
        answer: Answer,
        now: DateTime<Utc>,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.status != SessionStatus::Running {
            return Err(SessionError::NotRunning);
        }

        let index = self.current;
        let question = self.questions.get(index).ok_or(SessionError::InvalidIndex)?;
        let result = grader.grade(question, &answer);
        let correct = result.is_correct();

        let slot = self.slots.get_mut(index).ok_or(SessionError::InvalidIndex)?;
        slot.answer = Some(answer);
        slot.result = Some(result.clone());
        let credit = correct && !slot.credited;
        let penalize = !correct && !slot.penalized;
        slot.credited |= credit;
        slot.penalized |= penalize;

        if credit {
            self.score = self.score.saturating_add(result.award());
            self.apply_time_bonus();
        }
        if penalize {
            if self.rules.lives.enabled && self.rules.lives.lose_on_wrong {
                self.lives = self.lives.saturating_sub(1);
            }
            self.apply_time_penalty();
        }

        if !self.check_game_over(now) && self.rules.navigation() == Navigation::Locked {
            self.advance();
        }

        Ok(SubmitOutcome {
            index,
            result,
            status: self.status,
            current_index: self.current,
        })
    }

    pub(crate) fn next_question(&mut self) -> Result<usize, SessionError> {
        self.ensure_free_navigation()?;
        if self.current + 1 >= self.questions.len() {
            return Err(SessionError::InvalidIndex);
        }
        self.current += 1;
        Ok(self.current)
    }

    pub(crate) fn prev_question(&mut self) -> Result<usize, SessionError> {
        self.ensure_free_navigation()?;
        if self.current == 0 {
            return Err(SessionError::InvalidIndex);
        }
        self.current -= 1;
        Ok(self.current)
    }

    pub(crate) fn tick(&mut self, elapsed: Duration, now: DateTime<Utc>) -> TickOutcome {
        if self.status != SessionStatus::Running || self.rules.time.control == TimeMode::Unlimited
        {
            return TickOutcome {
                expired: false,
                status: self.status,
            };
        }

        let elapsed = elapsed.max(Duration::zero());
        self.time_remaining = self
            .time_remaining
            .checked_sub(&elapsed)
            .unwrap_or_else(Duration::zero);

        if self.time_remaining <= Duration::zero() {
            self.time_remaining = Duration::zero();
            self.finish(SessionStatus::TimeExpired, now);
            return TickOutcome {
                expired: true,
                status: self.status,
            };
        }

        TickOutcome {
            expired: false,
            status: self.status,
        }
    }

    //
    // ─── TRANSITION HELPERS ───────────────────────────────────────────────────
    //

    fn ensure_free_navigation(&self) -> Result<(), SessionError> {
        if self.status != SessionStatus::Running {
            return Err(SessionError::NotRunning);
        }
        if self.rules.navigation() != Navigation::Free {
            return Err(SessionError::NavigationLocked);
        }
        Ok(())
    }

    fn check_game_over(&mut self, now: DateTime<Utc>) -> bool {
        if self.rules.lives.enabled && self.lives == 0 {
            self.finish(SessionStatus::Failed, now);
            return true;
        }

        if self.is_last_question() && self.is_answered(self.current) {
            self.finish(SessionStatus::Completed, now);
            return true;
        }

        false
    }

    fn finish(&mut self, status: SessionStatus, now: DateTime<Utc>) {
        self.status = status;
        self.ended_at = Some(now);
    }

    fn advance(&mut self) {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.reset_question_timer();
        }
    }

    fn reset_question_timer(&mut self) {
        if self.rules.time.control.is_per_question() {
            self.time_remaining = self.rules.time.per_question;
        }
    }

    fn apply_time_bonus(&mut self) {
        if self.rules.time.control != TimeMode::PerQuestionWithBonus {
            return;
        }
        self.time_remaining = self
            .time_remaining
            .checked_add(&self.rules.time.bonus)
            .unwrap_or(self.time_remaining);
    }

    fn apply_time_penalty(&mut self) {
        if self.rules.time.control != TimeMode::PerQuestionWithBonus {
            return;
        }
        self.time_remaining = self
            .time_remaining
            .checked_sub(&self.rules.time.penalty)
            .unwrap_or_else(Duration::zero)
            .max(Duration::zero());
    }

    fn is_last_question(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    //
    // ─── ACCESSORS ────────────────────────────────────────────────────────────
    //

    pub(crate) fn status(&self) -> SessionStatus {
        self.status
    }

    pub(crate) fn current_index(&self) -> usize {
        self.current
    }

    pub(crate) fn current_question(&self) -> &Question {
        // `new` rejects empty question lists and `current` never leaves bounds.
        &self.questions[self.current]
    }

    pub(crate) fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub(crate) fn time_remaining(&self) -> Duration {
        self.time_remaining
    }

    pub(crate) fn lives_remaining(&self) -> u32 {
        self.lives
    }

    pub(crate) fn score(&self) -> u32 {
        self.score
    }

    pub(crate) fn is_answered(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|slot| slot.answer.is_some())
    }

    pub(crate) fn answer_at(&self, index: usize) -> Option<&Answer> {
        self.slots.get(index).and_then(|slot| slot.answer.as_ref())
    }

    pub(crate) fn grade_at(&self, index: usize) -> Option<&GradingResult> {
        self.slots.get(index).and_then(|slot| slot.result.as_ref())
    }

    pub(crate) fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub(crate) fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Time since `begin`; frozen at the end stamp once terminal.
    pub(crate) fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        let Some(started) = self.started_at else {
            return Duration::zero();
        };
        let end = self.ended_at.unwrap_or(now);
        (end - started).max(Duration::zero())
    }

    pub(crate) fn progress(&self) -> SessionProgress {
        let answered = self.slots.iter().filter(|s| s.answer.is_some()).count();
        SessionProgress {
            total: self.questions.len(),
            answered,
            remaining: self.questions.len() - answered,
            current: self.current,
            is_complete: self.status.is_terminal(),
        }
    }

    pub(crate) fn results(&self, now: DateTime<Utc>) -> SessionResults {
        let records = self
            .slots
            .iter()
            .map(|slot| AnswerRecord {
                answer: slot.answer.clone(),
                result: slot.result.clone(),
            })
            .collect();
        SessionResults::from_records(records, self.score, self.elapsed(now), self.status)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
