use chrono::Duration;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

use quiz_core::{Answer, Clock, Grader, GradingResult, Navigation, Question, Rules, SessionId};

use super::progress::SessionProgress;
use super::results::SessionResults;
use super::state::{SessionState, SubmitOutcome, TickOutcome};
use super::status::SessionStatus;
use crate::error::SessionError;

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt over a fixed list of questions.
///
/// All state sits behind a single `RwLock`: the mutating operations (`begin`,
/// `submit_answer`, `next_question`, `prev_question`, `tick`) hold it
/// exclusively for the transition itself and every accessor takes a shared
/// hold, so the session can be shared across threads through an `Arc`. Nothing
/// under the lock blocks or performs I/O; log events are emitted after the
/// guard is released and grading is pure.
///
/// Countdowns only move when the caller invokes [`QuizSession::tick`], usually
/// from a fixed-interval timer.
pub struct QuizSession {
    id: SessionId,
    rules: Arc<Rules>,
    grader: Box<dyn Grader>,
    clock: Clock,
    state: RwLock<SessionState>,
}

impl QuizSession {
    /// Create a session that has not started yet.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rules` if `rules` do not validate and
    /// `SessionError::Empty` if no questions are provided.
    pub fn new(
        rules: Rules,
        questions: Vec<Question>,
        grader: Box<dyn Grader>,
    ) -> Result<Self, SessionError> {
        let rules = Arc::new(rules);
        let state = SessionState::new(Arc::clone(&rules), questions)?;

        Ok(Self {
            id: SessionId::new(),
            rules,
            grader,
            clock: Clock::system(),
            state: RwLock::new(state),
        })
    }

    /// Use `clock` for start/end timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    // A panic can only poison the lock between complete transitions, so the
    // guarded state is still consistent and safe to keep using.
    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    //
    // ─── OPERATIONS ───────────────────────────────────────────────────────────
    //

    /// Start the session and seed its timer.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyStarted` on any call after the first.
    pub fn begin(&self) -> Result<(), SessionError> {
        let (questions, lives) = {
            let mut state = self.write();
            state.begin(self.clock.now())?;
            (state.question_count(), state.lives_remaining())
        };
        info!(
            session = %self.id,
            questions,
            time_mode = %self.rules.time.control,
            lives,
            "quiz session started"
        );
        Ok(())
    }

    /// Grade `answer` against the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotRunning` before `begin` or after the session ended.
    pub fn submit_answer(&self, answer: Answer) -> Result<SubmitOutcome, SessionError> {
        let (outcome, snapshot) = {
            let mut state = self.write();
            let outcome = state.submit(self.grader.as_ref(), answer, self.clock.now())?;
            (outcome, LogSnapshot::of(&state))
        };
        debug!(
            session = %self.id,
            index = outcome.index,
            correct = outcome.result.is_correct(),
            score = snapshot.score,
            lives = snapshot.lives,
            "answer graded"
        );
        if outcome.status.is_terminal() {
            self.log_finished(snapshot);
        }
        Ok(outcome)
    }

    /// Move to the next question under free navigation; returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning`, `NavigationLocked`, or `InvalidIndex` on the last question.
    pub fn next_question(&self) -> Result<usize, SessionError> {
        let index = self.write().next_question()?;
        debug!(session = %self.id, index, "moved to next question");
        Ok(index)
    }

    /// Move to the previous question under free navigation; returns the new index.
    ///
    /// # Errors
    ///
    /// Returns `NotRunning`, `NavigationLocked`, or `InvalidIndex` on the first question.
    pub fn prev_question(&self) -> Result<usize, SessionError> {
        let index = self.write().prev_question()?;
        debug!(session = %self.id, index, "moved to previous question");
        Ok(index)
    }

    /// Advance the active countdown by `elapsed`.
    pub fn tick(&self, elapsed: Duration) -> TickOutcome {
        let (outcome, snapshot) = {
            let mut state = self.write();
            let outcome = state.tick(elapsed, self.clock.now());
            (outcome, LogSnapshot::of(&state))
        };
        if outcome.expired {
            self.log_finished(snapshot);
        }
        outcome
    }

    fn log_finished(&self, snapshot: LogSnapshot) {
        info!(
            session = %self.id,
            status = %snapshot.status,
            score = snapshot.score,
            lives = snapshot.lives,
            index = snapshot.index,
            "quiz session finished"
        );
    }

    //
    // ─── ACCESSORS ────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn rules(&self) -> Arc<Rules> {
        Arc::clone(&self.rules)
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.read().status()
    }

    #[must_use]
    pub fn has_started(&self) -> bool {
        self.status() != SessionStatus::NotStarted
    }

    /// True once the session reached a terminal state.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status().is_terminal()
    }

    #[must_use]
    pub fn can_navigate_back(&self) -> bool {
        self.rules.navigation() == Navigation::Free
    }

    #[must_use]
    pub fn current_question(&self) -> Question {
        self.read().current_question().clone()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.read().current_index()
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.read().question_count()
    }

    #[must_use]
    pub fn time_remaining(&self) -> Duration {
        self.read().time_remaining()
    }

    #[must_use]
    pub fn lives_remaining(&self) -> u32 {
        self.read().lives_remaining()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.read().score()
    }

    /// False for out-of-range indices.
    #[must_use]
    pub fn is_answered(&self, index: usize) -> bool {
        self.read().is_answered(index)
    }

    #[must_use]
    pub fn answer_at(&self, index: usize) -> Option<Answer> {
        self.read().answer_at(index).cloned()
    }

    #[must_use]
    pub fn grade_at(&self, index: usize) -> Option<GradingResult> {
        self.read().grade_at(index).cloned()
    }

    /// Wall-clock time since `begin`, frozen once the session ends.
    #[must_use]
    pub fn elapsed_time(&self) -> Duration {
        self.read().elapsed(self.clock.now())
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        self.read().progress()
    }

    /// Summary of the attempt so far; final once `is_complete` is true.
    #[must_use]
    pub fn results(&self) -> SessionResults {
        self.read().results(self.clock.now())
    }
}

// Copied out under the lock so events are emitted after the guard drops.
#[derive(Clone, Copy)]
struct LogSnapshot {
    status: SessionStatus,
    score: u32,
    lives: u32,
    index: usize,
}

impl LogSnapshot {
    fn of(state: &SessionState) -> Self {
        Self {
            status: state.status(),
            score: state.score(),
            lives: state.lives_remaining(),
            index: state.current_index(),
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("QuizSession")
            .field("id", &self.id)
            .field("grader", &self.grader.kind())
            .field("status", &state.status())
            .field("current", &state.current_index())
            .field("questions_len", &state.question_count())
            .field("score", &state.score())
            .field("lives", &state.lives_remaining())
            .field("started_at", &state.started_at())
            .field("ended_at", &state.ended_at())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
