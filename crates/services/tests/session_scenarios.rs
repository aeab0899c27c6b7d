use chrono::Duration;
use quiz_core::time::fixed_clock;
use quiz_core::{
    AccuracyGrader, Answer, BinaryGrader, CustomOptions, Difficulty, Grader, GraderKind,
    GradingResult, LifeMode, Mode, ModeId, Preset, Progression, Question, QuestionType, Rules,
    TimeMode,
};
use services::{QuestionPlan, QuizSession, SessionError, SessionStatus};

fn choice_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| {
            Question::choice(
                format!("Question {i}"),
                vec!["right".into(), "wrong".into(), "also wrong".into()],
                0,
            )
        })
        .collect()
}

fn text_questions(n: usize) -> Vec<Question> {
    (0..n)
        .map(|i| Question::text(format!("Explain {i}"), "ownership", vec!["ownership".into()]))
        .collect()
}

fn session(rules: Rules, questions: Vec<Question>, grader: Box<dyn Grader>) -> QuizSession {
    QuizSession::new(rules, questions, grader)
        .unwrap()
        .with_clock(fixed_clock())
}

#[test]
fn quick_all_correct_completes_with_full_score() {
    let session = session(
        Preset::Quick.rules(Difficulty::Entry),
        choice_questions(3),
        Box::new(BinaryGrader),
    );
    session.begin().unwrap();

    for i in 0..3 {
        let out = session.submit_answer(Answer::Choice(0)).unwrap();
        assert!(out.result.is_correct());
        assert_ne!(out.status, SessionStatus::Failed);
        assert_ne!(out.status, SessionStatus::TimeExpired);
        if i < 2 {
            session.next_question().unwrap();
        }
    }

    assert_eq!(session.status(), SessionStatus::Completed);
    assert_eq!(session.score(), 3);
    assert!(session.time_remaining() > Duration::zero());
    let results = session.results();
    assert_eq!(results.correct, 3);
    assert_eq!(results.incorrect, 0);
    assert_eq!(results.unanswered, 0);
}

#[test]
fn hardcore_first_mistake_fails_immediately() {
    let session = session(
        Preset::Hardcore.rules(Difficulty::Senior),
        choice_questions(10),
        Box::new(BinaryGrader),
    );
    session.begin().unwrap();
    assert_eq!(session.lives_remaining(), 1);

    let out = session.submit_answer(Answer::Choice(2)).unwrap();
    assert_eq!(out.status, SessionStatus::Failed);
    assert_eq!(out.index, 0);
    assert_eq!(session.lives_remaining(), 0);
    assert_eq!(session.current_index(), 0);
    assert_eq!(
        session.submit_answer(Answer::Choice(0)),
        Err(SessionError::NotRunning)
    );

    let results = session.results();
    assert_eq!(results.incorrect, 1);
    assert_eq!(results.unanswered, 9);
}

#[test]
fn rapid_tick_past_limit_expires_session() {
    let session = session(
        Preset::Rapid.rules(Difficulty::Mid),
        choice_questions(5),
        GraderKind::Score.build(),
    );
    session.begin().unwrap();
    assert_eq!(session.time_remaining(), Duration::seconds(40));

    let out = session.tick(Duration::seconds(41));
    assert!(out.expired);
    assert_eq!(out.status, SessionStatus::TimeExpired);
    assert_eq!(session.time_remaining(), Duration::zero());
    assert!(session.is_complete());
}

#[test]
fn quick_total_duration_expires_across_questions() {
    let session = session(
        Preset::Quick.rules(Difficulty::Entry),
        choice_questions(4),
        Box::new(BinaryGrader),
    );
    session.begin().unwrap();
    assert_eq!(session.time_remaining(), Duration::seconds(300));

    session.submit_answer(Answer::Choice(0)).unwrap();
    session.next_question().unwrap();
    assert!(!session.tick(Duration::seconds(200)).expired);
    // One shared countdown: moving on does not refill it.
    assert_eq!(session.time_remaining(), Duration::seconds(100));

    let out = session.tick(Duration::seconds(101));
    assert!(out.expired);
    assert_eq!(out.status, SessionStatus::TimeExpired);
    assert_eq!(session.time_remaining(), Duration::zero());
    assert_eq!(
        session.submit_answer(Answer::Choice(0)),
        Err(SessionError::NotRunning)
    );

    let results = session.results();
    assert_eq!(results.status, SessionStatus::TimeExpired);
    assert_eq!(results.correct, 1);
    assert_eq!(results.unanswered, 3);
}

#[test]
fn quick_single_tick_past_total_expires() {
    let session = session(
        Preset::Quick.rules(Difficulty::Entry),
        choice_questions(2),
        Box::new(BinaryGrader),
    );
    session.begin().unwrap();

    let out = session.tick(Duration::seconds(301));
    assert!(out.expired);
    assert_eq!(out.status, SessionStatus::TimeExpired);
    assert_eq!(session.time_remaining(), Duration::zero());
    assert!(session.is_complete());
}

#[test]
fn standard_navigation_round_trip_has_no_side_effects() {
    let session = session(
        Preset::Standard.rules(Difficulty::Junior),
        text_questions(5),
        Box::new(AccuracyGrader),
    );
    session.begin().unwrap();
    let start = session.current_index();

    for expected in 1..5 {
        assert_eq!(session.next_question(), Ok(expected));
    }
    assert_eq!(session.next_question(), Err(SessionError::InvalidIndex));
    for expected in (0..4).rev() {
        assert_eq!(session.prev_question(), Ok(expected));
    }

    assert_eq!(session.current_index(), start);
    assert_eq!(session.score(), 0);
    assert_eq!(session.lives_remaining(), 0);
    assert_eq!(session.status(), SessionStatus::Running);
    assert_eq!(session.progress().answered, 0);
}

#[test]
fn accuracy_grading_meets_threshold_at_three_of_five() {
    let question = Question::text(
        "Describe the borrow checker",
        "References are checked against lifetimes and ownership at compile time",
        vec![
            "ownership".into(),
            "borrow".into(),
            "lifetime".into(),
            "mutable".into(),
            "alias".into(),
        ],
    );
    let session = session(
        Preset::Standard.rules(Difficulty::Junior),
        vec![question],
        Box::new(AccuracyGrader),
    );
    session.begin().unwrap();

    let out = session
        .submit_answer(Answer::Text(
            "Ownership rules decide who may borrow a value and for which lifetime".into(),
        ))
        .unwrap();

    let GradingResult::Accuracy {
        correct, accuracy, ..
    } = out.result
    else {
        panic!("expected accuracy result, got {:?}", out.result);
    };
    assert!(correct);
    assert!((accuracy - 0.6).abs() < f32::EPSILON);
    assert_eq!(session.score(), 1);
    assert_eq!(session.status(), SessionStatus::Completed);
}

#[test]
fn begin_succeeds_exactly_once() {
    let session = session(
        Preset::Quick.rules(Difficulty::Entry),
        choice_questions(2),
        Box::new(BinaryGrader),
    );
    assert_eq!(session.begin(), Ok(()));
    for _ in 0..3 {
        assert_eq!(session.begin(), Err(SessionError::AlreadyStarted));
    }
    assert_eq!(session.status(), SessionStatus::Running);
}

#[test]
fn resubmitting_the_same_answer_is_idempotent() {
    let session = session(
        Preset::Standard.rules(Difficulty::Entry),
        choice_questions(3),
        GraderKind::Score.build(),
    );
    session.begin().unwrap();

    let first = session.submit_answer(Answer::Choice(0)).unwrap();
    let score = session.score();
    let lives = session.lives_remaining();
    let second = session.submit_answer(Answer::Choice(0)).unwrap();

    assert_eq!(first, second);
    assert_eq!(session.score(), score);
    assert_eq!(session.lives_remaining(), lives);
    assert_eq!(session.answer_at(0), Some(Answer::Choice(0)));
}

#[test]
fn empty_question_list_is_rejected() {
    let err = QuizSession::new(
        Preset::Quick.rules(Difficulty::Entry),
        Vec::new(),
        Box::new(BinaryGrader),
    )
    .unwrap_err();
    assert_eq!(err, SessionError::Empty);
}

#[test]
fn planned_questions_feed_a_session() {
    let rules = Preset::Quick.rules(Difficulty::Entry);
    let mut pool = choice_questions(4);
    pool.extend(text_questions(4));

    let plan = QuestionPlan::build(&rules.questions, pool);
    assert_eq!(plan.len(), 4);
    assert_eq!(plan.filtered_out, 4);

    let session = session(rules, plan.into_questions(), Box::new(BinaryGrader));
    assert_eq!(session.question_count(), 4);
}

// Replays the same answers through a preset and its Custom equivalent.
fn replay(rules: Rules) -> (Vec<SessionStatus>, Vec<Duration>, u32, u32, SessionStatus) {
    let session = session(rules, choice_questions(4), GraderKind::Binary.build());
    session.begin().unwrap();

    let script = [
        (Some(7), Answer::Choice(0)),
        (Some(12), Answer::Choice(0)),
        (None, Answer::Choice(0)),
        (Some(3), Answer::Choice(1)),
    ];
    let mut statuses = Vec::new();
    let mut remaining = Vec::new();
    for (wait, answer) in script {
        if let Some(secs) = wait {
            let _ = session.tick(Duration::seconds(secs));
        }
        remaining.push(session.time_remaining());
        if let Ok(out) = session.submit_answer(answer) {
            statuses.push(out.status);
        }
        remaining.push(session.time_remaining());
    }

    (
        statuses,
        remaining,
        session.score(),
        session.lives_remaining(),
        session.status(),
    )
}

#[test]
fn custom_equivalent_of_hardcore_behaves_identically() {
    let preset = Preset::Hardcore.rules(Difficulty::Entry);
    let options = CustomOptions {
        time_mode: TimeMode::PerQuestionWithBonus,
        per_question_secs: 30,
        bonus_secs: 10,
        life_mode: LifeMode::SuddenDeath,
        progression: Progression::Scaling,
        types: QuestionType::closed_set(),
        randomize: true,
        ..CustomOptions::default()
    };
    let custom = Mode::from_id(ModeId::Custom, options)
        .rules(Difficulty::Entry)
        .unwrap();
    assert!(custom.same_policy(&preset));

    let expected = replay(preset);
    assert_eq!(replay(custom), expected);

    let (statuses, remaining, score, lives, status) = expected;
    assert_eq!(statuses.last(), Some(&SessionStatus::Failed));
    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(score, 3);
    assert_eq!(lives, 0);
    // A correct answer moves on to a fresh per-question timer.
    assert_eq!(remaining[0], Duration::seconds(23));
    assert_eq!(remaining[1], Duration::seconds(30));
}
