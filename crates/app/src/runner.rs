use chrono::Duration;
use std::fmt::Write as _;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::{self, Instant, MissedTickBehavior};

use quiz_core::{Answer, GradingResult, Question, QuestionKind, TimeMode};
use services::{QuizSession, SessionError, SessionResults, SessionStatus, SubmitOutcome};

/// How often the countdown is advanced while waiting for input.
pub const TICK_INTERVAL: std::time::Duration = std::time::Duration::from_secs(1);

const HELP: &str = "\
Commands:
  :next, :n   go to the next question (free navigation only)
  :prev, :p   go back one question (free navigation only)
  :quit, :q   stop and show results
  :help, :h   show this help
";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("please enter an answer")]
    Empty,
    #[error("{raw:?} is not an option number")]
    NotANumber { raw: String },
    #[error("choose a number between 1 and {max}")]
    OutOfRange { max: usize },
    #[error("answer yes or no")]
    NotABool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Answer(Answer),
    Next,
    Prev,
    Quit,
    Help,
}

pub fn parse_input(question: &Question, line: &str) -> Result<Command, InputError> {
    match line.trim() {
        ":next" | ":n" => Ok(Command::Next),
        ":prev" | ":p" => Ok(Command::Prev),
        ":quit" | ":q" => Ok(Command::Quit),
        ":help" | ":h" => Ok(Command::Help),
        other => parse_answer(question, other).map(Command::Answer),
    }
}

/// Parse a typed answer for `question`. Options are numbered from 1.
pub fn parse_answer(question: &Question, raw: &str) -> Result<Answer, InputError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(InputError::Empty);
    }

    match question.kind() {
        QuestionKind::Choice { options, .. } => {
            parse_option(raw, options.len()).map(Answer::Choice)
        }
        QuestionKind::MultiChoice { options, .. } => raw
            .split(',')
            .map(|part| parse_option(part.trim(), options.len()))
            .collect::<Result<Vec<_>, _>>()
            .map(Answer::MultiChoice),
        QuestionKind::Bool { .. } => match raw.to_ascii_lowercase().as_str() {
            "y" | "yes" | "t" | "true" => Ok(Answer::Bool(true)),
            "n" | "no" | "f" | "false" => Ok(Answer::Bool(false)),
            _ => Err(InputError::NotABool),
        },
        QuestionKind::Text { .. } => Ok(Answer::Text(raw.to_string())),
    }
}

fn parse_option(raw: &str, len: usize) -> Result<usize, InputError> {
    let n: usize = raw.parse().map_err(|_| InputError::NotANumber {
        raw: raw.to_string(),
    })?;
    if n == 0 || n > len {
        return Err(InputError::OutOfRange { max: len });
    }
    Ok(n - 1)
}

//
// ─── RENDERING ─────────────────────────────────────────────────────────────────
//

fn clock_text(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[must_use]
pub fn render_question(session: &QuizSession) -> String {
    let question = session.current_question();
    let rules = session.rules();
    let mut text = format!(
        "\n[{}/{}] {}\n",
        session.current_index() + 1,
        session.question_count(),
        question.prompt()
    );

    for (i, option) in question.options().iter().enumerate() {
        let _ = writeln!(text, "  {}) {option}", i + 1);
    }
    let hint = match question.kind() {
        QuestionKind::Choice { .. } => "option number",
        QuestionKind::MultiChoice { .. } => "option numbers, comma separated",
        QuestionKind::Bool { .. } => "y/n",
        QuestionKind::Text { .. } => "free text",
    };
    let _ = write!(text, "({hint})");

    if rules.time.control != TimeMode::Unlimited {
        let _ = write!(text, "  time {}", clock_text(session.time_remaining()));
    }
    if rules.lives.enabled {
        let _ = write!(text, "  lives {}", session.lives_remaining());
    }
    if session.is_answered(session.current_index()) {
        text.push_str("  [answered]");
    }
    text.push_str("\n> ");
    text
}

#[must_use]
pub fn render_grade(result: &GradingResult) -> String {
    match result {
        GradingResult::Binary { correct } => {
            if *correct {
                "Correct!\n".to_string()
            } else {
                "Incorrect.\n".to_string()
            }
        }
        GradingResult::Accuracy {
            correct,
            accuracy,
            feedback,
        } => {
            let verdict = if *correct { "Correct" } else { "Incorrect" };
            let mut text = format!("{verdict} ({:.0}%)", accuracy * 100.0);
            if !feedback.is_empty() {
                let _ = write!(text, ": {feedback}");
            }
            text.push('\n');
            text
        }
        GradingResult::Points { earned, max, .. } => format!("+{earned} of {max} points\n"),
        GradingResult::Practice {
            correct_answer,
            explanation,
        } => format!("Answer: {correct_answer}\n{explanation}\n"),
    }
}

#[must_use]
pub fn render_results(results: &SessionResults) -> String {
    let headline = match results.status {
        SessionStatus::Completed => "Quiz complete",
        SessionStatus::Failed => "Out of lives",
        SessionStatus::TimeExpired => "Out of time",
        SessionStatus::NotStarted | SessionStatus::Running => "Quiz stopped",
    };

    let mut text = format!("\n{headline}\n");
    let _ = writeln!(text, "Score:      {}", results.score);
    let _ = writeln!(
        text,
        "Correct:    {} / {} ({:.0}%)",
        results.correct,
        results.total_questions,
        results.success_rate() * 100.0
    );
    let _ = writeln!(text, "Incorrect:  {}", results.incorrect);
    let _ = writeln!(text, "Unanswered: {}", results.unanswered);
    let _ = writeln!(text, "Time:       {}", clock_text(results.time_taken));

    for (i, record) in results.records.iter().enumerate() {
        let mark = match (&record.result, record.is_correct()) {
            (None, _) => "skipped",
            (Some(_), true) => "correct",
            (Some(_), false) => "wrong",
        };
        let _ = write!(text, "  {:>2}. {mark}", i + 1);
        if let Some(answer) = &record.answer {
            let _ = write!(text, " ({answer})");
        }
        text.push('\n');
    }
    text
}

//
// ─── LOOP ──────────────────────────────────────────────────────────────────────
//

async fn emit<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> io::Result<()> {
    out.write_all(text.as_bytes()).await?;
    out.flush().await
}

/// Drive a started session from line-based input until it ends, the input
/// closes or the player quits.
///
/// The countdown advances once per [`TICK_INTERVAL`] for timed modes.
///
/// # Errors
///
/// Returns I/O errors from reading `input` or writing `out`.
pub async fn run<R, W>(session: &QuizSession, input: R, out: &mut W) -> io::Result<SessionResults>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut ticker = time::interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let timed = session.rules().time.control != TimeMode::Unlimited;
    let step = Duration::from_std(TICK_INTERVAL).unwrap_or_else(|_| Duration::seconds(1));

    emit(out, &render_question(session)).await?;

    while !session.is_complete() {
        tokio::select! {
            _ = ticker.tick(), if timed => {
                if session.tick(step).expired {
                    emit(out, "\nTime is up.\n").await?;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if !handle_line(session, &line, out).await? {
                    break;
                }
            }
        }
    }

    Ok(session.results())
}

// Returns false when the player asked to stop.
async fn handle_line<W: AsyncWrite + Unpin>(
    session: &QuizSession,
    line: &str,
    out: &mut W,
) -> io::Result<bool> {
    let question = session.current_question();
    let command = match parse_input(&question, line) {
        Ok(command) => command,
        Err(err) => {
            tracing::debug!(%err, "rejected input");
            emit(out, &format!("{err}\n> ")).await?;
            return Ok(true);
        }
    };

    match command {
        Command::Answer(answer) => match session.submit_answer(answer) {
            Ok(outcome) => {
                emit(out, &render_grade(&outcome.result)).await?;
                if outcome.status.is_terminal() {
                    return Ok(true);
                }
                move_past_answered(session, &outcome);
                emit(out, &render_question(session)).await?;
            }
            Err(err) => emit(out, &format!("{err}\n")).await?,
        },
        Command::Next => navigate(session, session.next_question(), out).await?,
        Command::Prev => navigate(session, session.prev_question(), out).await?,
        Command::Help => emit(out, &format!("{HELP}> ")).await?,
        Command::Quit => return Ok(false),
    }
    Ok(true)
}

/// Free navigation stays put after an answer; move on for the player.
/// Returns whether the session moved.
fn move_past_answered(session: &QuizSession, outcome: &SubmitOutcome) -> bool {
    if outcome.current_index != outcome.index {
        return false;
    }
    match session.next_question() {
        Ok(_) => true,
        Err(err) => {
            tracing::debug!(%err, index = outcome.index, "staying on answered question");
            false
        }
    }
}

async fn navigate<W: AsyncWrite + Unpin>(
    session: &QuizSession,
    moved: Result<usize, SessionError>,
    out: &mut W,
) -> io::Result<()> {
    match moved {
        Ok(_) => emit(out, &render_question(session)).await,
        Err(err) => emit(out, &format!("{err}\n> ")).await,
    }
}
