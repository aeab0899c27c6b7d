use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::{Answer, Question, QuestionKind};
use crate::presets::ModeId;

/// Share of keywords a free-text answer must mention to count as correct.
pub const KEYWORD_THRESHOLD_PERCENT: usize = 60;

/// Points awarded by `ScoreGrader::default()`.
pub const DEFAULT_BASE_POINTS: u32 = 10;

const PRACTICE_EXPLANATION: &str = "No explanation is available for this question yet.";

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Outcome of grading one answer, shaped by the policy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum GradingResult {
    Binary {
        correct: bool,
    },
    Accuracy {
        correct: bool,
        /// Fraction in `0.0..=1.0`.
        accuracy: f32,
        feedback: String,
    },
    Points {
        correct: bool,
        earned: u32,
        max: u32,
        multiplier: f32,
    },
    Practice {
        correct_answer: String,
        explanation: String,
    },
}

impl GradingResult {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        match self {
            GradingResult::Binary { correct }
            | GradingResult::Accuracy { correct, .. }
            | GradingResult::Points { correct, .. } => *correct,
            GradingResult::Practice { .. } => true,
        }
    }

    /// Score credit for this result: earned points for point results, one per
    /// correct answer otherwise.
    #[must_use]
    pub fn award(&self) -> u32 {
        match self {
            GradingResult::Points { earned, .. } => *earned,
            _ => u32::from(self.is_correct()),
        }
    }
}

//
// ─── POLICY ────────────────────────────────────────────────────────────────────
//

/// Strategy comparing a submitted answer with a question's canonical answer.
///
/// Implementations must never fail: an answer whose type does not match the
/// question grades as incorrect.
pub trait Grader: Send + Sync + fmt::Debug {
    fn kind(&self) -> GraderKind;

    fn grade(&self, question: &Question, answer: &Answer) -> GradingResult;
}

/// Configuration name of a grading policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraderKind {
    Binary,
    Accuracy,
    Score,
    Practice,
}

impl GraderKind {
    /// The grader a mode uses unless the caller picks another one.
    #[must_use]
    pub fn for_mode(mode: ModeId) -> Self {
        match mode {
            ModeId::Standard => GraderKind::Accuracy,
            ModeId::Rapid => GraderKind::Score,
            ModeId::Quick | ModeId::Hardcore | ModeId::Custom => GraderKind::Binary,
        }
    }

    #[must_use]
    pub fn build(self) -> Box<dyn Grader> {
        match self {
            GraderKind::Binary => Box::new(BinaryGrader),
            GraderKind::Accuracy => Box::new(AccuracyGrader),
            GraderKind::Score => Box::new(ScoreGrader::default()),
            GraderKind::Practice => Box::new(PracticeGrader),
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GraderKind::Binary => "binary",
            GraderKind::Accuracy => "accuracy",
            GraderKind::Score => "score",
            GraderKind::Practice => "practice",
        }
    }
}

impl fmt::Display for GraderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraderKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "binary" => Ok(GraderKind::Binary),
            "accuracy" => Ok(GraderKind::Accuracy),
            "score" => Ok(GraderKind::Score),
            "practice" => Ok(GraderKind::Practice),
            _ => Err(ParseError::new("grader", s)),
        }
    }
}

/// Exact match; multi-choice compares index sets.
fn exact_match(question: &Question, answer: &Answer) -> bool {
    match (question.kind(), answer) {
        (QuestionKind::Choice { correct, .. }, Answer::Choice(selected)) => selected == correct,
        (QuestionKind::MultiChoice { correct, .. }, Answer::MultiChoice(selected)) => {
            let expected: BTreeSet<usize> = correct.iter().copied().collect();
            let submitted: BTreeSet<usize> = selected.iter().copied().collect();
            expected == submitted
        }
        (QuestionKind::Bool { correct }, Answer::Bool(value)) => value == correct,
        (QuestionKind::Text { expected, .. }, Answer::Text(text)) => text == expected,
        _ => false,
    }
}

//
// ─── BINARY ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryGrader;

impl Grader for BinaryGrader {
    fn kind(&self) -> GraderKind {
        GraderKind::Binary
    }

    fn grade(&self, question: &Question, answer: &Answer) -> GradingResult {
        GradingResult::Binary {
            correct: exact_match(question, answer),
        }
    }
}

//
// ─── ACCURACY ──────────────────────────────────────────────────────────────────
//

/// Partial credit for free text by keyword coverage; exact match for the rest.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccuracyGrader;

impl Grader for AccuracyGrader {
    fn kind(&self) -> GraderKind {
        GraderKind::Accuracy
    }

    fn grade(&self, question: &Question, answer: &Answer) -> GradingResult {
        let QuestionKind::Text { keywords, .. } = question.kind() else {
            let correct = exact_match(question, answer);
            return GradingResult::Accuracy {
                correct,
                accuracy: if correct { 1.0 } else { 0.0 },
                feedback: String::new(),
            };
        };

        let Answer::Text(text) = answer else {
            return GradingResult::Accuracy {
                correct: false,
                accuracy: 0.0,
                feedback: "Expected a written answer".to_string(),
            };
        };

        grade_keywords(keywords, text)
    }
}

fn grade_keywords(keywords: &[String], text: &str) -> GradingResult {
    if keywords.is_empty() {
        return GradingResult::Accuracy {
            correct: false,
            accuracy: 0.0,
            feedback: "No key concepts are configured for this question".to_string(),
        };
    }

    let haystack = text.to_lowercase();
    let missing: Vec<&str> = keywords
        .iter()
        .filter(|keyword| !haystack.contains(&keyword.to_lowercase()))
        .map(String::as_str)
        .collect();
    let found = keywords.len() - missing.len();

    // Integer comparison so that exactly 60% is never lost to float rounding.
    let correct = found * 100 >= keywords.len() * KEYWORD_THRESHOLD_PERCENT;
    let accuracy = found as f32 / keywords.len() as f32;
    let feedback = if missing.is_empty() {
        "All key concepts covered".to_string()
    } else {
        format!(
            "Covered {found} of {} key concepts; missing: {}",
            keywords.len(),
            missing.join(", ")
        )
    };

    GradingResult::Accuracy {
        correct,
        accuracy,
        feedback,
    }
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

/// Fixed points per correct answer.
#[derive(Debug, Clone, Copy)]
pub struct ScoreGrader {
    base_points: u32,
}

impl ScoreGrader {
    #[must_use]
    pub fn new(base_points: u32) -> Self {
        Self { base_points }
    }
}

impl Default for ScoreGrader {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_POINTS)
    }
}

impl Grader for ScoreGrader {
    fn kind(&self) -> GraderKind {
        GraderKind::Score
    }

    fn grade(&self, question: &Question, answer: &Answer) -> GradingResult {
        let correct = exact_match(question, answer);
        GradingResult::Points {
            correct,
            earned: if correct { self.base_points } else { 0 },
            max: self.base_points,
            // TODO: scale by remaining time once rapid modes report answer latency.
            multiplier: 1.0,
        }
    }
}

//
// ─── PRACTICE ──────────────────────────────────────────────────────────────────
//

/// Feedback-only grading: always "correct", always shows the answer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PracticeGrader;

impl Grader for PracticeGrader {
    fn kind(&self) -> GraderKind {
        GraderKind::Practice
    }

    fn grade(&self, question: &Question, _answer: &Answer) -> GradingResult {
        GradingResult::Practice {
            correct_answer: question.canonical_answer_text(),
            explanation: PRACTICE_EXPLANATION.to_string(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
