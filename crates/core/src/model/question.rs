use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::Answer;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// Discriminant shared by questions and answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Choice,
    MultiChoice,
    Bool,
    Text,
}

/// Accepted question types for a rule set.
pub type QuestionTypeSet = BTreeSet<QuestionType>;

impl QuestionType {
    pub const ALL: [QuestionType; 4] = [
        QuestionType::Choice,
        QuestionType::MultiChoice,
        QuestionType::Bool,
        QuestionType::Text,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Choice => "choice",
            QuestionType::MultiChoice => "multi_choice",
            QuestionType::Bool => "bool",
            QuestionType::Text => "text",
        }
    }

    /// Every type that can be answered by picking from a fixed set.
    #[must_use]
    pub fn closed_set() -> QuestionTypeSet {
        [
            QuestionType::Choice,
            QuestionType::MultiChoice,
            QuestionType::Bool,
        ]
        .into_iter()
        .collect()
    }

    #[must_use]
    pub fn all() -> QuestionTypeSet {
        Self::ALL.into_iter().collect()
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "choice" => Ok(QuestionType::Choice),
            "multi_choice" | "multi" => Ok(QuestionType::MultiChoice),
            "bool" | "true_false" => Ok(QuestionType::Bool),
            "text" | "text_entry" => Ok(QuestionType::Text),
            _ => Err(ParseError::new("question type", s)),
        }
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Topic label used by category filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(String);

impl Category {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into().trim().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, since packs are hand-written.
    #[must_use]
    pub fn matches(&self, other: &Category) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Payload of a question, one shape per question type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Choice {
        options: Vec<String>,
        correct: usize,
    },
    MultiChoice {
        options: Vec<String>,
        correct: Vec<usize>,
    },
    Bool {
        correct: bool,
    },
    Text {
        expected: String,
        #[serde(default)]
        keywords: Vec<String>,
    },
}

impl QuestionKind {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Choice { .. } => QuestionType::Choice,
            QuestionKind::MultiChoice { .. } => QuestionType::MultiChoice,
            QuestionKind::Bool { .. } => QuestionType::Bool,
            QuestionKind::Text { .. } => QuestionType::Text,
        }
    }
}

/// A question as supplied by the question pack layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    #[serde(default)]
    category: Option<Category>,
    #[serde(flatten)]
    kind: QuestionKind,
}

impl Question {
    #[must_use]
    pub fn new(prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            prompt: prompt.into(),
            category: None,
            kind,
        }
    }

    #[must_use]
    pub fn choice(prompt: impl Into<String>, options: Vec<String>, correct: usize) -> Self {
        Self::new(prompt, QuestionKind::Choice { options, correct })
    }

    #[must_use]
    pub fn multi_choice(prompt: impl Into<String>, options: Vec<String>, correct: Vec<usize>) -> Self {
        Self::new(prompt, QuestionKind::MultiChoice { options, correct })
    }

    #[must_use]
    pub fn boolean(prompt: impl Into<String>, correct: bool) -> Self {
        Self::new(prompt, QuestionKind::Bool { correct })
    }

    #[must_use]
    pub fn text(prompt: impl Into<String>, expected: impl Into<String>, keywords: Vec<String>) -> Self {
        Self::new(
            prompt,
            QuestionKind::Text {
                expected: expected.into(),
                keywords,
            },
        )
    }

    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn category(&self) -> Option<&Category> {
        self.category.as_ref()
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// Option texts for choice questions; empty for bool and text.
    #[must_use]
    pub fn options(&self) -> &[String] {
        match &self.kind {
            QuestionKind::Choice { options, .. } | QuestionKind::MultiChoice { options, .. } => {
                options
            }
            QuestionKind::Bool { .. } | QuestionKind::Text { .. } => &[],
        }
    }

    /// The answer that grades as correct.
    #[must_use]
    pub fn canonical_answer(&self) -> Answer {
        match &self.kind {
            QuestionKind::Choice { correct, .. } => Answer::Choice(*correct),
            QuestionKind::MultiChoice { correct, .. } => Answer::MultiChoice(correct.clone()),
            QuestionKind::Bool { correct } => Answer::Bool(*correct),
            QuestionKind::Text { expected, .. } => Answer::Text(expected.clone()),
        }
    }

    /// Human-readable canonical answer, resolving option indices to their text.
    #[must_use]
    pub fn canonical_answer_text(&self) -> String {
        match &self.kind {
            QuestionKind::Choice { options, correct } => option_text(options, *correct),
            QuestionKind::MultiChoice { options, correct } => correct
                .iter()
                .map(|idx| option_text(options, *idx))
                .collect::<Vec<_>>()
                .join(", "),
            QuestionKind::Bool { correct } => {
                if *correct {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            QuestionKind::Text { expected, .. } => expected.clone(),
        }
    }
}

fn option_text(options: &[String], idx: usize) -> String {
    options
        .get(idx)
        .cloned()
        .unwrap_or_else(|| format!("option #{}", idx.saturating_add(1)))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
