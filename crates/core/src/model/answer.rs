use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::QuestionType;

/// A submitted answer, tagged with the question type it targets.
///
/// Choice indices are zero-based positions into the question's options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Choice(usize),
    MultiChoice(Vec<usize>),
    Bool(bool),
    Text(String),
}

impl Answer {
    #[must_use]
    pub fn question_type(&self) -> QuestionType {
        match self {
            Answer::Choice(_) => QuestionType::Choice,
            Answer::MultiChoice(_) => QuestionType::MultiChoice,
            Answer::Bool(_) => QuestionType::Bool,
            Answer::Text(_) => QuestionType::Text,
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Choice(idx) => write!(f, "#{}", idx.saturating_add(1)),
            Answer::MultiChoice(selected) => {
                let parts: Vec<String> = selected
                    .iter()
                    .map(|idx| format!("#{}", idx.saturating_add(1)))
                    .collect();
                write!(f, "{}", parts.join(", "))
            }
            Answer::Bool(value) => write!(f, "{value}"),
            Answer::Text(text) => f.write_str(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_tag_follows_variant() {
        assert_eq!(Answer::Choice(1).question_type(), QuestionType::Choice);
        assert_eq!(Answer::Text("x".into()).question_type(), QuestionType::Text);
    }

    #[test]
    fn display_uses_one_based_positions() {
        assert_eq!(Answer::Choice(0).to_string(), "#1");
        assert_eq!(Answer::MultiChoice(vec![0, 2]).to_string(), "#1, #3");
        assert_eq!(Answer::Bool(false).to_string(), "false");
    }

    #[test]
    fn display_saturates_at_max_index() {
        let max = format!("#{}", usize::MAX);
        assert_eq!(Answer::Choice(usize::MAX).to_string(), max);
        assert_eq!(
            Answer::MultiChoice(vec![0, usize::MAX]).to_string(),
            format!("#1, {max}")
        );
    }
}
