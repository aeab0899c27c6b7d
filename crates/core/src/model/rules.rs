use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::ParseError;
use crate::model::{Category, Difficulty, Progression, QuestionTypeSet};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A rule set that is internally inconsistent.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("total time must be > 0")]
    TotalDurationNotPositive,

    #[error("per-question time must be > 0")]
    PerQuestionNotPositive,

    #[error("bonus time must be > 0")]
    BonusNotPositive,

    #[error("bonus time must be less than per-question time")]
    BonusNotLessThanPerQuestion,

    #[error("penalty time cannot be negative")]
    NegativePenalty,

    #[error("starting lives must be > 0 when lives are enabled")]
    StartingLivesNotPositive,

    #[error("starting lives must be 0 when lives are disabled")]
    StartingLivesWhileDisabled { starting: u32 },

    #[error("at least one question type must be selected")]
    NoQuestionTypes,
}

//
// ─── TIME ──────────────────────────────────────────────────────────────────────
//

/// How the clock constrains a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    #[default]
    Unlimited,
    /// One countdown for the whole session.
    TotalDuration,
    /// A fresh countdown for every question.
    PerQuestion,
    /// Per-question countdown that grows on correct answers and shrinks on wrong ones.
    PerQuestionWithBonus,
}

impl TimeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeMode::Unlimited => "unlimited",
            TimeMode::TotalDuration => "total_duration",
            TimeMode::PerQuestion => "per_question",
            TimeMode::PerQuestionWithBonus => "per_question_with_bonus",
        }
    }

    #[must_use]
    pub fn is_per_question(self) -> bool {
        matches!(self, TimeMode::PerQuestion | TimeMode::PerQuestionWithBonus)
    }
}

impl fmt::Display for TimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unlimited" | "none" => Ok(TimeMode::Unlimited),
            "total_duration" | "total" => Ok(TimeMode::TotalDuration),
            "per_question" => Ok(TimeMode::PerQuestion),
            "per_question_with_bonus" | "bonus" => Ok(TimeMode::PerQuestionWithBonus),
            _ => Err(ParseError::new("time mode", s)),
        }
    }
}

/// Whether the player may move between questions at will.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Navigation {
    #[default]
    Free,
    /// Forward-only; the session advances by itself after each answer.
    Locked,
}

/// Raw timing inputs before derivation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeOptions {
    pub total_duration: Duration,
    pub per_question: Duration,
    pub bonus: Duration,
    pub penalty: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRules {
    pub control: TimeMode,
    pub total_duration: Duration,
    pub per_question: Duration,
    pub bonus: Duration,
    pub penalty: Duration,
    pub navigation: Navigation,
}

impl TimeRules {
    /// Derives time rules from a control mode.
    ///
    /// Per-question controls always lock navigation; options that do not apply
    /// to `control` are zeroed.
    #[must_use]
    pub fn build(control: TimeMode, opt: TimeOptions) -> Self {
        let zero = Duration::zero();
        match control {
            TimeMode::Unlimited => Self {
                control,
                total_duration: zero,
                per_question: zero,
                bonus: zero,
                penalty: zero,
                navigation: Navigation::Free,
            },
            TimeMode::TotalDuration => Self {
                control,
                total_duration: opt.total_duration,
                per_question: zero,
                bonus: zero,
                penalty: zero,
                navigation: Navigation::Free,
            },
            TimeMode::PerQuestion => Self {
                control,
                total_duration: zero,
                per_question: opt.per_question,
                bonus: zero,
                penalty: opt.penalty,
                navigation: Navigation::Locked,
            },
            TimeMode::PerQuestionWithBonus => Self {
                control,
                total_duration: zero,
                per_question: opt.per_question,
                bonus: opt.bonus,
                penalty: opt.penalty,
                navigation: Navigation::Locked,
            },
        }
    }

    #[must_use]
    pub fn unlimited() -> Self {
        Self::build(TimeMode::Unlimited, TimeOptions::default())
    }

    fn validate(&self) -> Result<(), RulesError> {
        let zero = Duration::zero();
        match self.control {
            TimeMode::Unlimited => {}
            TimeMode::TotalDuration => {
                if self.total_duration <= zero {
                    return Err(RulesError::TotalDurationNotPositive);
                }
            }
            TimeMode::PerQuestion => {
                if self.per_question <= zero {
                    return Err(RulesError::PerQuestionNotPositive);
                }
            }
            TimeMode::PerQuestionWithBonus => {
                if self.per_question <= zero {
                    return Err(RulesError::PerQuestionNotPositive);
                }
                if self.bonus <= zero {
                    return Err(RulesError::BonusNotPositive);
                }
                if self.bonus >= self.per_question {
                    return Err(RulesError::BonusNotLessThanPerQuestion);
                }
            }
        }
        if self.penalty < zero {
            return Err(RulesError::NegativePenalty);
        }
        Ok(())
    }
}

//
// ─── LIVES ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifeMode {
    #[default]
    None,
    Fixed,
    /// Exactly one life.
    SuddenDeath,
}

impl LifeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LifeMode::None => "none",
            LifeMode::Fixed => "fixed",
            LifeMode::SuddenDeath => "sudden_death",
        }
    }
}

impl fmt::Display for LifeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(LifeMode::None),
            "fixed" => Ok(LifeMode::Fixed),
            "sudden_death" => Ok(LifeMode::SuddenDeath),
            _ => Err(ParseError::new("life mode", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifeOptions {
    pub lives: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LifeRules {
    pub enabled: bool,
    pub starting: u32,
    pub lose_on_wrong: bool,
}

impl LifeRules {
    /// Derives life rules from a life mode. Sudden death ignores `opt.lives`.
    #[must_use]
    pub fn build(mode: LifeMode, opt: LifeOptions) -> Self {
        match mode {
            LifeMode::None => Self::default(),
            LifeMode::Fixed => Self {
                enabled: true,
                starting: opt.lives,
                lose_on_wrong: true,
            },
            LifeMode::SuddenDeath => Self {
                enabled: true,
                starting: 1,
                lose_on_wrong: true,
            },
        }
    }

    fn validate(&self) -> Result<(), RulesError> {
        if self.enabled {
            if self.starting == 0 {
                return Err(RulesError::StartingLivesNotPositive);
            }
        } else if self.starting != 0 {
            return Err(RulesError::StartingLivesWhileDisabled {
                starting: self.starting,
            });
        }
        Ok(())
    }
}

//
// ─── PROGRESSION & QUESTIONS ───────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressionRules {
    pub mode: Progression,
    pub difficulty: Difficulty,
}

/// Cap on how many questions a session draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCount {
    #[default]
    All,
    Ten,
    Thirty,
    Fifty,
}

impl QuestionCount {
    /// `None` means no cap.
    #[must_use]
    pub fn limit(self) -> Option<usize> {
        match self {
            QuestionCount::All => None,
            QuestionCount::Ten => Some(10),
            QuestionCount::Thirty => Some(30),
            QuestionCount::Fifty => Some(50),
        }
    }
}

impl FromStr for QuestionCount {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "0" => Ok(QuestionCount::All),
            "ten" | "10" => Ok(QuestionCount::Ten),
            "thirty" | "30" => Ok(QuestionCount::Thirty),
            "fifty" | "50" => Ok(QuestionCount::Fifty),
            _ => Err(ParseError::new("question count", s)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionRules {
    /// Empty means every category.
    pub category_filter: Vec<Category>,
    pub types: QuestionTypeSet,
    pub randomize: bool,
    pub count: QuestionCount,
}

impl QuestionRules {
    #[must_use]
    pub fn accepts_category(&self, category: Option<&Category>) -> bool {
        if self.category_filter.is_empty() {
            return true;
        }
        category.is_some_and(|c| self.category_filter.iter().any(|f| f.matches(c)))
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Complete policy for one quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rules {
    pub time: TimeRules,
    pub lives: LifeRules,
    pub progression: ProgressionRules,
    pub questions: QuestionRules,
    pub description: String,
}

impl Rules {
    /// Checks internal consistency, reporting the first violated invariant.
    ///
    /// # Errors
    ///
    /// Returns the matching `RulesError` for invalid durations, inconsistent
    /// life settings or an empty question-type set.
    pub fn validate(&self) -> Result<(), RulesError> {
        self.time.validate()?;
        self.lives.validate()?;
        if self.questions.types.is_empty() {
            return Err(RulesError::NoQuestionTypes);
        }
        Ok(())
    }

    #[must_use]
    pub fn navigation(&self) -> Navigation {
        self.time.navigation
    }

    /// True when two rule sets differ at most in their description.
    #[must_use]
    pub fn same_policy(&self, other: &Rules) -> bool {
        self.time == other.time
            && self.lives == other.lives
            && self.progression == other.progression
            && self.questions == other.questions
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionType;
    use proptest::prelude::*;

    fn rules_with(time: TimeRules, lives: LifeRules) -> Rules {
        Rules {
            time,
            lives,
            progression: ProgressionRules::default(),
            questions: QuestionRules {
                types: QuestionType::all(),
                ..QuestionRules::default()
            },
            description: String::new(),
        }
    }

    fn secs(s: i64) -> Duration {
        Duration::seconds(s)
    }

    #[test]
    fn per_question_modes_lock_navigation() {
        let opt = TimeOptions {
            per_question: secs(30),
            bonus: secs(5),
            ..TimeOptions::default()
        };
        assert_eq!(
            TimeRules::build(TimeMode::PerQuestion, opt).navigation,
            Navigation::Locked
        );
        assert_eq!(
            TimeRules::build(TimeMode::PerQuestionWithBonus, opt).navigation,
            Navigation::Locked
        );
        assert_eq!(
            TimeRules::build(TimeMode::TotalDuration, opt).navigation,
            Navigation::Free
        );
    }

    #[test]
    fn unlimited_zeroes_every_duration() {
        let opt = TimeOptions {
            total_duration: secs(60),
            per_question: secs(30),
            bonus: secs(5),
            penalty: secs(5),
        };
        let time = TimeRules::build(TimeMode::Unlimited, opt);
        assert_eq!(time, TimeRules::unlimited());
        assert_eq!(time.total_duration, Duration::zero());
        assert_eq!(time.navigation, Navigation::Free);
    }

    #[test]
    fn life_rules_derivation() {
        assert_eq!(
            LifeRules::build(LifeMode::None, LifeOptions { lives: 4 }),
            LifeRules::default()
        );
        let fixed = LifeRules::build(LifeMode::Fixed, LifeOptions { lives: 3 });
        assert!(fixed.enabled && fixed.lose_on_wrong);
        assert_eq!(fixed.starting, 3);
        let sudden = LifeRules::build(LifeMode::SuddenDeath, LifeOptions { lives: 9 });
        assert_eq!(sudden.starting, 1);
    }

    #[test]
    fn validate_rejects_zero_total_duration() {
        let rules = rules_with(
            TimeRules::build(TimeMode::TotalDuration, TimeOptions::default()),
            LifeRules::default(),
        );
        assert_eq!(rules.validate(), Err(RulesError::TotalDurationNotPositive));
    }

    #[test]
    fn validate_rejects_zero_per_question() {
        let rules = rules_with(
            TimeRules::build(TimeMode::PerQuestion, TimeOptions::default()),
            LifeRules::default(),
        );
        assert_eq!(rules.validate(), Err(RulesError::PerQuestionNotPositive));
    }

    #[test]
    fn validate_bonus_rules() {
        let missing_bonus = rules_with(
            TimeRules::build(
                TimeMode::PerQuestionWithBonus,
                TimeOptions {
                    per_question: secs(30),
                    ..TimeOptions::default()
                },
            ),
            LifeRules::default(),
        );
        assert_eq!(missing_bonus.validate(), Err(RulesError::BonusNotPositive));

        let equal_bonus = rules_with(
            TimeRules::build(
                TimeMode::PerQuestionWithBonus,
                TimeOptions {
                    per_question: secs(30),
                    bonus: secs(30),
                    ..TimeOptions::default()
                },
            ),
            LifeRules::default(),
        );
        assert_eq!(
            equal_bonus.validate(),
            Err(RulesError::BonusNotLessThanPerQuestion)
        );
    }

    #[test]
    fn validate_rejects_negative_penalty() {
        let mut time = TimeRules::build(
            TimeMode::PerQuestion,
            TimeOptions {
                per_question: secs(30),
                ..TimeOptions::default()
            },
        );
        time.penalty = secs(-1);
        let rules = rules_with(time, LifeRules::default());
        assert_eq!(rules.validate(), Err(RulesError::NegativePenalty));
    }

    #[test]
    fn validate_life_consistency() {
        let enabled_without_lives = rules_with(
            TimeRules::unlimited(),
            LifeRules::build(LifeMode::Fixed, LifeOptions { lives: 0 }),
        );
        assert_eq!(
            enabled_without_lives.validate(),
            Err(RulesError::StartingLivesNotPositive)
        );

        let disabled_with_lives = rules_with(
            TimeRules::unlimited(),
            LifeRules {
                enabled: false,
                starting: 2,
                lose_on_wrong: false,
            },
        );
        assert_eq!(
            disabled_with_lives.validate(),
            Err(RulesError::StartingLivesWhileDisabled { starting: 2 })
        );
    }

    #[test]
    fn validate_requires_question_types() {
        let mut rules = rules_with(TimeRules::unlimited(), LifeRules::default());
        rules.questions.types.clear();
        assert_eq!(rules.validate(), Err(RulesError::NoQuestionTypes));
    }

    #[test]
    fn validate_reports_time_before_lives() {
        let rules = rules_with(
            TimeRules::build(TimeMode::TotalDuration, TimeOptions::default()),
            LifeRules::build(LifeMode::Fixed, LifeOptions { lives: 0 }),
        );
        assert_eq!(rules.validate(), Err(RulesError::TotalDurationNotPositive));
    }

    #[test]
    fn category_filter_matching() {
        let mut questions = QuestionRules::default();
        assert!(questions.accepts_category(None));
        questions.category_filter = vec![Category::new("rust")];
        assert!(questions.accepts_category(Some(&Category::new("Rust"))));
        assert!(!questions.accepts_category(Some(&Category::new("go"))));
        assert!(!questions.accepts_category(None));
    }

    #[test]
    fn question_count_limits() {
        assert_eq!(QuestionCount::All.limit(), None);
        assert_eq!("30".parse::<QuestionCount>().unwrap().limit(), Some(30));
    }

    proptest! {
        #[test]
        fn bonus_rules_validate_iff_bonus_below_per_question(
            per_question in 0i64..120,
            bonus in 0i64..120,
        ) {
            let rules = rules_with(
                TimeRules::build(
                    TimeMode::PerQuestionWithBonus,
                    TimeOptions {
                        per_question: secs(per_question),
                        bonus: secs(bonus),
                        ..TimeOptions::default()
                    },
                ),
                LifeRules::default(),
            );
            let expected_ok = per_question > 0 && bonus > 0 && bonus < per_question;
            prop_assert_eq!(rules.validate().is_ok(), expected_ok);
            if let Ok(()) = rules.validate() {
                prop_assert!(rules.time.bonus < rules.time.per_question);
            }
        }
    }
}
