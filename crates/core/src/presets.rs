//! Named game modes and the rule sets they produce.
//!
//! The four fixed presets are pure functions of difficulty. `Custom` takes an
//! explicit value for every axis through [`CustomOptions`], which is also the
//! shape of the `[custom]` table in configuration files.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;
use crate::model::{
    Category, Difficulty, LifeMode, LifeOptions, LifeRules, Progression, ProgressionRules,
    QuestionCount, QuestionRules, QuestionType, QuestionTypeSet, Rules, RulesError, TimeMode,
    TimeOptions, TimeRules,
};

const QUICK_TOTAL_SECS: i64 = 300;
const RAPID_PER_QUESTION_SECS: i64 = 40;
const RAPID_PENALTY_SECS: i64 = 5;
const HARDCORE_PER_QUESTION_SECS: i64 = 30;
const HARDCORE_BONUS_SECS: i64 = 10;

//
// ─── MODE ID ───────────────────────────────────────────────────────────────────
//

/// Name of a game mode as it appears in menus and configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeId {
    #[default]
    Standard,
    Quick,
    Rapid,
    Hardcore,
    Custom,
}

impl ModeId {
    pub const ALL: [ModeId; 5] = [
        ModeId::Standard,
        ModeId::Quick,
        ModeId::Rapid,
        ModeId::Hardcore,
        ModeId::Custom,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModeId::Standard => "standard",
            ModeId::Quick => "quick",
            ModeId::Rapid => "rapid",
            ModeId::Hardcore => "hardcore",
            ModeId::Custom => "custom",
        }
    }

    /// The fixed preset behind this id, or `None` for `Custom`.
    #[must_use]
    pub fn preset(self) -> Option<Preset> {
        match self {
            ModeId::Standard => Some(Preset::Standard),
            ModeId::Quick => Some(Preset::Quick),
            ModeId::Rapid => Some(Preset::Rapid),
            ModeId::Hardcore => Some(Preset::Hardcore),
            ModeId::Custom => None,
        }
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| ParseError::new("mode", s))
    }
}

//
// ─── FIXED PRESETS ─────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Untimed free-text practice, interview style.
    Standard,
    /// Five minutes for the whole quiz.
    Quick,
    /// 40 seconds per question.
    Rapid,
    /// 30 seconds per question plus bonus time, one life.
    Hardcore,
}

impl Preset {
    #[must_use]
    pub fn id(self) -> ModeId {
        match self {
            Preset::Standard => ModeId::Standard,
            Preset::Quick => ModeId::Quick,
            Preset::Rapid => ModeId::Rapid,
            Preset::Hardcore => ModeId::Hardcore,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Preset::Standard => "Interview-style practice with grading",
            Preset::Quick => "Quick-fire questions to warm up before interviews",
            Preset::Rapid => "Fast-paced reaction training",
            Preset::Hardcore => "High-pressure survival mode",
        }
    }

    /// Builds the preset's rules without validating them.
    #[must_use]
    fn build(self, difficulty: Difficulty) -> Rules {
        let (time, lives, progression, types) = match self {
            Preset::Standard => (
                TimeRules::unlimited(),
                LifeRules::build(LifeMode::None, LifeOptions::default()),
                ProgressionRules {
                    mode: Progression::Scaling,
                    difficulty,
                },
                [QuestionType::Text].into_iter().collect(),
            ),
            Preset::Quick => (
                TimeRules::build(
                    TimeMode::TotalDuration,
                    TimeOptions {
                        total_duration: Duration::seconds(QUICK_TOTAL_SECS),
                        ..TimeOptions::default()
                    },
                ),
                LifeRules::build(LifeMode::None, LifeOptions::default()),
                ProgressionRules {
                    mode: Progression::Fixed,
                    difficulty,
                },
                QuestionType::closed_set(),
            ),
            Preset::Rapid => (
                TimeRules::build(
                    TimeMode::PerQuestion,
                    TimeOptions {
                        per_question: Duration::seconds(RAPID_PER_QUESTION_SECS),
                        penalty: Duration::seconds(RAPID_PENALTY_SECS),
                        ..TimeOptions::default()
                    },
                ),
                LifeRules::build(LifeMode::None, LifeOptions::default()),
                ProgressionRules {
                    mode: Progression::Fixed,
                    difficulty,
                },
                QuestionType::closed_set(),
            ),
            // Survival always starts from the bottom, whatever was selected.
            Preset::Hardcore => (
                TimeRules::build(
                    TimeMode::PerQuestionWithBonus,
                    TimeOptions {
                        per_question: Duration::seconds(HARDCORE_PER_QUESTION_SECS),
                        bonus: Duration::seconds(HARDCORE_BONUS_SECS),
                        ..TimeOptions::default()
                    },
                ),
                LifeRules::build(LifeMode::SuddenDeath, LifeOptions::default()),
                ProgressionRules {
                    mode: Progression::Scaling,
                    difficulty: Difficulty::Entry,
                },
                QuestionType::closed_set(),
            ),
        };

        Rules {
            time,
            lives,
            progression,
            questions: QuestionRules {
                category_filter: Vec::new(),
                types,
                randomize: true,
                count: QuestionCount::All,
            },
            description: self.description().to_string(),
        }
    }

    /// Builds and validates the preset's rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if the preset constants are inconsistent.
    pub fn try_rules(self, difficulty: Difficulty) -> Result<Rules, RulesError> {
        let rules = self.build(difficulty);
        rules.validate()?;
        Ok(rules)
    }

    /// Builds the preset's rules.
    ///
    /// # Panics
    ///
    /// Panics if the preset constants violate a rules invariant. That is a
    /// programming error, covered by this module's tests.
    #[must_use]
    pub fn rules(self, difficulty: Difficulty) -> Rules {
        self.try_rules(difficulty)
            .expect("built-in preset rules should always validate")
    }
}

//
// ─── CUSTOM ────────────────────────────────────────────────────────────────────
//

/// Free-form configuration for the `Custom` mode. Durations are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CustomOptions {
    pub time_mode: TimeMode,
    pub total_duration_secs: u32,
    pub per_question_secs: u32,
    pub bonus_secs: u32,
    pub penalty_secs: u32,

    pub life_mode: LifeMode,
    pub lives: u32,

    pub progression: Progression,

    pub categories: Vec<Category>,
    pub types: QuestionTypeSet,
    pub randomize: bool,
    pub question_count: QuestionCount,
}

impl Default for CustomOptions {
    /// Unlimited time, no lives, fixed progression, every question type.
    fn default() -> Self {
        Self {
            time_mode: TimeMode::Unlimited,
            total_duration_secs: 0,
            per_question_secs: 0,
            bonus_secs: 0,
            penalty_secs: 0,
            life_mode: LifeMode::None,
            lives: 0,
            progression: Progression::Fixed,
            categories: Vec::new(),
            types: QuestionType::all(),
            randomize: false,
            question_count: QuestionCount::All,
        }
    }
}

impl CustomOptions {
    pub const DESCRIPTION: &'static str = "Custom practice mode";

    /// Builds and validates rules from these options.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` when the options are inconsistent, e.g. a bonus that
    /// is not smaller than the per-question time.
    pub fn rules(&self, difficulty: Difficulty) -> Result<Rules, RulesError> {
        let time = TimeRules::build(
            self.time_mode,
            TimeOptions {
                total_duration: Duration::seconds(i64::from(self.total_duration_secs)),
                per_question: Duration::seconds(i64::from(self.per_question_secs)),
                bonus: Duration::seconds(i64::from(self.bonus_secs)),
                penalty: Duration::seconds(i64::from(self.penalty_secs)),
            },
        );
        let lives = LifeRules::build(self.life_mode, LifeOptions { lives: self.lives });

        let rules = Rules {
            time,
            lives,
            progression: ProgressionRules {
                mode: self.progression,
                difficulty,
            },
            questions: QuestionRules {
                category_filter: self.categories.clone(),
                types: self.types.clone(),
                randomize: self.randomize,
                count: self.question_count,
            },
            description: Self::DESCRIPTION.to_string(),
        };
        rules.validate()?;
        Ok(rules)
    }
}

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// A selected game mode, carrying custom options when needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Preset(Preset),
    Custom(CustomOptions),
}

impl Mode {
    /// Resolves a mode id; `custom` is only used for `ModeId::Custom`.
    #[must_use]
    pub fn from_id(id: ModeId, custom: CustomOptions) -> Self {
        match id.preset() {
            Some(preset) => Mode::Preset(preset),
            None => Mode::Custom(custom),
        }
    }

    #[must_use]
    pub fn id(&self) -> ModeId {
        match self {
            Mode::Preset(preset) => preset.id(),
            Mode::Custom(_) => ModeId::Custom,
        }
    }

    /// # Errors
    ///
    /// Returns `RulesError` when the rules do not validate.
    pub fn rules(&self, difficulty: Difficulty) -> Result<Rules, RulesError> {
        match self {
            Mode::Preset(preset) => preset.try_rules(difficulty),
            Mode::Custom(options) => options.rules(difficulty),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
