#![forbid(unsafe_code)]

pub mod error;
pub mod grading;
pub mod model;
pub mod presets;
pub mod time;

pub use error::{Error, ParseError};
pub use grading::{
    AccuracyGrader, BinaryGrader, Grader, GraderKind, GradingResult, PracticeGrader, ScoreGrader,
};
pub use model::{
    Answer, Category, Difficulty, LifeMode, LifeOptions, LifeRules, Navigation, Progression,
    ProgressionRules, Question, QuestionCount, QuestionKind, QuestionRules, QuestionType,
    QuestionTypeSet, Rules, RulesError, SessionId, TimeMode, TimeOptions, TimeRules,
};
pub use presets::{CustomOptions, Mode, ModeId, Preset};
pub use time::Clock;
