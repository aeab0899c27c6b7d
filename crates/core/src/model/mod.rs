mod answer;
mod difficulty;
mod ids;
mod question;
mod rules;

pub use answer::Answer;
pub use difficulty::{Difficulty, Progression};
pub use ids::SessionId;
pub use question::{Category, Question, QuestionKind, QuestionType, QuestionTypeSet};
pub use rules::{
    LifeMode, LifeOptions, LifeRules, Navigation, ProgressionRules, QuestionCount, QuestionRules,
    Rules, RulesError, TimeMode, TimeOptions, TimeRules,
};
