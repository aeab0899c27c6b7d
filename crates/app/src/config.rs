use serde::Deserialize;
use std::path::{Path, PathBuf};

use quiz_core::{
    CustomOptions, Difficulty, GraderKind, Mode, ModeId, ParseError, Rules, RulesError,
};

pub const CONFIG_ENV: &str = "QUIZ_CONFIG";
pub const MODE_ENV: &str = "QUIZ_MODE";
pub const DIFFICULTY_ENV: &str = "QUIZ_DIFFICULTY";

#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {var}: {source}")]
    Env {
        var: &'static str,
        source: ParseError,
    },
    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Settings for one run of the binary.
///
/// Layered lowest to highest: built-in defaults, the TOML file, environment
/// variables, then command-line flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub mode: ModeId,
    pub difficulty: Difficulty,
    /// Overrides the mode's default grading policy.
    pub grader: Option<GraderKind>,
    /// Only read when `mode = "custom"`.
    pub custom: CustomOptions,
}

impl AppConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read and
    /// `ConfigError::Parse` if it is not a valid configuration.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "failed to read config");
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Self::from_toml(&content).map_err(|source| {
            tracing::warn!(path = %path.display(), %source, "failed to parse config");
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown keys.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply `QUIZ_MODE` and `QUIZ_DIFFICULTY` as looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Env` when a set variable does not parse.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(raw) = lookup(MODE_ENV) {
            self.mode = raw.parse().map_err(|source| ConfigError::Env {
                var: MODE_ENV,
                source,
            })?;
        }
        if let Some(raw) = lookup(DIFFICULTY_ENV) {
            self.difficulty = raw.parse().map_err(|source| ConfigError::Env {
                var: DIFFICULTY_ENV,
                source,
            })?;
        }
        Ok(())
    }

    /// # Errors
    ///
    /// See [`AppConfig::apply_env_from`].
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        Mode::from_id(self.mode, self.custom.clone())
    }

    #[must_use]
    pub fn grader_kind(&self) -> GraderKind {
        self.grader.unwrap_or_else(|| GraderKind::for_mode(self.mode))
    }

    /// # Errors
    ///
    /// Returns `ConfigError::Rules` when custom options are inconsistent.
    pub fn rules(&self) -> Result<Rules, ConfigError> {
        Ok(self.mode().rules(self.difficulty)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use quiz_core::{LifeMode, Preset, TimeMode};

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: Vec<(String, String)> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.mode, ModeId::Standard);
        assert_eq!(config.grader_kind(), GraderKind::Accuracy);
        assert!(
            config
                .rules()
                .unwrap()
                .same_policy(&Preset::Standard.rules(Difficulty::Entry))
        );
    }

    #[test]
    fn custom_table_builds_rules() {
        let config = AppConfig::from_toml(
            r#"
            mode = "custom"
            difficulty = "mid"
            grader = "score"

            [custom]
            time_mode = "per_question_with_bonus"
            per_question_secs = 20
            bonus_secs = 5
            life_mode = "fixed"
            lives = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.grader_kind(), GraderKind::Score);
        let rules = config.rules().unwrap();
        assert_eq!(rules.time.control, TimeMode::PerQuestionWithBonus);
        assert_eq!(rules.time.per_question, Duration::seconds(20));
        assert_eq!(rules.lives.starting, 3);
        assert_eq!(rules.progression.difficulty, Difficulty::Mid);
        assert_eq!(config.custom.life_mode, LifeMode::Fixed);
    }

    #[test]
    fn custom_table_is_ignored_for_presets() {
        let config = AppConfig::from_toml(
            r#"
            mode = "rapid"

            [custom]
            lives = 9
            "#,
        )
        .unwrap();
        let rules = config.rules().unwrap();
        assert!(!rules.lives.enabled);
        assert_eq!(rules.time.per_question, Duration::seconds(40));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml("speed = 3").is_err());
        assert!(AppConfig::from_toml("mode = \"marathon\"").is_err());
    }

    #[test]
    fn invalid_custom_rules_surface_as_config_error() {
        let config = AppConfig::from_toml(
            r#"
            mode = "custom"
            [custom]
            time_mode = "per_question"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.rules(),
            Err(ConfigError::Rules(RulesError::PerQuestionNotPositive))
        ));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = AppConfig::from_toml("mode = \"quick\"\ndifficulty = \"junior\"").unwrap();
        config
            .apply_env_from(env(&[(MODE_ENV, "Hardcore"), (DIFFICULTY_ENV, "senior")]))
            .unwrap();
        assert_eq!(config.mode, ModeId::Hardcore);
        assert_eq!(config.difficulty, Difficulty::Senior);
        assert_eq!(config.grader_kind(), GraderKind::Binary);
    }

    #[test]
    fn unset_env_leaves_config_alone() {
        let mut config = AppConfig::from_toml("mode = \"quick\"").unwrap();
        config.apply_env_from(env(&[])).unwrap();
        assert_eq!(config.mode, ModeId::Quick);
    }

    #[test]
    fn bad_env_value_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_from(env(&[(DIFFICULTY_ENV, "wizard")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: DIFFICULTY_ENV, .. }));
        assert!(err.to_string().contains("wizard"));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = AppConfig::load(Path::new("/definitely/not/here/quiz.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
