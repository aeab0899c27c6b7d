use thiserror::Error;

use crate::model::RulesError;

/// Failure to parse a configuration name (mode, difficulty, question type, ...).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw:?}")]
pub struct ParseError {
    kind: &'static str,
    raw: String,
}

impl ParseError {
    #[must_use]
    pub fn new(kind: &'static str, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }

    /// The kind of value that failed to parse, e.g. `"difficulty"`.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
