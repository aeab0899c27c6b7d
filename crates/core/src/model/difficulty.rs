use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Seniority level questions are drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Entry,
    Junior,
    Mid,
    Senior,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Entry,
        Difficulty::Junior,
        Difficulty::Mid,
        Difficulty::Senior,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Entry => "entry",
            Difficulty::Junior => "junior",
            Difficulty::Mid => "mid",
            Difficulty::Senior => "senior",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
            .ok_or_else(|| ParseError::new("difficulty", s))
    }
}

/// Whether difficulty stays put or climbs as the player progresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Progression {
    #[default]
    Fixed,
    Scaling,
}

impl Progression {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Progression::Fixed => "fixed",
            Progression::Scaling => "scaling",
        }
    }
}

impl fmt::Display for Progression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Progression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fixed" => Ok(Progression::Fixed),
            "scaling" => Ok(Progression::Scaling),
            _ => Err(ParseError::new("progression", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Senior".parse::<Difficulty>().unwrap(), Difficulty::Senior);
        assert_eq!(" mid ".parse::<Difficulty>().unwrap(), Difficulty::Mid);
        let err = "expert".parse::<Difficulty>().unwrap_err();
        assert_eq!(err.kind(), "difficulty");
        assert_eq!(err.raw(), "expert");
    }

    #[test]
    fn difficulty_display_matches_parse() {
        for d in Difficulty::ALL {
            assert_eq!(d.to_string().parse::<Difficulty>().unwrap(), d);
        }
    }

    #[test]
    fn progression_parses() {
        assert_eq!("scaling".parse::<Progression>().unwrap(), Progression::Scaling);
        assert!("sometimes".parse::<Progression>().is_err());
    }
}
