//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::RulesError;

/// Errors emitted by session construction and session operations.
///
/// Everything except `Rules` and `Empty` is a sequencing error: the call was
/// made in a state that does not allow it and left the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("no questions available for session")]
    Empty,
    #[error("session already started")]
    AlreadyStarted,
    #[error("session not running")]
    NotRunning,
    #[error("navigation not allowed in this mode")]
    NavigationLocked,
    #[error("invalid question index")]
    InvalidIndex,
}
