use std::fmt;

/// Lifecycle of a quiz session.
///
/// `NotStarted → Running → {Completed, Failed, TimeExpired}`; the last three
/// are terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    #[default]
    NotStarted,
    Running,
    /// Every question was answered.
    Completed,
    /// Ran out of lives.
    Failed,
    TimeExpired,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Failed | SessionStatus::TimeExpired
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::NotStarted => "not started",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
            SessionStatus::TimeExpired => "time expired",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
