//! How a run decides which session to use.

use quill_core::{SessionError, SessionId};

/// What the caller asked to resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeTarget {
    /// Start a fresh session.
    New,
    /// List stored sessions and let the operator pick one.
    Choose,
    /// Resume this id. Validated against the id format before use.
    Id(String),
}

impl ResumeTarget {
    /// Interpret a `--resume` style value: absent or blank means new,
    /// `list` means choose interactively, anything else is an id.
    pub fn from_flag(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::New,
            Some("list") => Self::Choose,
            Some(id) => Self::Id(id.to_string()),
        }
    }
}

/// Presents stored sessions (newest first) and returns the pick.
///
/// `Ok(None)` means "create a new session instead".
pub trait SessionSelector: Send + Sync {
    fn choose(&self, sessions: &[SessionId]) -> Result<Option<SessionId>, SessionError>;
}

/// A selector that always asks for a new session. Used by non-interactive runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct CreateNew;

impl SessionSelector for CreateNew {
    fn choose(&self, _sessions: &[SessionId]) -> Result<Option<SessionId>, SessionError> {
        Ok(None)
    }
}
