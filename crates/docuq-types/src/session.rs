//! Session types and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is using a session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No name entered yet, or the user switched away.
    #[default]
    Anonymous,
    /// A name has been entered.
    Identified { name: String },
}

impl SessionState {
    /// Move to `Identified` with the trimmed name.
    ///
    /// Returns `false` and leaves the state untouched when the name is blank.
    pub fn identify(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        *self = SessionState::Identified {
            name: name.to_string(),
        };
        true
    }

    /// Forget the current user.
    pub fn switch_user(&mut self) {
        *self = SessionState::Anonymous;
    }

    pub fn user_name(&self) -> Option<&str> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Identified { name } => Some(name),
        }
    }

    pub fn is_identified(&self) -> bool {
        matches!(self, SessionState::Identified { .. })
    }

    /// Whether an answer may be requested: identified, a file, and a non-blank question.
    pub fn can_submit(&self, has_file: bool, question: &str) -> bool {
        self.is_identified() && has_file && !question.trim().is_empty()
    }
}

/// Per-browser session context passed to request handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Session id, carried in a cookie.
    pub id: Uuid,
    /// Current identification state.
    pub state: SessionState,
    /// When the session was started.
    pub created_at: DateTime<Utc>,
    /// Last request seen for this session.
    pub last_seen_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Anonymous,
            created_at: now,
            last_seen_at: now,
        }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identify_trims_and_sets_name() {
        let mut state = SessionState::default();
        assert!(state.identify("  Ada  "));
        assert_eq!(state.user_name(), Some("Ada"));
    }

    #[test]
    fn test_identify_rejects_blank_name() {
        let mut state = SessionState::default();
        assert!(!state.identify("   "));
        assert_eq!(state, SessionState::Anonymous);

        state.identify("Ada");
        assert!(!state.identify(""));
        assert_eq!(state.user_name(), Some("Ada"));
    }

    #[test]
    fn test_switch_user_clears_name() {
        let mut state = SessionState::default();
        state.identify("Ada");
        state.switch_user();
        assert_eq!(state.user_name(), None);
        assert!(!state.is_identified());
    }

    #[test]
    fn test_submission_inert_while_anonymous() {
        let mut state = SessionState::default();
        assert!(!state.can_submit(true, "What is this?"));

        state.identify("Ada");
        assert!(state.can_submit(true, "What is this?"));
        assert!(!state.can_submit(false, "What is this?"));
        assert!(!state.can_submit(true, "  "));
    }

    #[test]
    fn test_state_serialization() {
        let state = SessionState::Identified {
            name: "Ada".to_string(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["state"], "identified");
        assert_eq!(json["name"], "Ada");
    }
}
