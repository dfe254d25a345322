//! Per-browser session contexts.

use crate::{DocuqError, Result};
use chrono::{Duration, Utc};
use dashmap::DashMap;
use docuq_types::SessionContext;
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for the session manager.
#[derive(Debug, Clone)]
pub struct SessionManagerConfig {
    /// Sessions idle for longer than this are dropped.
    pub idle_timeout: Duration,
    /// Live sessions kept at most; starting one more evicts the least recently seen.
    pub max_sessions: usize,
}

impl Default for SessionManagerConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::hours(24),
            max_sessions: 10_000,
        }
    }
}

/// Holds the identification state of each live session.
pub struct SessionManager {
    config: SessionManagerConfig,
    sessions: DashMap<Uuid, SessionContext>,
}

impl SessionManager {
    pub fn new(config: SessionManagerConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    /// Start a new anonymous session.
    pub fn start(&self) -> SessionContext {
        self.reap_idle();
        while self.sessions.len() >= self.config.max_sessions.max(1) {
            if !self.evict_least_recent() {
                break;
            }
        }
        let session = SessionContext::new();
        self.sessions.insert(session.id, session.clone());
        debug!(target: "docuq::session", "Started session {}", session.id);
        session
    }

    /// Look up a session and mark it as seen.
    pub fn get(&self, id: Uuid) -> Option<SessionContext> {
        let mut entry = self.sessions.get_mut(&id)?;
        entry.last_seen_at = Utc::now();
        Some(entry.clone())
    }

    /// Resume `id` if it is still live, otherwise start a fresh session.
    pub fn get_or_start(&self, id: Option<Uuid>) -> SessionContext {
        id.and_then(|id| self.get(id)).unwrap_or_else(|| self.start())
    }

    /// Identify the session's user.
    pub fn identify(&self, id: Uuid, name: &str) -> Result<SessionContext> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(DocuqError::SessionNotFound(id))?;
        if !entry.state.identify(name) {
            return Err(DocuqError::InvalidInput("name must not be empty".to_string()));
        }
        entry.last_seen_at = Utc::now();
        info!(target: "docuq::session", "Session {} identified as {}", id, name.trim());
        Ok(entry.clone())
    }

    /// Forget the session's user.
    pub fn switch_user(&self, id: Uuid) -> Result<SessionContext> {
        let mut entry = self
            .sessions
            .get_mut(&id)
            .ok_or(DocuqError::SessionNotFound(id))?;
        entry.state.switch_user();
        entry.last_seen_at = Utc::now();
        info!(target: "docuq::session", "Session {} switched user", id);
        Ok(entry.clone())
    }

    /// Tear a session down. Returns whether it existed.
    pub fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.remove(&id).is_some();
        if removed {
            debug!(target: "docuq::session", "Ended session {}", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle past the timeout. Returns how many were dropped.
    pub fn reap_idle(&self) -> usize {
        let cutoff = Utc::now() - self.config.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.last_seen_at >= cutoff);
        let reaped = before.saturating_sub(self.sessions.len());
        if reaped > 0 {
            info!(target: "docuq::session", "Reaped {} idle sessions", reaped);
        }
        reaped
    }

    fn evict_least_recent(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.last_seen_at)
            .map(|entry| *entry.key());
        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                debug!(target: "docuq::session", "Evicted session {} at capacity", id);
                true
            }
            None => false,
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new(SessionManagerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docuq_types::SessionState;

    #[test]
    fn test_start_is_anonymous() {
        let manager = SessionManager::default();
        let session = manager.start();
        assert_eq!(session.state, SessionState::Anonymous);
        assert!(manager.get(session.id).is_some());
    }

    #[test]
    fn test_identify_then_switch_user() {
        let manager = SessionManager::default();
        let id = manager.start().id;

        let session = manager.identify(id, "Ada").unwrap();
        assert_eq!(session.state.user_name(), Some("Ada"));
        assert_eq!(manager.get(id).unwrap().state.user_name(), Some("Ada"));

        let session = manager.switch_user(id).unwrap();
        assert_eq!(session.state, SessionState::Anonymous);
        assert_eq!(manager.get(id).unwrap().state.user_name(), None);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        let manager = SessionManager::default();
        let id = manager.start().id;
        assert!(matches!(
            manager.identify(id, "  "),
            Err(DocuqError::InvalidInput(_))
        ));
        assert_eq!(manager.get(id).unwrap().state, SessionState::Anonymous);
    }

    #[test]
    fn test_unknown_session() {
        let manager = SessionManager::default();
        let id = Uuid::new_v4();
        assert!(matches!(
            manager.identify(id, "Ada"),
            Err(DocuqError::SessionNotFound(_))
        ));
        assert!(manager.get(id).is_none());

        let fresh = manager.get_or_start(Some(id));
        assert_ne!(fresh.id, id);
    }

    #[test]
    fn test_sessions_are_independent() {
        let manager = SessionManager::default();
        let a = manager.start().id;
        let b = manager.start().id;

        manager.identify(a, "Ada").unwrap();
        assert_eq!(manager.get(b).unwrap().state, SessionState::Anonymous);
    }

    #[test]
    fn test_end_removes_session() {
        let manager = SessionManager::default();
        let id = manager.start().id;
        assert!(manager.end(id));
        assert!(!manager.end(id));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_idle_sessions_reaped_on_start() {
        let manager = SessionManager::new(SessionManagerConfig {
            idle_timeout: Duration::minutes(5),
            ..Default::default()
        });
        let stale = manager.start().id;
        manager
            .sessions
            .get_mut(&stale)
            .unwrap()
            .last_seen_at = Utc::now() - Duration::minutes(10);

        let fresh = manager.start().id;
        assert!(manager.get(stale).is_none());
        assert!(manager.get(fresh).is_some());
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_reap_idle_without_new_sessions() {
        let manager = SessionManager::new(SessionManagerConfig {
            idle_timeout: Duration::minutes(5),
            ..Default::default()
        });
        let stale = manager.start().id;
        manager.sessions.get_mut(&stale).unwrap().last_seen_at = Utc::now() - Duration::minutes(6);

        assert_eq!(manager.reap_idle(), 1);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_seen() {
        let manager = SessionManager::new(SessionManagerConfig {
            max_sessions: 2,
            ..Default::default()
        });
        let first = manager.start().id;
        let second = manager.start().id;
        manager.sessions.get_mut(&first).unwrap().last_seen_at = Utc::now() - Duration::minutes(1);
        manager.identify(second, "Ada").unwrap();

        let third = manager.start().id;

        assert_eq!(manager.len(), 2);
        assert!(manager.get(first).is_none());
        assert_eq!(manager.get(second).unwrap().state.user_name(), Some("Ada"));
        assert!(manager.get(third).is_some());

        for _ in 0..10 {
            manager.start();
        }
        assert_eq!(manager.len(), 2);
    }
}
