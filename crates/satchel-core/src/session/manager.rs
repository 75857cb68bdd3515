//! SessionManager - the registry of live sessions.

use super::error::{Result, SessionError};
use super::state::{ExpiryCheck, Session, SessionData, SessionId};
use crate::config::{RegistryConfig, DEFAULT_SESSION_TTL};
use crate::event_bus::{EventBus, SessionEvent};
use crate::sync;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// Everything guarded by the manager lock.
#[derive(Default)]
struct RegistryState {
    sessions: HashMap<SessionId, Arc<Session>>,
    default_session: Option<Arc<Session>>,
    avoid_expired: bool,
}

/// Configuration for building a SessionManager.
pub struct SessionManagerBuilder {
    default_ttl: Duration,
    avoid_expired: bool,
    event_bus: Option<Arc<EventBus>>,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self {
            default_ttl: DEFAULT_SESSION_TTL,
            avoid_expired: false,
            event_bus: None,
        }
    }

    /// Apply every setting from a loaded config.
    pub fn config(mut self, config: &RegistryConfig) -> Self {
        self.default_ttl = config.default_ttl();
        self.avoid_expired = config.avoid_expired;
        self
    }

    /// Expiration window for sessions created by this manager.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn avoid_expired(mut self, avoid_expired: bool) -> Self {
        self.avoid_expired = avoid_expired;
        self
    }

    /// Publish lifecycle events to `bus`.
    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn build(self) -> SessionManager {
        SessionManager {
            state: RwLock::new(RegistryState {
                avoid_expired: self.avoid_expired,
                ..RegistryState::default()
            }),
            default_ttl: self.default_ttl,
            event_bus: self.event_bus,
        }
    }
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns every live session, keyed by id, plus an optional default session.
///
/// The manager only tracks membership. Once a caller holds an
/// `Arc<Session>` it reads and writes values on the session directly.
///
/// With `avoid_expired` enabled, lookups treat expired sessions as gone and
/// fail with an `Expired` error. Disabled (the default), expired sessions are
/// returned like any other.
///
/// Destroying the default session leaves the default pointer in place; the
/// detached session stays alive through its `Arc` and can still be queried.
/// Use [`SessionManager::clear_default_session`] to unset it.
pub struct SessionManager {
    state: RwLock<RegistryState>,
    default_ttl: Duration,
    event_bus: Option<Arc<EventBus>>,
}

impl SessionManager {
    pub fn new() -> Self {
        SessionManagerBuilder::new().build()
    }

    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        SessionManagerBuilder::new().config(config).build()
    }

    /// Get a session by ID.
    pub fn get_session(&self, session_id: &SessionId) -> Result<Arc<Session>> {
        let state = sync::read(&self.state);
        let session = state
            .sessions
            .get(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

        if state.avoid_expired && self.observe_expiry(session) {
            return Err(SessionError::Expired(session_id.clone()));
        }
        Ok(Arc::clone(session))
    }

    /// Create an empty session, returning the shared handle.
    pub fn create_session(&self) -> Arc<Session> {
        self.create_session_with(SessionData::new())
    }

    /// Create a session seeded with `data`.
    pub fn create_session_with(&self, data: SessionData) -> Arc<Session> {
        let session = Arc::new(Session::new(data, self.default_ttl));
        let session_id = session.session_id().clone();

        sync::write(&self.state)
            .sessions
            .insert(session_id.clone(), Arc::clone(&session));

        log::debug!("Created session {}", session_id);
        self.emit(SessionEvent::Created { session_id });
        session
    }

    /// Remove a session entirely.
    pub fn destroy_session(&self, session_id: &SessionId) -> Result<()> {
        let was_default = {
            let mut state = sync::write(&self.state);
            let removed = state
                .sessions
                .remove(session_id)
                .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;
            state
                .default_session
                .as_ref()
                .is_some_and(|default| Arc::ptr_eq(default, &removed))
        };

        if was_default {
            log::warn!(
                "Destroyed session {} is still the default session",
                session_id
            );
        } else {
            log::debug!("Destroyed session {}", session_id);
        }
        self.emit(SessionEvent::Destroyed {
            session_id: session_id.clone(),
            was_default,
        });
        Ok(())
    }

    /// Designate a registered session as the default session.
    pub fn set_as_default_session(&self, session_id: &SessionId) -> Result<()> {
        {
            let mut state = sync::write(&self.state);
            let session = state
                .sessions
                .get(session_id)
                .cloned()
                .ok_or_else(|| SessionError::NotFound(session_id.clone()))?;

            if state.avoid_expired && self.observe_expiry(&session) {
                return Err(SessionError::Expired(session_id.clone()));
            }
            state.default_session = Some(session);
        }

        log::debug!("Default session set to {}", session_id);
        self.emit(SessionEvent::DefaultChanged {
            session_id: Some(session_id.clone()),
        });
        Ok(())
    }

    /// Get the default session without knowing its id.
    pub fn get_default_session(&self) -> Result<Arc<Session>> {
        let state = sync::read(&self.state);
        let session = state
            .default_session
            .as_ref()
            .ok_or(SessionError::DefaultNotSet)?;

        if state.avoid_expired && self.observe_expiry(session) {
            return Err(SessionError::DefaultExpired);
        }
        Ok(Arc::clone(session))
    }

    /// Unset the default session. Returns whether one was set.
    pub fn clear_default_session(&self) -> bool {
        let previous = sync::write(&self.state).default_session.take();
        if previous.is_some() {
            log::debug!("Default session cleared");
            self.emit(SessionEvent::DefaultChanged { session_id: None });
        }
        previous.is_some()
    }

    /// Snapshot of every registered session.
    pub fn get_all_sessions(&self) -> HashMap<SessionId, Arc<Session>> {
        sync::read(&self.state).sessions.clone()
    }

    /// Remove every session. Never fails.
    pub fn destroy_all_sessions(&self) {
        let count = std::mem::take(&mut sync::write(&self.state).sessions).len();
        log::info!("Destroyed all sessions ({} removed)", count);
        self.emit(SessionEvent::AllDestroyed { count });
    }

    /// Toggle whether expired sessions are treated as absent.
    ///
    /// Only affects later lookups; handles already given out are untouched.
    pub fn set_avoid_expired(&self, avoid_expired: bool) {
        sync::write(&self.state).avoid_expired = avoid_expired;
        log::info!("Avoid expired sessions: {}", avoid_expired);
        self.emit(SessionEvent::AvoidExpiredChanged {
            enabled: avoid_expired,
        });
    }

    pub fn avoid_expired(&self) -> bool {
        sync::read(&self.state).avoid_expired
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn session_count(&self) -> usize {
        sync::read(&self.state).sessions.len()
    }

    pub fn contains_session(&self, session_id: &SessionId) -> bool {
        sync::read(&self.state).sessions.contains_key(session_id)
    }

    /// Run the session's expiry check, publishing the transition if this call
    /// performed it. Called with the manager lock held; takes the session lock.
    fn observe_expiry(&self, session: &Session) -> bool {
        let check = session.check_expiry();
        if check == ExpiryCheck::JustExpired {
            self.emit(SessionEvent::Expired {
                session_id: session.session_id().clone(),
            });
        }
        check.is_expired()
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(event);
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}
