//! Capability traits for sessions and registries.
//!
//! [`KeyValueSession`] and [`SessionStore`] are the minimal surface: values
//! plus create, lookup and destroy. [`ExpiringSession`] and
//! [`DefaultSessionStore`] add expiration, the default-session pointer and
//! bulk operations. [`Session`] and [`SessionManager`] implement both levels,
//! so code that needs only the minimal surface can be written against it.

use super::error::Result;
use super::manager::SessionManager;
use super::state::{Session, SessionId};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// A bag of values with a stable identity.
pub trait KeyValueSession: Send + Sync {
    /// Get a value. Fails with `KeyNotFound` if absent.
    fn get(&self, key: &str) -> Result<Value>;

    /// Insert a value. Fails with `KeyAlreadyExists` rather than overwrite.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Remove a value. Fails with `KeyNotFound` if absent.
    fn delete(&self, key: &str) -> Result<()>;

    fn session_id(&self) -> &SessionId;
}

/// A session with lazy, one-way expiration.
pub trait ExpiringSession: KeyValueSession {
    fn set_expiration_time(&self, expiration_time: DateTime<Utc>);

    fn is_expired(&self) -> bool;

    fn is_active(&self) -> bool;
}

/// A registry that can create, look up and destroy sessions.
pub trait SessionStore: Send + Sync {
    type Session: KeyValueSession;

    fn get_session(&self, session_id: &SessionId) -> Result<Arc<Self::Session>>;

    fn create_session(&self) -> Arc<Self::Session>;

    fn destroy_session(&self, session_id: &SessionId) -> Result<()>;
}

/// A registry with a default session, bulk operations and an expiry policy.
pub trait DefaultSessionStore: SessionStore {
    fn set_as_default_session(&self, session_id: &SessionId) -> Result<()>;

    fn get_default_session(&self) -> Result<Arc<Self::Session>>;

    fn get_all_sessions(&self) -> HashMap<SessionId, Arc<Self::Session>>;

    fn destroy_all_sessions(&self);

    fn set_avoid_expired(&self, avoid_expired: bool);
}

impl KeyValueSession for Session {
    fn get(&self, key: &str) -> Result<Value> {
        Session::get(self, key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        Session::set(self, key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        Session::delete(self, key)
    }

    fn session_id(&self) -> &SessionId {
        Session::session_id(self)
    }
}

impl ExpiringSession for Session {
    fn set_expiration_time(&self, expiration_time: DateTime<Utc>) {
        Session::set_expiration_time(self, expiration_time)
    }

    fn is_expired(&self) -> bool {
        Session::is_expired(self)
    }

    fn is_active(&self) -> bool {
        Session::is_active(self)
    }
}

impl SessionStore for SessionManager {
    type Session = Session;

    fn get_session(&self, session_id: &SessionId) -> Result<Arc<Session>> {
        SessionManager::get_session(self, session_id)
    }

    fn create_session(&self) -> Arc<Session> {
        SessionManager::create_session(self)
    }

    fn destroy_session(&self, session_id: &SessionId) -> Result<()> {
        SessionManager::destroy_session(self, session_id)
    }
}

impl DefaultSessionStore for SessionManager {
    fn set_as_default_session(&self, session_id: &SessionId) -> Result<()> {
        SessionManager::set_as_default_session(self, session_id)
    }

    fn get_default_session(&self) -> Result<Arc<Session>> {
        SessionManager::get_default_session(self)
    }

    fn get_all_sessions(&self) -> HashMap<SessionId, Arc<Session>> {
        SessionManager::get_all_sessions(self)
    }

    fn destroy_all_sessions(&self) {
        SessionManager::destroy_all_sessions(self)
    }

    fn set_avoid_expired(&self, avoid_expired: bool) {
        SessionManager::set_avoid_expired(self, avoid_expired)
    }
}
