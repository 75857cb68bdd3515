//! Per-session state.

use super::error::{Result, SessionError};
use crate::config::DEFAULT_SESSION_TTL;
use crate::sync;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

/// Values held by a session. Callers cast them back to concrete types.
pub type SessionData = HashMap<String, Value>;

/// Unique identifier for a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Outcome of a single expiry evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExpiryCheck {
    Fresh,
    /// Was already expired before this check.
    Expired,
    /// This check performed the fresh -> expired transition.
    JustExpired,
}

impl ExpiryCheck {
    pub(crate) fn is_expired(self) -> bool {
        !matches!(self, ExpiryCheck::Fresh)
    }
}

struct SessionState {
    data: SessionData,
    expiration_time: DateTime<Utc>,
    expired: bool,
    active: bool,
}

/// A lockable bag of values with identity and lazy expiration.
///
/// Sessions are handed out as `Arc<Session>`; every holder sees the same
/// values. Each session has its own lock, so work on one session never waits
/// on another.
///
/// Expiration is evaluated only when [`Session::is_expired`] runs (directly
/// or through the manager). Once a session has expired it stays expired,
/// even if its expiration time is later moved into the future.
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    state: RwLock<SessionState>,
}

impl Session {
    /// Create a session holding `data` that expires `ttl` from now.
    pub fn new(data: SessionData, ttl: Duration) -> Self {
        let created_at = Utc::now();
        let expiration_time = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| created_at.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            id: SessionId::new(),
            created_at,
            state: RwLock::new(SessionState {
                data,
                expiration_time,
                expired: false,
                active: true,
            }),
        }
    }

    /// Create a session seeded with `data` and the default five minute window.
    pub fn with_data(data: SessionData) -> Self {
        Self::new(data, DEFAULT_SESSION_TTL)
    }

    /// Get a value. Fails if the key is absent.
    pub fn get(&self, key: &str) -> Result<Value> {
        sync::read(&self.state)
            .data
            .get(key)
            .cloned()
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    /// Get a value and deserialize it into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.get(key)?;
        serde_json::from_value(value).map_err(|source| SessionError::ValueType {
            key: key.to_string(),
            source,
        })
    }

    /// Insert a value. Existing keys are never overwritten; delete first.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<()> {
        let mut state = sync::write(&self.state);
        match state.data.entry(key.into()) {
            Entry::Occupied(entry) => Err(SessionError::KeyAlreadyExists(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(value.into());
                Ok(())
            }
        }
    }

    /// Remove a value. Fails if the key is absent.
    pub fn delete(&self, key: &str) -> Result<()> {
        sync::write(&self.state)
            .data
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| SessionError::KeyNotFound(key.to_string()))
    }

    pub fn session_id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn contains_key(&self, key: &str) -> bool {
        sync::read(&self.state).data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        sync::read(&self.state).data.len()
    }

    pub fn is_empty(&self) -> bool {
        sync::read(&self.state).data.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        sync::read(&self.state).data.keys().cloned().collect()
    }

    /// Copy of all values at this moment.
    pub fn snapshot(&self) -> SessionData {
        sync::read(&self.state).data.clone()
    }

    pub fn expiration_time(&self) -> DateTime<Utc> {
        sync::read(&self.state).expiration_time
    }

    /// Move the expiration time. Does not evaluate expiry and cannot revive
    /// a session that has already expired.
    pub fn set_expiration_time(&self, expiration_time: DateTime<Utc>) {
        sync::write(&self.state).expiration_time = expiration_time;
    }

    pub fn is_expired(&self) -> bool {
        self.check_expiry().is_expired()
    }

    pub fn is_active(&self) -> bool {
        sync::read(&self.state).active
    }

    /// Evaluate expiry, performing the one-way transition if it is due.
    ///
    /// The read guard is released before the write guard is taken, and the
    /// condition is re-checked under the write guard since another thread
    /// may have expired the session in between.
    pub(crate) fn check_expiry(&self) -> ExpiryCheck {
        let now = Utc::now();
        {
            let state = sync::read(&self.state);
            if state.expired {
                return ExpiryCheck::Expired;
            }
            if !(state.active && now > state.expiration_time) {
                return ExpiryCheck::Fresh;
            }
        }

        let mut state = sync::write(&self.state);
        if state.expired {
            return ExpiryCheck::Expired;
        }
        if state.active && now > state.expiration_time {
            state.expired = true;
            state.active = false;
            log::debug!("Session {} expired at {}", self.id, state.expiration_time);
            return ExpiryCheck::JustExpired;
        }
        ExpiryCheck::Fresh
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_data(SessionData::new())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = sync::read(&self.state);
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("keys", &state.data.len())
            .field("expiration_time", &state.expiration_time)
            .field("expired", &state.expired)
            .field("active", &state.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn in_the_past() -> DateTime<Utc> {
        Utc::now() - chrono::Duration::seconds(1)
    }

    mod session_id {
        use super::*;

        #[test]
        fn new_generates_unique_ids() {
            let id1 = SessionId::new();
            let id2 = SessionId::new();
            assert_ne!(id1, id2);
        }

        #[test]
        fn new_is_uuid_formatted() {
            let id = SessionId::new();
            assert_eq!(id.as_str().len(), 36);
            assert!(Uuid::parse_str(id.as_str()).is_ok());
        }

        #[test]
        fn default_generates_unique_id() {
            let id1 = SessionId::default();
            let id2 = SessionId::default();
            assert_ne!(id1, id2);
        }

        #[test]
        fn display_shows_inner_string() {
            let id = SessionId::from("test-session-123");
            assert_eq!(format!("{}", id), "test-session-123");
        }

        #[test]
        fn from_string_and_str_agree() {
            assert_eq!(SessionId::from("abc"), SessionId::from("abc".to_string()));
        }

        #[test]
        fn serializes_as_plain_string() {
            let id = SessionId::from("test-session-456");
            let json = serde_json::to_string(&id).unwrap();
            assert_eq!(json, "\"test-session-456\"");
        }
    }

    mod values {
        use super::*;

        #[test]
        fn get_missing_key_fails() {
            let session = Session::default();
            let err = session.get("missing").unwrap_err();
            assert!(matches!(err, SessionError::KeyNotFound(key) if key == "missing"));
        }

        #[test]
        fn set_then_get_returns_value() {
            let session = Session::default();
            session.set("user", "alice").unwrap();
            assert_eq!(session.get("user").unwrap(), json!("alice"));
        }

        #[test]
        fn set_existing_key_fails_and_keeps_original() {
            let session = Session::default();
            session.set("user", "alice").unwrap();

            let err = session.set("user", "bob").unwrap_err();
            assert!(matches!(err, SessionError::KeyAlreadyExists(key) if key == "user"));
            assert_eq!(session.get("user").unwrap(), json!("alice"));
        }

        #[test]
        fn delete_removes_key() {
            let session = Session::default();
            session.set("user", "alice").unwrap();
            session.delete("user").unwrap();
            assert!(matches!(
                session.get("user"),
                Err(SessionError::KeyNotFound(_))
            ));
        }

        #[test]
        fn delete_missing_key_fails_without_side_effects() {
            let session = Session::default();
            session.set("keep", 1).unwrap();

            assert!(matches!(
                session.delete("missing"),
                Err(SessionError::KeyNotFound(_))
            ));
            assert!(matches!(
                session.delete("missing"),
                Err(SessionError::KeyNotFound(_))
            ));
            assert_eq!(session.snapshot(), SessionData::from([("keep".to_string(), json!(1))]));
        }

        #[test]
        fn delete_then_set_replaces_value() {
            let session = Session::default();
            session.set("count", 1).unwrap();
            session.delete("count").unwrap();
            session.set("count", 2).unwrap();
            assert_eq!(session.get("count").unwrap(), json!(2));
        }

        #[test]
        fn stores_structured_values() {
            let session = Session::default();
            session
                .set("profile", json!({"name": "alice", "roles": ["admin"]}))
                .unwrap();

            let profile = session.get("profile").unwrap();
            assert_eq!(profile["roles"][0], "admin");
        }

        #[test]
        fn get_as_casts_to_concrete_type() {
            let session = Session::default();
            session.set("count", 42).unwrap();
            let count: u32 = session.get_as("count").unwrap();
            assert_eq!(count, 42);
        }

        #[test]
        fn get_as_reports_wrong_type() {
            let session = Session::default();
            session.set("count", "forty-two").unwrap();
            let err = session.get_as::<u32>("count").unwrap_err();
            assert!(matches!(err, SessionError::ValueType { key, .. } if key == "count"));
        }

        #[test]
        fn with_data_seeds_values() {
            let data = SessionData::from([
                ("a".to_string(), json!(1)),
                ("b".to_string(), json!(true)),
            ]);
            let session = Session::with_data(data);

            assert_eq!(session.len(), 2);
            assert!(session.contains_key("a"));
            let mut keys = session.keys();
            keys.sort();
            assert_eq!(keys, vec!["a", "b"]);
        }

        #[test]
        fn default_is_empty() {
            let session = Session::default();
            assert!(session.is_empty());
            assert_eq!(session.len(), 0);
        }

        #[test]
        fn session_id_is_stable() {
            let session = Session::default();
            let id = session.session_id().clone();
            session.set("k", "v").unwrap();
            assert_eq!(session.session_id(), &id);
        }
    }

    mod expiration {
        use super::*;

        #[test]
        fn new_session_is_fresh_and_active() {
            let session = Session::default();
            assert!(!session.is_expired());
            assert!(session.is_active());
        }

        #[test]
        fn default_window_is_five_minutes() {
            let session = Session::default();
            let window = session.expiration_time() - session.created_at();
            assert_eq!(window, chrono::Duration::minutes(5));
        }

        #[test]
        fn custom_ttl_sets_window() {
            let session = Session::new(SessionData::new(), Duration::from_secs(30));
            let window = session.expiration_time() - session.created_at();
            assert_eq!(window, chrono::Duration::seconds(30));
        }

        #[test]
        fn huge_ttl_saturates() {
            let session = Session::new(SessionData::new(), Duration::MAX);
            assert_eq!(session.expiration_time(), DateTime::<Utc>::MAX_UTC);
            assert!(!session.is_expired());
        }

        #[test]
        fn past_expiration_expires_and_deactivates() {
            let session = Session::default();
            session.set_expiration_time(in_the_past());

            assert!(session.is_active());
            assert!(session.is_expired());
            assert!(!session.is_active());
        }

        #[test]
        fn set_expiration_time_does_not_evaluate() {
            let session = Session::default();
            session.set_expiration_time(in_the_past());
            assert!(session.is_active());
        }

        #[test]
        fn expiry_is_sticky() {
            let session = Session::default();
            session.set_expiration_time(in_the_past());
            assert!(session.is_expired());

            session.set_expiration_time(Utc::now() + chrono::Duration::hours(1));
            assert!(session.is_expired());
            assert!(!session.is_active());
        }

        #[test]
        fn check_expiry_reports_transition_once() {
            let session = Session::default();
            assert_eq!(session.check_expiry(), ExpiryCheck::Fresh);

            session.set_expiration_time(in_the_past());
            assert_eq!(session.check_expiry(), ExpiryCheck::JustExpired);
            assert_eq!(session.check_expiry(), ExpiryCheck::Expired);
        }

        #[test]
        fn values_remain_usable_after_expiry() {
            let session = Session::default();
            session.set_expiration_time(in_the_past());
            assert!(session.is_expired());

            session.set("late", true).unwrap();
            assert_eq!(session.get("late").unwrap(), json!(true));
        }
    }

    #[test]
    fn debug_omits_values() {
        let session = Session::default();
        session.set("secret", "hunter2").unwrap();
        let debug = format!("{:?}", session);
        assert!(debug.contains("Session"));
        assert!(!debug.contains("hunter2"));
    }
}
