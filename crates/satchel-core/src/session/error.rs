//! Error taxonomy for sessions and the registry.
//!
//! Every error is local and non-retryable. None of them leaves the manager or
//! a session unusable.

use super::state::SessionId;
use thiserror::Error;

/// Convenience alias used throughout the session module.
pub type Result<T> = std::result::Result<T, SessionError>;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key {0} already exists, delete it first to replace it")]
    KeyAlreadyExists(String),

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    #[error("Session expired: {0}")]
    Expired(SessionId),

    #[error("Default session not set")]
    DefaultNotSet,

    #[error("Default session expired")]
    DefaultExpired,

    #[error("Value for key {key} has an unexpected type: {source}")]
    ValueType {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_not_found_displays_key() {
        let error = SessionError::KeyNotFound("user".to_string());
        assert_eq!(error.to_string(), "Key not found: user");
    }

    #[test]
    fn key_already_exists_mentions_delete() {
        let error = SessionError::KeyAlreadyExists("user".to_string());
        let message = error.to_string();
        assert!(message.contains("user"));
        assert!(message.contains("delete it first"));
    }

    #[test]
    fn not_found_displays_session_id() {
        let error = SessionError::NotFound(SessionId::from("test-123"));
        assert!(error.to_string().contains("test-123"));
    }

    #[test]
    fn expired_displays_session_id() {
        let error = SessionError::Expired(SessionId::from("old-456"));
        assert!(error.to_string().contains("old-456"));
    }

    #[test]
    fn default_errors_have_fixed_messages() {
        assert_eq!(
            SessionError::DefaultNotSet.to_string(),
            "Default session not set"
        );
        assert_eq!(
            SessionError::DefaultExpired.to_string(),
            "Default session expired"
        );
    }

    #[test]
    fn value_type_exposes_source() {
        use std::error::Error as _;

        let source = serde_json::from_value::<u32>(serde_json::json!("nope")).unwrap_err();
        let error = SessionError::ValueType {
            key: "count".to_string(),
            source,
        };
        assert!(error.to_string().contains("count"));
        assert!(error.source().is_some());
    }
}
