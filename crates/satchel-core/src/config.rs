//! Registry configuration.
//!
//! Loaded from JSON the same way the rest of the crate persists settings,
//! with every field optional:
//!
//! ```rust
//! use satchel_core::config::RegistryConfig;
//!
//! let config = RegistryConfig::from_json_str(r#"{ "default_ttl_secs": 60 }"#).unwrap();
//! assert_eq!(config.default_ttl_secs, 60);
//! assert!(!config.avoid_expired);
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Expiration window applied to sessions when the caller does not set one.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for a [`SessionManager`](crate::session::SessionManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds from creation until a new session expires.
    pub default_ttl_secs: u64,

    /// Treat expired sessions as absent on lookup.
    pub avoid_expired: bool,
}

impl RegistryConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: DEFAULT_SESSION_TTL.as_secs(),
            avoid_expired: false,
        }
    }
}
