//! # satchel-core
//!
//! An in-process session registry: short-lived, mutable key-value bags
//! identified by unique ids, with lazy expiration and an optional default
//! session for callers that do not want to track an id.
//!
//! ## Key Concepts
//!
//! - **Session**: a lockable bag of JSON values with its own expiration state
//! - **SessionManager**: the registry mapping ids to shared session handles
//! - **Default session**: a manager-level pointer to one session
//! - **avoid_expired**: policy making lookups treat expired sessions as gone
//!
//! ```rust
//! use satchel_core::{SessionError, SessionManager};
//!
//! let manager = SessionManager::new();
//! let session = manager.create_session();
//! manager.set_as_default_session(session.session_id()).unwrap();
//!
//! let default = manager.get_default_session().unwrap();
//! default.set("user", "alice").unwrap();
//! assert_eq!(session.get("user").unwrap(), "alice");
//! assert!(matches!(
//!     session.set("user", "bob"),
//!     Err(SessionError::KeyAlreadyExists(_))
//! ));
//! ```

pub mod config;
pub mod event_bus;
pub mod session;
mod sync;

// Re-export commonly used types
pub use config::RegistryConfig;
pub use event_bus::{EventBus, SessionEvent};
pub use session::{Session, SessionError, SessionId, SessionManager};
