//! Sessions and the registry that owns them.
//!
//! A [`Session`] is a lockable bag of JSON values with a lazily checked
//! expiration time. The [`SessionManager`] maps ids to shared session handles
//! and tracks an optional default session.

mod error;
mod manager;
mod state;
mod traits;

pub use error::{Result, SessionError};
pub use manager::{SessionManager, SessionManagerBuilder};
pub use state::{Session, SessionData, SessionId};
pub use traits::{DefaultSessionStore, ExpiringSession, KeyValueSession, SessionStore};
