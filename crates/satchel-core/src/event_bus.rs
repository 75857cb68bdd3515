//! Session lifecycle broadcasting.
//!
//! A [`SessionManager`](crate::session::SessionManager) built with an
//! `EventBus` publishes a [`SessionEvent`] whenever registry membership,
//! the default pointer or the avoid-expired policy changes, and when a lookup
//! observes a session expiring.
//!
//! # Example
//!
//! ```rust
//! use satchel_core::event_bus::{EventBus, SessionEvent};
//! use satchel_core::SessionManager;
//! use std::sync::Arc;
//!
//! let bus = Arc::new(EventBus::new());
//! let mut rx = bus.subscribe();
//!
//! let manager = SessionManager::builder().event_bus(Arc::clone(&bus)).build();
//! let session = manager.create_session();
//!
//! let event = rx.try_recv().unwrap();
//! assert_eq!(event, SessionEvent::Created { session_id: session.session_id().clone() });
//! ```

use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity for the event bus.
/// Events beyond this capacity will cause slow subscribers to miss events (lag).
const DEFAULT_CAPACITY: usize = 1024;

/// Something that happened to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    Created {
        session_id: SessionId,
    },
    Destroyed {
        session_id: SessionId,
        /// The destroyed session was also the default session.
        was_default: bool,
    },
    /// A lookup performed the session's fresh -> expired transition.
    Expired {
        session_id: SessionId,
    },
    DefaultChanged {
        session_id: Option<SessionId>,
    },
    AllDestroyed {
        count: usize,
    },
    AvoidExpiredChanged {
        enabled: bool,
    },
}

impl SessionEvent {
    /// Event type identifier, e.g. `session:created`.
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::Created { .. } => "session:created",
            SessionEvent::Destroyed { .. } => "session:destroyed",
            SessionEvent::Expired { .. } => "session:expired",
            SessionEvent::DefaultChanged { .. } => "session:default_changed",
            SessionEvent::AllDestroyed { .. } => "session:all_destroyed",
            SessionEvent::AvoidExpiredChanged { .. } => "session:avoid_expired_changed",
        }
    }
}

/// Broadcasts session events to any number of subscribers.
///
/// Sending never blocks and needs no async runtime; subscribers can drain
/// with `try_recv` or await `recv` inside tokio.
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a new EventBus with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new EventBus with specified capacity.
    ///
    /// The capacity determines how many events can be buffered before slow
    /// subscribers start missing events (experiencing lag).
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event.
    /// If there are no subscribers, the event is dropped and 0 is returned.
    pub fn emit(&self, event: SessionEvent) -> usize {
        log::trace!("emit {}", event.event_type());
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe to all future events on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Get the current number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
