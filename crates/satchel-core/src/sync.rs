//! Lock helpers shared by the two lock domains.
//!
//! The registry has exactly two kinds of lock:
//!
//! 1. The manager lock, guarding session membership, the default pointer
//!    and the avoid-expired flag.
//! 2. One lock per session, guarding that session's values and expiration
//!    fields.
//!
//! The manager lock may be held while a session lock is taken (expiry checks
//! during lookup). A session lock is never held while taking the manager lock.
//!
//! Everything behind these locks is plain maps and flags that are consistent
//! between statements, so a poisoned lock is recovered instead of propagated.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Acquire a shared guard, recovering from poisoning.
pub(crate) fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Acquire an exclusive guard, recovering from poisoning.
pub(crate) fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}
