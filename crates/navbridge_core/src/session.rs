use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;

use crate::error::{CoreError, Domain, ErrorKind, NavErrorCode};

/// The single claim a surface holds over the shared navigation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationSession {
    pub owner_id: String,
    pub acquired_at: SystemTime,
}

/// Process-wide mutual-exclusion gate: at most one active navigation session.
///
/// Intended use (surface layer):
/// - `acquire()` before the first route request of a session
/// - `release()` during cleanup (stop, unmount, fatal error)
///
/// `acquire` never waits; a `false` result tells the caller to enter
/// `Errored(NAVIGATION_SESSION_CONFLICT)`.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    slot: Mutex<Option<NavigationSession>>,
}

impl SessionRegistry {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Claim the slot for `owner_id`. Re-acquiring an owned slot succeeds.
    pub fn acquire(&self, owner_id: &str) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(session) if session.owner_id == owner_id => true,
            Some(session) => {
                tracing::debug!(
                    owner = %session.owner_id,
                    requester = owner_id,
                    "navigation session already owned"
                );
                false
            }
            None => {
                *slot = Some(NavigationSession {
                    owner_id: owner_id.to_string(),
                    acquired_at: SystemTime::now(),
                });
                true
            }
        }
    }

    /// Clear the slot if and only if `owner_id` holds it.
    ///
    /// Returns whether the slot was released. A stale release from a previous
    /// owner never evicts the current one.
    pub fn release(&self, owner_id: &str) -> bool {
        let mut slot = self.lock();
        match slot.as_ref() {
            Some(session) if session.owner_id == owner_id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    pub fn current_owner(&self) -> Option<String> {
        self.lock().as_ref().map(|s| s.owner_id.clone())
    }

    pub fn active_session(&self) -> Option<NavigationSession> {
        self.lock().clone()
    }

    pub fn is_held_by(&self, owner_id: &str) -> bool {
        self.lock()
            .as_ref()
            .is_some_and(|s| s.owner_id == owner_id)
    }

    // The slot holds plain data, so a poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, Option<NavigationSession>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Error reported when `acquire` fails for `owner_id`.
pub fn session_conflict(owner_id: &str) -> CoreError {
    tracing::warn!(requester = owner_id, "navigation session conflict");
    CoreError::warn()
        .domain(Domain::Session)
        .kind(ErrorKind::Conflict)
        .msg(NavErrorCode::NavigationSessionConflict.user_message())
        .code(NavErrorCode::NavigationSessionConflict)
        .build()
}
