//! Single-use callback identifiers issued to JS
//!
//! When JS calls a native method it may pass callbacks; each is registered
//! here and referred to across the boundary by an opaque numeric id. An id
//! settles exactly once. Settling an id twice, or an id that was never
//! issued, is a [`CallbackError`] — a user-code bug, never bridge
//! corruption.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use parking_lot::Mutex;

/// How many settled ids to remember for classifying late double-settles.
const SETTLED_HISTORY: usize = 256;

/// Opaque identifier for a pending JS callback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Get the numeric id value
    pub fn as_u64(self) -> u64 {
        self.0
    }

    /// Create a CallbackId from a raw numeric value
    pub fn from_u64(id: u64) -> Self {
        CallbackId(id)
    }
}

/// Callback settlement error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// The id was never issued by this bridge
    #[error("callback {0} was never issued")]
    Unknown(u64),

    /// The id was issued but already settled once
    #[error("callback {0} was already settled")]
    AlreadySettled(u64),
}

/// Table of pending callback ids.
///
/// Issue and settle may race from any thread; each id settles exactly once.
/// Recently settled ids are kept in a bounded ring so a double settle is
/// reported as [`CallbackError::AlreadySettled`] rather than `Unknown`.
pub struct CallbackRegistry {
    next_id: AtomicU64,
    pending: DashMap<u64, ()>,
    settled: Mutex<VecDeque<u64>>,
}

impl CallbackRegistry {
    /// Create an empty registry. Ids start at 1; 0 is never issued.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            pending: DashMap::new(),
            settled: Mutex::new(VecDeque::with_capacity(SETTLED_HISTORY)),
        }
    }

    /// Issue a fresh callback id.
    pub fn issue(&self) -> CallbackId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pending.insert(id, ());
        CallbackId(id)
    }

    /// Settle an id, invalidating it.
    pub fn settle(&self, id: CallbackId) -> Result<(), CallbackError> {
        if self.pending.remove(&id.0).is_some() {
            let mut settled = self.settled.lock();
            if settled.len() == SETTLED_HISTORY {
                settled.pop_front();
            }
            settled.push_back(id.0);
            return Ok(());
        }

        if self.settled.lock().contains(&id.0) {
            Err(CallbackError::AlreadySettled(id.0))
        } else {
            Err(CallbackError::Unknown(id.0))
        }
    }

    /// Number of callbacks issued but not yet settled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_settle() {
        let registry = CallbackRegistry::new();
        let id = registry.issue();
        assert_eq!(registry.pending_count(), 1);

        registry.settle(id).unwrap();
        assert_eq!(registry.pending_count(), 0);
    }

    #[test]
    fn test_double_settle_classified() {
        let registry = CallbackRegistry::new();
        let id = registry.issue();

        registry.settle(id).unwrap();
        assert_eq!(
            registry.settle(id),
            Err(CallbackError::AlreadySettled(id.as_u64()))
        );
    }

    #[test]
    fn test_unknown_id_rejected() {
        let registry = CallbackRegistry::new();
        assert_eq!(
            registry.settle(CallbackId::from_u64(42)),
            Err(CallbackError::Unknown(42))
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = CallbackRegistry::new();
        let a = registry.issue();
        let b = registry.issue();
        assert_ne!(a, b);
    }
}
