//! Idle/busy tracker — counts in-flight native→JS calls
//!
//! The bridge is busy while the in-flight counter is non-zero. The counter
//! increments on each native→JS dispatch and decrements when the JS side
//! signals batch completion. Registered listeners are notified exactly once
//! per edge (idle→busy, busy→idle); same-state signals notify nobody.
//!
//! Listeners must be passive with respect to bridge state and must not
//! assume any particular notification thread. This is a documented
//! contract, not something the tracker enforces.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Observer of bridge idle/busy transitions.
pub trait IdleListener: Send + Sync {
    /// The in-flight counter went 0 → 1.
    fn on_transition_to_busy(&self);

    /// The in-flight counter went 1 → 0.
    fn on_transition_to_idle(&self);
}

/// Tracks the number of unresolved native→JS calls and fans out edge
/// notifications.
pub struct IdleTracker {
    in_flight: AtomicUsize,
    listeners: Mutex<Vec<Arc<dyn IdleListener>>>,
}

impl IdleTracker {
    /// Create an idle tracker with no listeners.
    pub fn new() -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Register a listener. Idempotent: adding a listener that is already
    /// present is a no-op, so a listener never receives duplicate
    /// notifications for one edge.
    pub fn add_listener(&self, listener: Arc<dyn IdleListener>) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    /// Remove a previously registered listener. Unknown listeners are
    /// ignored.
    pub fn remove_listener(&self, listener: &Arc<dyn IdleListener>) {
        self.listeners
            .lock()
            .retain(|l| !Arc::ptr_eq(l, listener));
    }

    /// Record a native→JS call dispatch. Notifies listeners on the 0 → 1
    /// edge.
    pub fn on_dispatch(&self) {
        let prev = self.in_flight.fetch_add(1, Ordering::AcqRel);
        if prev == 0 {
            for listener in self.snapshot() {
                listener.on_transition_to_busy();
            }
        }
    }

    /// Record a batch completion signaled by the JS side. Notifies
    /// listeners on the 1 → 0 edge. A completion with nothing in flight is
    /// logged and otherwise ignored; the counter never underflows.
    pub fn on_batch_complete(&self) {
        let prev = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match prev {
            Ok(1) => {
                for listener in self.snapshot() {
                    listener.on_transition_to_idle();
                }
            }
            Ok(_) => {}
            Err(_) => {
                tracing::warn!("batch completion signaled while bridge was idle");
            }
        }
    }

    /// Whether no native→JS call is currently unresolved.
    pub fn is_idle(&self) -> bool {
        self.in_flight.load(Ordering::Acquire) == 0
    }

    /// Number of unresolved native→JS calls.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    fn snapshot(&self) -> Vec<Arc<dyn IdleListener>> {
        self.listeners.lock().clone()
    }
}

impl Default for IdleTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CountingListener {
        busy: AtomicUsize,
        idle: AtomicUsize,
    }

    impl IdleListener for CountingListener {
        fn on_transition_to_busy(&self) {
            self.busy.fetch_add(1, Ordering::SeqCst);
        }

        fn on_transition_to_idle(&self) {
            self.idle.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_single_cycle_notifies_once_per_edge() {
        let tracker = IdleTracker::new();
        let listener = Arc::new(CountingListener::default());
        tracker.add_listener(listener.clone());

        assert!(tracker.is_idle());
        tracker.on_dispatch();
        assert!(!tracker.is_idle());
        tracker.on_batch_complete();
        assert!(tracker.is_idle());

        assert_eq!(listener.busy.load(Ordering::SeqCst), 1);
        assert_eq!(listener.idle.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_no_notification_on_same_state_signals() {
        let tracker = IdleTracker::new();
        let listener = Arc::new(CountingListener::default());
        tracker.add_listener(listener.clone());

        // busy → busy transitions produce no extra notifications
        tracker.on_dispatch();
        tracker.on_dispatch();
        tracker.on_dispatch();
        tracker.on_batch_complete();
        tracker.on_batch_complete();
        tracker.on_batch_complete();

        assert_eq!(listener.busy.load(Ordering::SeqCst), 1);
        assert_eq!(listener.idle.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_every_listener_notified() {
        let tracker = IdleTracker::new();
        let listeners: Vec<_> = (0..4)
            .map(|_| Arc::new(CountingListener::default()))
            .collect();
        for listener in &listeners {
            tracker.add_listener(listener.clone());
        }

        tracker.on_dispatch();
        tracker.on_batch_complete();

        for listener in &listeners {
            assert_eq!(listener.busy.load(Ordering::SeqCst), 1);
            assert_eq!(listener.idle.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_duplicate_add_is_idempotent() {
        let tracker = IdleTracker::new();
        let listener = Arc::new(CountingListener::default());
        tracker.add_listener(listener.clone());
        tracker.add_listener(listener.clone());

        tracker.on_dispatch();
        assert_eq!(listener.busy.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_listener_not_notified() {
        let tracker = IdleTracker::new();
        let listener = Arc::new(CountingListener::default());
        let as_dyn: Arc<dyn IdleListener> = listener.clone();
        tracker.add_listener(as_dyn.clone());
        tracker.remove_listener(&as_dyn);

        tracker.on_dispatch();
        assert_eq!(listener.busy.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_spurious_completion_does_not_underflow() {
        let tracker = IdleTracker::new();
        tracker.on_batch_complete();
        assert!(tracker.is_idle());
        assert_eq!(tracker.in_flight(), 0);
    }
}
