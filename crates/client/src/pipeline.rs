//! Pipeline primitives shared by the feature stores.
//!
//! Two pieces: a watch-backed state cell that presentation subscribes to,
//! and a per-intent-type sequence counter implementing latest-wins
//! supersession. There is no network cancellation anywhere; a superseded
//! effect simply finds its ticket stale and discards its result.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;

/// Reactive state container for one feature.
///
/// Readers take cheap snapshots or subscribe for change notifications;
/// writers mutate in place through `update`, which notifies subscribers
/// once per transition.
pub struct StateCell<S> {
    tx: watch::Sender<S>,
}

impl<S: Clone> StateCell<S> {
    pub(crate) fn new(initial: S) -> Self {
        Self {
            tx: watch::Sender::new(initial),
        }
    }

    /// Snapshot of the current state.
    pub fn get(&self) -> S {
        self.tx.borrow().clone()
    }

    /// Apply one state transition.
    pub fn update(&self, transition: impl FnOnce(&mut S)) {
        self.tx.send_modify(transition);
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.tx.subscribe()
    }
}

/// Per-intent-type submission counter.
///
/// Each submission takes a ticket; a result is committed only while its
/// ticket is still the most recent. Submitting a new intent of the same
/// type invalidates every outstanding ticket.
#[derive(Default)]
pub(crate) struct IntentSeq(AtomicU64);

impl IntentSeq {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a new submission and return its ticket.
    pub(crate) fn begin(&self) -> Ticket<'_> {
        let seq = self.0.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket { seq, counter: &self.0 }
    }
}

/// Proof of being (or having been) the latest submission of an intent type.
pub(crate) struct Ticket<'a> {
    seq: u64,
    counter: &'a AtomicU64,
}

impl Ticket<'_> {
    /// Whether no newer submission of this intent type exists.
    pub(crate) fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_ticket_is_current() {
        let seq = IntentSeq::new();
        let ticket = seq.begin();
        assert!(ticket.is_current());
    }

    #[test]
    fn test_newer_submission_supersedes_older() {
        let seq = IntentSeq::new();
        let first = seq.begin();
        let second = seq.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
    }

    #[test]
    fn test_supersession_is_order_independent() {
        // Whichever order results arrive in, only the latest commits.
        let seq = IntentSeq::new();
        let a = seq.begin();
        let b = seq.begin();
        // "b resolves first"
        assert!(b.is_current());
        // "a resolves later" - still stale
        assert!(!a.is_current());
    }

    #[test]
    fn test_state_cell_snapshot_and_update() {
        let cell = StateCell::new(0u32);
        cell.update(|v| *v += 1);
        assert_eq!(cell.get(), 1);
    }

    #[tokio::test]
    async fn test_state_cell_notifies_subscribers() {
        let cell = StateCell::new(0u32);
        let mut rx = cell.subscribe();
        cell.update(|v| *v = 7);
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), 7);
    }
}
