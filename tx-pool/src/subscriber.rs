//! Component G: the Subscriber Bus. Delivers every admitted or
//! reverted set to each subscriber synchronously, in the call that
//! produced the change, and hands a brand-new subscriber the full
//! current Set Store as its first delivery — so no subscriber can ever
//! observe a gap between "what the pool had when I subscribed" and
//! "the next change I'm told about".
//!
//! Modeled on `ckb-notify`'s registration/notification split, simplified
//! from that crate's background-thread channel fan-out down to direct,
//! synchronous trait-object calls: this pool's lock discipline already
//! serializes every state-mutating call, so there is no concurrent
//! notification path to protect against the way the legacy actor-style
//! notifier does.

use crate::component::{AdmissionOutcome, SubscriberSetView};
use std::sync::Arc;

/// One delta delivered to a subscriber: either a newly admitted set, or
/// the sets a reorg reverted and the sets it re-admitted in their place.
#[derive(Clone, Debug)]
pub enum TransactionPoolDiff {
    AppliedTransactions(SubscriberSetView),
    RevertedTransactions(Vec<SubscriberSetView>),
}

/// A consumer of pool updates. Implementors must return promptly:
/// delivery happens inline on whatever thread called the mutating
/// operation, while the pool's lock is held.
pub trait Subscriber: Send + Sync {
    /// Called once, immediately after subscribing, with every set
    /// currently pooled.
    fn on_subscribe(&self, current: &[SubscriberSetView]);
    /// Called for every subsequent change.
    fn on_diff(&self, diff: &TransactionPoolDiff);
}

#[derive(Default)]
pub struct SubscriberBus {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl SubscriberBus {
    pub fn new() -> Self {
        SubscriberBus::default()
    }

    /// `TransactionPoolSubscribe`: registers `subscriber` and
    /// immediately replays `current` to it.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>, current: &[SubscriberSetView]) {
        subscriber.on_subscribe(current);
        self.subscribers.push(subscriber);
    }

    /// `TransactionPoolUnsubscribe`. Removes every registration pointing
    /// at the same subscriber (by `Arc` identity).
    pub fn unsubscribe(&mut self, subscriber: &Arc<dyn Subscriber>) {
        self.subscribers
            .retain(|s| !Arc::ptr_eq(s, subscriber));
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn notify_admission(&self, outcome: &AdmissionOutcome) {
        if !outcome.reverted.is_empty() {
            self.broadcast(&TransactionPoolDiff::RevertedTransactions(
                outcome.reverted.clone(),
            ));
        }
        self.broadcast(&TransactionPoolDiff::AppliedTransactions(
            outcome.applied.clone(),
        ));
    }

    /// A reorg's applied sets are delivered oldest-first, one
    /// `AppliedTransactions` diff per re-admitted set, after a single
    /// `RevertedTransactions` diff carrying everything the drain step
    /// dropped.
    pub fn notify_reorg(&self, reverted: Vec<SubscriberSetView>, applied: Vec<SubscriberSetView>) {
        if reverted.is_empty() && applied.is_empty() {
            return;
        }
        if !reverted.is_empty() {
            self.broadcast(&TransactionPoolDiff::RevertedTransactions(reverted));
        }
        for view in applied {
            self.broadcast(&TransactionPoolDiff::AppliedTransactions(view));
        }
    }

    fn broadcast(&self, diff: &TransactionPoolDiff) {
        for subscriber in &self.subscribers {
            subscriber.on_diff(diff);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct RecordingSubscriber {
        subscribed_with: Mutex<usize>,
        diffs: Mutex<Vec<TransactionPoolDiff>>,
    }

    impl RecordingSubscriber {
        fn new() -> Arc<Self> {
            Arc::new(RecordingSubscriber {
                subscribed_with: Mutex::new(0),
                diffs: Mutex::new(Vec::new()),
            })
        }
    }

    impl Subscriber for RecordingSubscriber {
        fn on_subscribe(&self, current: &[SubscriberSetView]) {
            *self.subscribed_with.lock() = current.len();
        }

        fn on_diff(&self, diff: &TransactionPoolDiff) {
            self.diffs.lock().push(diff.clone());
        }
    }

    #[test]
    fn subscribing_replays_the_current_snapshot() {
        let mut bus = SubscriberBus::new();
        let subscriber = RecordingSubscriber::new();
        let snapshot = vec![SubscriberSetView {
            id: txpool_types::TransactionSetId::zero(),
            member_ids: Vec::new(),
            member_sizes: Vec::new(),
            txns: Vec::new(),
        }];
        bus.subscribe(subscriber.clone(), &snapshot);
        assert_eq!(*subscriber.subscribed_with.lock(), 1);
    }

    #[test]
    fn unsubscribe_stops_further_delivery() {
        let mut bus = SubscriberBus::new();
        let subscriber = RecordingSubscriber::new();
        bus.subscribe(subscriber.clone(), &[]);
        bus.unsubscribe(&subscriber);
        assert_eq!(bus.len(), 0);
    }
}
