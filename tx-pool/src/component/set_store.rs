//! Component B: the Set Store. Holds each admitted set, keyed the same
//! way across its three coherent views — `spec.md` §4.B requires `sets`,
//! `set_diffs`, and `subscriber_sets` to share one key domain; since a
//! `PooledSet` already carries its own diff and can derive its
//! subscriber view on demand, one table keyed by `TransactionSetId`
//! satisfies all three without risking the maps diverging.

use crate::component::pooled_set::{PooledSet, SubscriberSetView};
use txpool_util::FnvHashMap;
use txpool_types::{Transaction, TransactionId, TransactionSetId};

#[derive(Default)]
pub struct SetStore {
    sets: FnvHashMap<TransactionSetId, PooledSet>,
}

impl SetStore {
    pub fn new() -> Self {
        SetStore::default()
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn contains(&self, id: &TransactionSetId) -> bool {
        self.sets.contains_key(id)
    }

    pub fn get(&self, id: &TransactionSetId) -> Option<&PooledSet> {
        self.sets.get(id)
    }

    pub fn insert(&mut self, set: PooledSet) {
        self.sets.insert(set.id, set);
    }

    pub fn remove(&mut self, id: &TransactionSetId) -> Option<PooledSet> {
        self.sets.remove(id)
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PooledSet> {
        self.sets.values()
    }

    /// Every transaction in every pooled set, flattened — backs the
    /// public `TransactionList` operation.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.sets
            .values()
            .flat_map(|set| set.txns.iter().cloned())
            .collect()
    }

    /// Find a transaction by id, alongside the predecessors inside its
    /// set that appear before it in positional order — the `parents`
    /// the public `Transaction(id)` operation returns.
    pub fn find_transaction(&self, id: &TransactionId) -> Option<(Transaction, Vec<Transaction>)> {
        for set in self.sets.values() {
            if let Some(pos) = set.txns.iter().position(|t| t.id() == *id) {
                let txn = set.txns[pos].clone();
                let parents = set.txns[..pos].to_vec();
                return Some((txn, parents));
            }
        }
        None
    }

    pub fn subscriber_views(&self) -> Vec<SubscriberSetView> {
        self.sets.values().map(PooledSet::to_subscriber_view).collect()
    }
}
