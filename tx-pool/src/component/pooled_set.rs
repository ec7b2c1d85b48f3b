//! The `PooledSet` entity `spec.md` §3 describes: an admitted,
//! consensus-validated group of transactions, the diff consensus
//! returned for it, and its encoded size.

use txpool_types::{ConsensusDiff, Transaction, TransactionSetId};

#[derive(Clone, Debug)]
pub struct PooledSet {
    pub id: TransactionSetId,
    pub txns: Vec<Transaction>,
    pub diff: ConsensusDiff,
    pub encoded_size: u64,
}

impl PooledSet {
    pub fn new(txns: Vec<Transaction>, diff: ConsensusDiff) -> Self {
        let id = txpool_types::transaction_set_id(&txns);
        let encoded_size = txpool_types::encoded_size(&txns);
        PooledSet {
            id,
            txns,
            diff,
            encoded_size,
        }
    }

    /// The shape returned to subscribers: id, member ids/sizes/txns.
    pub fn to_subscriber_view(&self) -> SubscriberSetView {
        SubscriberSetView {
            id: self.id,
            member_ids: self.txns.iter().map(Transaction::id).collect(),
            member_sizes: self.txns.iter().map(Transaction::encoded_size).collect(),
            txns: self.txns.clone(),
        }
    }
}

/// `spec.md` §4.B's `subscriber_sets` table row shape: `{id, ids of
/// members, encoded sizes, txns}`.
#[derive(Clone, Debug, PartialEq)]
pub struct SubscriberSetView {
    pub id: TransactionSetId,
    pub member_ids: Vec<txpool_types::TransactionId>,
    pub member_sizes: Vec<u64>,
    pub txns: Vec<Transaction>,
}
