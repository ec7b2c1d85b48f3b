//! The pool's full in-memory state, gluing components A, B, F, H (and
//! the supplemental recent-reject cache) together, plus the small amount
//! of confirmed-id/height bookkeeping the admission and reorg engines
//! both need. Owned exclusively by [`crate::service::TxPoolService`]
//! behind its single demotable lock (`spec.md` §5) — every method here
//! assumes the caller already holds that lock.

use crate::component::fee_estimator::FeeEstimator;
use crate::component::object_index::ObjectIndex;
use crate::component::recent_reject::RecentReject;
use crate::component::set_store::SetStore;
use crate::component::size_accountant::SizeAccountant;
use crate::config::TxPoolConfig;
use txpool_util::{FnvHashMap, FnvHashSet};
use txpool_types::{BlockId, TransactionId};

pub struct PoolState {
    pub object_index: ObjectIndex,
    pub set_store: SetStore,
    pub size: SizeAccountant,
    pub fee_estimator: FeeEstimator,
    pub recent_reject: RecentReject,

    /// Mirrors the persistent `ConfirmedTransactions` bucket so
    /// admission and pruning can check membership without a store round
    /// trip on every transaction.
    pub confirmed: FnvHashSet<TransactionId>,
    /// Mirrors the persistent `RecentBlockID` value.
    pub recent_block_id: BlockId,
    /// Mirrors the persistent `BlockHeight` value.
    pub block_height: u64,
    /// Height a still-unconfirmed transaction was first seen at, used by
    /// the reorg engine's age-pruning step (`spec.md` §4.E step 7).
    pub transaction_heights: FnvHashMap<TransactionId, u64>,

    pub config: TxPoolConfig,
}

impl PoolState {
    pub fn new(config: TxPoolConfig) -> Self {
        let fee_estimator = FeeEstimator::new(config.block_fee_estimation_depth);
        let recent_reject = RecentReject::new(config.recent_reject_capacity);
        PoolState {
            object_index: ObjectIndex::new(),
            set_store: SetStore::new(),
            size: SizeAccountant::new(),
            fee_estimator,
            recent_reject,
            confirmed: FnvHashSet::default(),
            recent_block_id: BlockId::zero(),
            block_height: 0,
            transaction_heights: FnvHashMap::default(),
            config,
        }
    }

    /// `PurgeTransactionPool`: clears every in-memory pool table. Never
    /// touches the confirmed-id store, block height, or fee-median ring —
    /// those are tracked independently of what's currently pooled.
    pub fn purge(&mut self) {
        self.object_index.clear();
        self.set_store.clear();
        self.size.reset();
    }
}
