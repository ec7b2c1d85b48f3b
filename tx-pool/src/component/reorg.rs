//! The reorg handler: folds a consensus-change notification into the
//! pool's in-memory state — confirmed-id bookkeeping, fee-median
//! updates, and draining/re-admitting whatever was pooled.

use crate::component::pooled_set::SubscriberSetView;
use crate::component::set_finder::partition_independent_sets;
use crate::component::state::PoolState;
use crate::consensus::ConsensusClient;
use txpool_types::{Block, BlockId, ConsensusChange, Currency, Transaction};

/// What a `ProcessConsensusChange` call did to the Set Store, handed on
/// to the subscriber bus exactly like an admission outcome. `reverted`
/// is every set that was pooled before the change — the whole in-memory
/// pool is drained and rebuilt on every reorg, so "reverted" here means
/// "no longer pooled under its old identity", not necessarily "double
/// spent".
pub struct ReorgOutcome {
    pub applied: Vec<SubscriberSetView>,
    pub reverted: Vec<SubscriberSetView>,
}

/// A block with no parent id (the zero sentinel) is the chain's genesis
/// block and never counts toward height.
fn is_genesis(block: &Block) -> bool {
    block.parent_id == BlockId::zero()
}

impl PoolState {
    /// `ProcessConsensusChange(cc)`.
    ///
    /// `skip_consistency_check` exists for tests and for the first
    /// notification a consensus client sends against a freshly created
    /// pool, where there is no prior `recent_block_id` to compare
    /// against.
    pub fn process_consensus_change(
        &mut self,
        change: &ConsensusChange,
        consensus: &dyn ConsensusClient,
        skip_consistency_check: bool,
    ) -> ReorgOutcome {
        if !skip_consistency_check {
            let mut expected = self.recent_block_id;
            for block in &change.reverted_blocks {
                debug_assert_eq!(
                    block.id, expected,
                    "consensus change must chain from the pool's last known block"
                );
                expected = block.parent_id;
            }
            for block in &change.applied_blocks {
                debug_assert_eq!(
                    block.parent_id, expected,
                    "consensus change must chain from the pool's last known block"
                );
                expected = block.id;
            }
        }

        for block in &change.reverted_blocks {
            if !is_genesis(block) {
                self.block_height = self.block_height.saturating_sub(1);
            }
            for txn in &block.transactions {
                self.confirmed.remove(&txn.id());
            }
            self.fee_estimator.pop_one();
        }

        for block in &change.applied_blocks {
            if !is_genesis(block) {
                self.block_height += 1;
            }
            for txn in &block.transactions {
                self.confirmed.insert(txn.id());
            }
            self.record_block_fee_median(block);
        }

        if let Some(last) = change.applied_blocks.last() {
            self.recent_block_id = last.id;
        } else if let Some(first_reverted) = change.reverted_blocks.first() {
            self.recent_block_id = first_reverted.parent_id;
        }

        // Snapshot every currently pooled set stripped of now-confirmed
        // transactions, then drop the whole in-memory pool: the object
        // index and set store are rebuilt from scratch as the surviving
        // transactions (and whatever the reverted blocks contributed)
        // are re-admitted below.
        let mut reverted = Vec::new();
        let mut surviving: Vec<Vec<Transaction>> = Vec::new();
        for set in self.set_store.iter() {
            reverted.push(set.to_subscriber_view());
            let remaining: Vec<Transaction> = set
                .txns
                .iter()
                .filter(|t| !self.confirmed.contains(&t.id()))
                .cloned()
                .collect();
            if !remaining.is_empty() {
                surviving.push(remaining);
            }
        }
        self.purge();
        self.prune_aged_out(&mut surviving);

        let mut applied = Vec::new();

        // Reverted-block transactions re-enter the pool oldest-block
        // first, so a later block's transaction is re-admitted after
        // whatever it depended on from an earlier reverted block.
        let height = self.block_height;
        for block in change.reverted_blocks.iter().rev() {
            let candidates: Vec<Transaction> = block
                .transactions
                .iter()
                .filter(|t| !self.confirmed.contains(&t.id()))
                .cloned()
                .collect();
            if candidates.is_empty() {
                continue;
            }
            if let Ok(outcome) = self.accept_transaction_set(candidates, consensus) {
                for id in &outcome.applied.member_ids {
                    self.transaction_heights.entry(*id).or_insert(height);
                }
                applied.push(outcome.applied);
            }
        }

        for txns in surviving {
            let ids: Vec<_> = txns.iter().map(Transaction::id).collect();
            match self.accept_transaction_set(txns, consensus) {
                Ok(outcome) => applied.push(outcome.applied),
                Err(_) => {
                    for id in &ids {
                        self.transaction_heights.remove(id);
                    }
                }
            }
        }

        ReorgOutcome { applied, reverted }
    }

    /// Partitions the block into independent sets, computes each set's
    /// average fee-per-byte, appends a synthetic zero-fee entry sized to
    /// the block's unused space, and records the entry at the 75th
    /// percentile of cumulative size as this block's fee median.
    fn record_block_fee_median(&mut self, block: &Block) {
        let sets = partition_independent_sets(&block.transactions);

        let mut entries: Vec<(u64, Currency)> = sets
            .iter()
            .map(|set| {
                let size = txpool_types::encoded_size(set);
                let fee: u128 = set.iter().map(|t| t.total_miner_fee().0).sum();
                let per_byte = if size == 0 { 0 } else { fee / size as u128 };
                (size, Currency::new(per_byte))
            })
            .collect();

        let used: u64 = entries.iter().map(|(size, _)| size).sum();
        let unused = self.config.block_size_limit.saturating_sub(used);
        if unused > 0 {
            entries.push((unused, Currency::ZERO));
        }

        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let threshold = self.config.block_size_limit / 4;
        let mut cumulative = 0u64;
        let mut median = Currency::ZERO;
        for (size, fee) in &entries {
            cumulative += size;
            median = *fee;
            if cumulative > threshold {
                break;
            }
        }

        self.fee_estimator.push_block_median(median);
    }

    /// Drops unconfirmed transactions whose first-seen height is older
    /// than `max_txn_age` blocks, in place.
    fn prune_aged_out(&mut self, sets: &mut Vec<Vec<Transaction>>) {
        let cutoff = self.block_height.saturating_sub(self.config.max_txn_age);
        sets.retain(|txns| {
            txns.iter().all(|t| {
                self.transaction_heights
                    .get(&t.id())
                    .map(|&h| h >= cutoff)
                    .unwrap_or(true)
            })
        });
        self.transaction_heights.retain(|_, h| *h >= cutoff);
    }
}
