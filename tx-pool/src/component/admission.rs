//! Component D: the Admission Engine — `AcceptTransactionSet(ts)`
//! (`spec.md` §4.D).

use crate::component::pooled_set::{PooledSet, SubscriberSetView};
use crate::component::state::PoolState;
use crate::consensus::ConsensusClient;
use txpool_error::Reject;
use txpool_types::{ObjectId, Transaction, TransactionSetId};

/// What changed in the Set Store as a result of one admission call,
/// passed on to the Subscriber Bus. `reverted` carries each superseded
/// set's own view, captured before it was dropped from the store, so a
/// subscriber never has to reconstruct a set it can no longer look up.
pub struct AdmissionOutcome {
    pub applied: SubscriberSetView,
    pub reverted: Vec<SubscriberSetView>,
}

impl PoolState {
    /// `AcceptTransactionSet(ts)`.
    pub fn accept_transaction_set(
        &mut self,
        ts: Vec<Transaction>,
        consensus: &dyn ConsensusClient,
    ) -> Result<AdmissionOutcome, Reject> {
        if ts.is_empty() {
            return Err(Reject::EmptySet);
        }

        self.check_composition(&ts)?;

        let related = all_related_objects(&ts);
        let conflicts = self.object_index.conflicting_sets(&related);

        if conflicts.is_empty() {
            let diff = consensus
                .try_transaction_set(&ts)
                .map_err(Reject::ConsensusConflict)?;
            let set = PooledSet::new(ts, diff);
            let view = set.to_subscriber_view();
            self.insert_set(set);
            return Ok(AdmissionOutcome {
                applied: view,
                reverted: Vec::new(),
            });
        }

        self.handle_conflicts(ts, conflicts, consensus)
    }

    fn check_composition(&self, ts: &[Transaction]) -> Result<(), Reject> {
        let set_id = txpool_types::transaction_set_id(ts);
        if self.set_store.contains(&set_id) {
            return Err(Reject::DuplicateSet);
        }
        self.check_fee_policy(ts)?;
        self.check_standardness(ts)?;
        Ok(())
    }

    fn check_fee_policy(&self, ts: &[Transaction]) -> Result<(), Reject> {
        self.check_fee_policy_against(ts, self.size.total())
    }

    /// Like [`Self::check_fee_policy`], but measured against
    /// `current_pool_size` rather than `self.size.total()` directly, so
    /// the superset merge path can exclude sets that are about to be
    /// removed instead of double-counting them.
    fn check_fee_policy_against(&self, ts: &[Transaction], current_pool_size: u64) -> Result<(), Reject> {
        let incoming_size = txpool_types::encoded_size(ts);
        let projected_total = current_pool_size + incoming_size;

        if projected_total > self.config.max_pool_size {
            return Err(Reject::PoolFull(self.config.max_pool_size));
        }

        if projected_total > self.config.pool_size_for_fee {
            let paid: u128 = ts.iter().map(|t| t.total_miner_fee().0).sum();
            let required = self.config.min_tx_fee * ts.len() as u128;
            if paid < required {
                return Err(Reject::LowMinerFees {
                    required: required as u64,
                    paid: paid as u64,
                });
            }
        }

        Ok(())
    }

    fn check_standardness(&self, ts: &[Transaction]) -> Result<(), Reject> {
        let mut set_size = 0u64;
        for txn in ts {
            let size = txn.encoded_size();
            set_size += size;
            if size > self.config.max_tx_size {
                return Err(Reject::LargeTransaction(size));
            }

            for blob in &txn.arbitrary_data {
                if !txpool_types::transaction::recognized_arbitrary_data_prefixes()
                    .iter()
                    .any(|prefix| blob.starts_with(prefix))
                {
                    return Err(Reject::InvalidArbitraryData);
                }
            }

            for sig in &txn.signatures {
                if !sig.algorithm.is_recognized() {
                    let tag = match sig.algorithm {
                        txpool_types::KeyAlgorithm::Unrecognized(tag) => tag,
                        _ => 0,
                    };
                    return Err(Reject::UnrecognizedKeyAlgorithm(tag));
                }
            }

            for contract in &txn.file_contracts {
                let earliest = self.block_height + self.config.file_contract_confirm_window;
                if contract.window_start < earliest {
                    return Err(Reject::FileContractStartTooSoon {
                        start: contract.window_start,
                        current: self.block_height,
                        window: self.config.file_contract_confirm_window,
                    });
                }
            }
        }

        if set_size > self.config.max_tx_set_size {
            return Err(Reject::LargeTransactionSet(set_size));
        }

        Ok(())
    }

    /// `handleConflicts`.
    fn handle_conflicts(
        &mut self,
        ts: Vec<Transaction>,
        conflicts: Vec<TransactionSetId>,
        consensus: &dyn ConsensusClient,
    ) -> Result<AdmissionOutcome, Reject> {
        let conflict_txids: txpool_util::FnvHashSet<txpool_types::TransactionId> = conflicts
            .iter()
            .filter_map(|id| self.set_store.get(id))
            .flat_map(|set| set.txns.iter().map(|t| t.id()))
            .collect();

        let deduped: Vec<Transaction> = ts
            .into_iter()
            .filter(|t| !conflict_txids.contains(&t.id()))
            .collect();

        if deduped.is_empty() {
            return Err(Reject::DuplicateSet);
        }

        // Recursion terminates after one step because deduplication is
        // idempotent: recompute conflicts against the deduped set in
        // case removing txns also removed every reference to some
        // previously-conflicting set.
        let related = all_related_objects(&deduped);
        let conflicts = self.object_index.conflicting_sets(&related);
        if conflicts.is_empty() {
            let diff = consensus
                .try_transaction_set(&deduped)
                .map_err(Reject::ConsensusConflict)?;
            let set = PooledSet::new(deduped, diff);
            let view = set.to_subscriber_view();
            self.insert_set(set);
            return Ok(AdmissionOutcome {
                applied: view,
                reverted: Vec::new(),
            });
        }

        let mut superset = Vec::new();
        for conflict_id in &conflicts {
            if let Some(conflict_set) = self.set_store.get(conflict_id) {
                superset.extend(conflict_set.txns.iter().cloned());
            }
        }
        superset.extend(deduped);

        // `superset` already contains the conflicting sets' own
        // transactions, so measuring against `self.size.total()` directly
        // would count them twice: once as still-pooled, once as part of
        // `superset`. Exclude their size from the baseline instead.
        let conflicting_size: u64 = conflicts
            .iter()
            .filter_map(|id| self.set_store.get(id))
            .map(|set| set.encoded_size)
            .sum();
        self.check_composition_for_superset(&superset, conflicting_size)?;

        let diff = consensus
            .try_transaction_set(&superset)
            .map_err(Reject::ConsensusConflict)?;

        let mut removed_size = 0u64;
        let mut reverted_views = Vec::with_capacity(conflicts.len());
        for conflict_id in &conflicts {
            if let Some(removed) = self.set_store.remove(conflict_id) {
                removed_size += removed.encoded_size;
                reverted_views.push(removed.to_subscriber_view());
                self.object_index.remove_set(removed.id);
            }
        }
        self.size.subtract(removed_size);

        let set = PooledSet::new(superset, diff);
        let applied_view = set.to_subscriber_view();
        self.insert_set(set);

        Ok(AdmissionOutcome {
            applied: applied_view,
            reverted: reverted_views,
        })
    }

    /// Like `check_composition`, but for a superset: the duplicate-set
    /// check is skipped (a superset is, by construction, never already
    /// pooled) while size and standardness must still pass.
    /// `conflicting_size` is the encoded size of the sets this superset is
    /// about to replace, already double-counted inside `self.size.total()`
    /// since they haven't been removed yet — it is subtracted from the
    /// baseline so the fee-policy check measures the true post-merge size.
    fn check_composition_for_superset(&self, superset: &[Transaction], conflicting_size: u64) -> Result<(), Reject> {
        let baseline = self.size.total().saturating_sub(conflicting_size);
        self.check_fee_policy_against(superset, baseline)?;
        self.check_standardness(superset)?;
        Ok(())
    }

    fn insert_set(&mut self, set: PooledSet) {
        let mut index_objects: Vec<ObjectId> =
            set.txns.iter().flat_map(Transaction::consumed_objects).collect();
        index_objects.extend(set.diff.created_objects.iter().copied());
        self.object_index.insert_all(set.id, index_objects);
        self.size.add(set.encoded_size);
        self.set_store.insert(set);
    }
}

fn all_related_objects(txns: &[Transaction]) -> Vec<ObjectId> {
    txns.iter().flat_map(Transaction::related_objects).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TxPoolConfig;
    use crate::consensus::{ConsensusClient, PermissiveConsensusClient};
    use txpool_types::{CoinInput, CoinOutput, Currency, ObjectId, ObjectKind};

    fn coin_tx(seed: u8, fee: u128) -> Transaction {
        Transaction {
            coin_outputs: vec![CoinOutput {
                value: Currency::new(1),
                unlock_hash: [seed; 32],
            }],
            miner_fees: vec![Currency::new(fee)],
            ..Default::default()
        }
    }

    #[test]
    fn empty_set_is_rejected() {
        let mut state = PoolState::new(TxPoolConfig::default());
        let consensus = PermissiveConsensusClient;
        let err = state.accept_transaction_set(vec![], &consensus).unwrap_err();
        assert_eq!(err, Reject::EmptySet);
    }

    #[test]
    fn a_transaction_of_exactly_the_size_limit_is_accepted_one_byte_over_is_not() {
        let mut config = TxPoolConfig::default();
        config.max_tx_size = 200;
        let consensus = PermissiveConsensusClient;

        let overhead = Transaction {
            arbitrary_data: vec![b"NonSia".to_vec()],
            ..Default::default()
        }
        .encoded_size();
        let filler = (config.max_tx_size - overhead) as usize;

        let mut state = PoolState::new(config.clone());
        let mut blob = b"NonSia".to_vec();
        blob.extend(std::iter::repeat(0u8).take(filler));
        let at_limit = Transaction {
            arbitrary_data: vec![blob.clone()],
            ..Default::default()
        };
        assert_eq!(at_limit.encoded_size(), config.max_tx_size);
        state
            .accept_transaction_set(vec![at_limit], &consensus)
            .expect("a transaction exactly at the size limit is standard");

        let mut state = PoolState::new(config.clone());
        blob.push(0u8);
        let over_limit = Transaction {
            arbitrary_data: vec![blob],
            ..Default::default()
        };
        assert_eq!(over_limit.encoded_size(), config.max_tx_size + 1);
        let err = state
            .accept_transaction_set(vec![over_limit], &consensus)
            .unwrap_err();
        assert_eq!(err, Reject::LargeTransaction(config.max_tx_size + 1));
    }

    #[test]
    fn zero_fee_is_fine_below_the_fee_threshold_but_required_above_it() {
        let consensus = PermissiveConsensusClient;

        // Below `pool_size_for_fee`, a fee-free transaction is fine.
        let mut state = PoolState::new(TxPoolConfig::default());
        state
            .accept_transaction_set(vec![coin_tx(1, 0)], &consensus)
            .expect("fee-free transactions are allowed below the fee threshold");

        // Above it, zero fee is rejected, but exactly the required floor
        // is sufficient.
        let mut config = TxPoolConfig::default();
        config.pool_size_for_fee = 0;
        config.min_tx_fee = 5;

        let mut state = PoolState::new(config.clone());
        let err = state
            .accept_transaction_set(vec![coin_tx(1, 0)], &consensus)
            .unwrap_err();
        assert!(matches!(err, Reject::LowMinerFees { .. }));

        let mut state = PoolState::new(config);
        state
            .accept_transaction_set(vec![coin_tx(1, 5)], &consensus)
            .expect("a fee exactly at the required floor is sufficient");
    }

    #[test]
    fn pool_full_rejects_regardless_of_fee() {
        let mut config = TxPoolConfig::default();
        config.max_pool_size = 1;
        let consensus = PermissiveConsensusClient;
        let mut state = PoolState::new(config);
        let err = state
            .accept_transaction_set(vec![coin_tx(1, 1_000)], &consensus)
            .unwrap_err();
        assert!(matches!(err, Reject::PoolFull(_)));
    }

    /// A consensus client that rejects any set containing two
    /// transactions that consume the same object, standing in for a
    /// real consensus engine's double-spend detection the way `spec.md`
    /// scenario 2 (§8) describes.
    struct DoubleSpendRejectingConsensusClient;

    impl ConsensusClient for DoubleSpendRejectingConsensusClient {
        fn try_transaction_set(&self, txns: &[Transaction]) -> Result<txpool_types::ConsensusDiff, String> {
            let mut seen = std::collections::HashSet::new();
            for txn in txns {
                for consumed in txn.consumed_objects() {
                    if !seen.insert(consumed) {
                        return Err("double spend".to_string());
                    }
                }
            }
            let mut created = Vec::new();
            for txn in txns {
                created.extend(txn.created_objects());
            }
            Ok(txpool_types::ConsensusDiff::new(created))
        }
    }

    #[test]
    fn conflicting_double_spend_is_rejected_after_the_first_is_pooled() {
        let consensus = DoubleSpendRejectingConsensusClient;
        let mut state = PoolState::new(TxPoolConfig::default());

        let spent = ObjectId::new(ObjectKind::CoinOutput, [7; 32]);
        let spend_into_fee = Transaction {
            coin_inputs: vec![CoinInput { parent_id: spent }],
            miner_fees: vec![Currency::new(1)],
            ..Default::default()
        };
        let spend_into_output = Transaction {
            coin_inputs: vec![CoinInput { parent_id: spent }],
            coin_outputs: vec![CoinOutput {
                value: Currency::new(1),
                unlock_hash: [8; 32],
            }],
            ..Default::default()
        };

        state
            .accept_transaction_set(vec![spend_into_fee], &consensus)
            .expect("the first spender is admitted");

        let sets_before = state.set_store.len();
        let size_before = state.size.total();
        let err = state
            .accept_transaction_set(vec![spend_into_output], &consensus)
            .unwrap_err();
        assert!(matches!(err, Reject::ConsensusConflict(_)));
        assert_eq!(state.set_store.len(), sets_before, "pool state must be unchanged after a rejected conflict");
        assert_eq!(state.size.total(), size_before);
    }

    #[test]
    fn a_child_spending_two_pooled_singletons_merges_both_into_one_set() {
        let consensus = PermissiveConsensusClient;
        let mut state = PoolState::new(TxPoolConfig::default());

        let a = coin_tx(1, 1);
        let b = coin_tx(2, 1);
        let obj_a = a.created_objects()[0];
        let obj_b = b.created_objects()[0];
        state.accept_transaction_set(vec![a], &consensus).unwrap();
        state.accept_transaction_set(vec![b], &consensus).unwrap();
        assert_eq!(state.set_store.len(), 2);

        let child = Transaction {
            coin_inputs: vec![
                CoinInput { parent_id: obj_a },
                CoinInput { parent_id: obj_b },
            ],
            miner_fees: vec![Currency::new(1)],
            ..Default::default()
        };

        let outcome = state
            .accept_transaction_set(vec![child], &consensus)
            .expect("a child spending both pooled parents merges them");
        assert_eq!(outcome.reverted.len(), 2);
        assert_eq!(state.set_store.len(), 1);
        assert_eq!(state.set_store.iter().next().unwrap().txns.len(), 3);
    }

    #[test]
    fn merging_two_pooled_singletons_near_capacity_does_not_double_count_their_size() {
        let consensus = PermissiveConsensusClient;

        let a = coin_tx(1, 1);
        let b = coin_tx(2, 1);
        let obj_a = a.created_objects()[0];
        let obj_b = b.created_objects()[0];

        let child = Transaction {
            coin_inputs: vec![
                CoinInput { parent_id: obj_a },
                CoinInput { parent_id: obj_b },
            ],
            miner_fees: vec![Currency::new(1)],
            ..Default::default()
        };

        let mut config = TxPoolConfig::default();
        // Exactly large enough for A, B, and the merged superset, but not
        // for all three plus either singleton's size counted twice.
        config.max_pool_size = a.encoded_size() + b.encoded_size() + child.encoded_size();
        let mut state = PoolState::new(config);

        state.accept_transaction_set(vec![a], &consensus).unwrap();
        state.accept_transaction_set(vec![b], &consensus).unwrap();

        state
            .accept_transaction_set(vec![child], &consensus)
            .expect("merging pre-pooled sets must not double-count their size against the pool cap");
        assert_eq!(state.set_store.len(), 1);
    }

    #[test]
    fn a_set_containing_only_already_pooled_transactions_is_a_duplicate() {
        let consensus = PermissiveConsensusClient;
        let mut state = PoolState::new(TxPoolConfig::default());

        let a = coin_tx(1, 1);
        let b = coin_tx(2, 1);
        state.accept_transaction_set(vec![a.clone()], &consensus).unwrap();
        state.accept_transaction_set(vec![b.clone()], &consensus).unwrap();

        // Re-submitting exactly the two already-pooled singletons as one
        // set carries no novel transaction, so deduplication empties it
        // entirely (`spec.md` §4.D step 5): `DuplicateSet`, not a merge.
        let err = state
            .accept_transaction_set(vec![a, b], &consensus)
            .unwrap_err();
        assert_eq!(err, Reject::DuplicateSet);
        assert_eq!(state.set_store.len(), 2);
    }
}
