//! The public entry point: [`TxPoolService`] wraps [`PoolState`] behind
//! a single `parking_lot::RwLock`, spawns the background sync task that
//! periodically commits confirmed-id bookkeeping to the persistent
//! store, and exposes every operation an embedder calls.
//!
//! Grounded in `ckb-shared`'s `Shared`/`Snapshot` split and
//! `block-filter`'s `start()` -> `StopHandler` shape: most calls take
//! the lock only long enough to read or to apply one admission/reorg
//! step, downgrading from the write guard to a read guard before
//! handing data back out, so a caller blocked on a read is never stuck
//! behind another reader.

use crate::component::{AdmissionOutcome, PoolState, ReorgOutcome, SubscriberSetView};
use crate::config::TxPoolConfig;
use crate::consensus::ConsensusClient;
use crate::store::ConfirmedStore;
use crate::subscriber::{Subscriber, SubscriberBus};
use parking_lot::{RwLock, RwLockWriteGuard};
use std::sync::Arc;
use txpool_error::{InternalError, Reject};
use txpool_logger::{debug, info};
use txpool_stop_handler::{new_tokio_exit_rx, StopHandler};
use txpool_types::{ConsensusChange, Transaction, TransactionId};

struct Inner {
    state: PoolState,
    subscribers: SubscriberBus,
}

/// The pool's public, thread-safe handle. Clone and share across every
/// task that needs to submit transactions, query pool contents, or feed
/// it consensus-change notifications.
#[derive(Clone)]
pub struct TxPoolService {
    inner: Arc<RwLock<Inner>>,
    store: Arc<ConfirmedStore>,
    consensus: Arc<dyn ConsensusClient>,
    stop: Arc<parking_lot::Mutex<Option<StopHandler>>>,
}

impl TxPoolService {
    /// Open (or create) the persistent store at `config.db_path`,
    /// restore whatever in-memory state it implies, and start the
    /// background sync task.
    pub fn new(
        config: TxPoolConfig,
        consensus: Arc<dyn ConsensusClient>,
        runtime: &txpool_async_runtime::Handle,
    ) -> Result<Self, InternalError> {
        let store = ConfirmedStore::open(&config.db_path)?;
        let state = Self::restore_state(config, &store)?;

        let service = TxPoolService {
            inner: Arc::new(RwLock::new(Inner {
                state,
                subscribers: SubscriberBus::new(),
            })),
            store: Arc::new(store),
            consensus,
            stop: Arc::new(parking_lot::Mutex::new(None)),
        };

        service.start_sync_task(runtime);
        Ok(service)
    }

    fn restore_state(config: TxPoolConfig, store: &ConfirmedStore) -> Result<PoolState, InternalError> {
        let depth = config.block_fee_estimation_depth;
        let mut state = PoolState::new(config);
        state.block_height = store.block_height()?;
        state.recent_block_id = store.recent_block_id()?;
        let medians = store.fee_medians()?;
        state.fee_estimator = crate::component::fee_estimator::FeeEstimator::restore(depth, medians);
        // The admission engine only ever consults the in-memory mirror
        // (invariant I4), never the store directly, so it must be primed
        // from whatever was confirmed before this restart.
        state.confirmed = store.confirmed_ids()?.into_iter().collect();
        Ok(state)
    }

    /// Periodically flushes the persistent store, decoupling durability
    /// latency from the hot admission path the way `tpoolSyncRate`
    /// describes.
    fn start_sync_task(&self, runtime: &txpool_async_runtime::Handle) {
        let token = new_tokio_exit_rx();
        let store = self.store.clone();
        let sync_rate = self.read(|state| state.config.sync_rate());
        let loop_token = token.clone();

        let handle = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(sync_rate);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = store.flush() {
                            debug!("tx-pool sync task: flush failed: {err}");
                        }
                    }
                    _ = loop_token.cancelled() => {
                        info!("tx-pool sync task: received exit signal");
                        break;
                    }
                }
            }
        });

        *self.stop.lock() = Some(StopHandler::new_tokio(
            "tx-pool-sync".to_string(),
            token,
            handle,
        ));
    }

    fn read<R>(&self, f: impl FnOnce(&PoolState) -> R) -> R {
        let guard = self.inner.read();
        f(&guard.state)
    }

    /// `AcceptTransactionSet(ts)`.
    pub fn accept_transaction_set(&self, ts: Vec<Transaction>) -> Result<AdmissionOutcome, Reject> {
        let mut guard = self.inner.write();
        let now_height = guard.state.block_height;
        let result = guard.state.accept_transaction_set(ts.clone(), self.consensus.as_ref());

        match &result {
            Ok(_) => {
                for txn in &ts {
                    guard
                        .state
                        .transaction_heights
                        .entry(txn.id())
                        .or_insert(now_height);
                }
            }
            Err(reason) => {
                for txn in &ts {
                    guard.state.recent_reject.record(txn.id(), reason.clone());
                }
            }
        }

        // Every mutation this call makes is already committed; downgrade
        // before the (potentially slow, subscriber-defined) broadcast
        // step so other writers queued behind this lock don't wait on it
        // too.
        let guard = RwLockWriteGuard::downgrade(guard);
        if let Ok(outcome) = &result {
            guard.subscribers.notify_admission(outcome);
        }

        result
    }

    /// `ProcessConsensusChange(cc)`.
    pub fn process_consensus_change(&self, change: ConsensusChange) -> ReorgOutcome {
        let mut guard = self.inner.write();
        let outcome = guard
            .state
            .process_consensus_change(&change, self.consensus.as_ref(), false);

        let confirmed: Vec<TransactionId> = change
            .applied_blocks
            .iter()
            .flat_map(|b| b.transactions.iter().map(|t| t.id()))
            .collect();
        let unconfirmed: Vec<TransactionId> = change
            .reverted_blocks
            .iter()
            .flat_map(|b| b.transactions.iter().map(|t| t.id()))
            .collect();
        let medians = guard.state.fee_estimator.recent_medians();
        let depth = guard.state.config.block_fee_estimation_depth;
        let next_ordinal = guard.state.block_height;
        if let Err(err) = self.store.apply_consensus_change(
            guard.state.block_height,
            guard.state.recent_block_id,
            &change.id,
            &unconfirmed,
            &confirmed,
            change.reverted_blocks.len(),
            &medians
                .iter()
                .rev()
                .take(change.applied_blocks.len())
                .rev()
                .copied()
                .collect::<Vec<_>>(),
            next_ordinal,
            depth,
        ) {
            debug!("failed to persist consensus change: {err}");
        }

        let reverted = outcome.reverted.clone();
        let applied = outcome.applied.clone();
        let guard = RwLockWriteGuard::downgrade(guard);
        guard.subscribers.notify_reorg(reverted, applied);

        outcome
    }

    /// `TransactionList()`: every transaction currently pooled, flattened
    /// across every set.
    pub fn transaction_list(&self) -> Vec<Transaction> {
        self.read(|state| state.set_store.all_transactions())
    }

    /// `Transaction(id)`: a pooled transaction plus the predecessors in
    /// its set that appear before it.
    pub fn transaction(&self, id: &TransactionId) -> Option<(Transaction, Vec<Transaction>)> {
        self.read(|state| state.set_store.find_transaction(id))
    }

    /// `FeeEstimation() -> (min, max)`.
    pub fn fee_estimation(&self) -> (txpool_types::Currency, txpool_types::Currency) {
        self.read(|state| state.fee_estimator.estimate())
    }

    /// The last `ConsensusChangeID` this pool successfully applied,
    /// persisted across restarts so an embedder knows where to resume its
    /// consensus subscription. `None` before the first consensus change.
    pub fn recent_consensus_change_id(&self) -> Result<Option<txpool_types::ConsensusChangeId>, InternalError> {
        self.store.recent_consensus_change_id()
    }

    /// A passive observation surface for a gossip layer deciding whether
    /// to re-relay a transaction id: does NOT gate admission (see
    /// `accept_transaction_set`), and a `true` result here says nothing
    /// about whether resubmitting the id now would succeed.
    pub fn was_recently_rejected(&self, id: &TransactionId) -> bool {
        self.inner.write().state.recent_reject.was_recently_rejected(id)
    }

    /// `PurgeTransactionPool`.
    pub fn purge_transaction_pool(&self) {
        self.inner.write().state.purge();
    }

    /// `TransactionPoolSubscribe`.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        let mut guard = self.inner.write();
        let current: Vec<SubscriberSetView> = guard.state.set_store.subscriber_views();
        guard.subscribers.subscribe(subscriber, &current);
    }

    /// `TransactionPoolUnsubscribe`.
    pub fn unsubscribe(&self, subscriber: &Arc<dyn Subscriber>) {
        self.inner.write().subscribers.unsubscribe(subscriber);
    }

    /// `Close`: stop the background sync task and flush one last time.
    pub fn close(&self) {
        if let Some(handler) = self.stop.lock().take() {
            handler.stop();
        }
        if let Err(err) = self.store.flush() {
            debug!("final flush on close failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::PermissiveConsensusClient;
    use tempfile::tempdir;
    use txpool_types::{CoinOutput, Currency};

    fn service() -> (TxPoolService, std::thread::JoinHandle<()>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let mut config = TxPoolConfig::default();
        config.db_path = dir.path().join("db");
        let (handle, runtime_thread) = txpool_async_runtime::new_background_runtime();
        let service = TxPoolService::new(config, Arc::new(PermissiveConsensusClient), &handle).unwrap();
        (service, runtime_thread, dir)
    }

    fn coin_tx(value: u128) -> Transaction {
        Transaction {
            coin_outputs: vec![CoinOutput {
                value: Currency::new(value),
                unlock_hash: [0; 32],
            }],
            miner_fees: vec![Currency::new(1)],
            ..Default::default()
        }
    }

    #[test]
    fn accepted_transactions_are_listed() {
        let (service, _runtime, _dir) = service();
        let txn = coin_tx(5);
        let outcome = service.accept_transaction_set(vec![txn.clone()]).unwrap();
        assert_eq!(outcome.reverted.len(), 0);
        assert_eq!(service.transaction_list().len(), 1);
        service.close();
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let (service, _runtime, _dir) = service();
        let txn = coin_tx(5);
        service.accept_transaction_set(vec![txn.clone()]).unwrap();
        let err = service.accept_transaction_set(vec![txn]).unwrap_err();
        assert_eq!(err, Reject::DuplicateSet);
        service.close();
    }

    #[test]
    fn a_transiently_rejected_transaction_can_be_resubmitted_once_the_transient_cause_clears() {
        let dir = tempdir().unwrap();
        let mut config = TxPoolConfig::default();
        config.db_path = dir.path().join("db");
        config.max_pool_size = 1;
        let (handle, _runtime) = txpool_async_runtime::new_background_runtime();
        let service = TxPoolService::new(config, Arc::new(PermissiveConsensusClient), &handle).unwrap();

        let txn = coin_tx(5);
        let err = service.accept_transaction_set(vec![txn.clone()]).unwrap_err();
        assert!(matches!(err, Reject::PoolFull(_)));
        assert!(service.was_recently_rejected(&txn.id()));

        service.purge_transaction_pool();
        service.inner.write().state.config.max_pool_size = u64::MAX;
        service
            .accept_transaction_set(vec![txn])
            .expect("a transaction must be admissible again once the original rejection cause clears");
        service.close();
    }

    #[test]
    fn confirmed_ids_survive_a_restart() {
        use txpool_types::{Block, BlockId, ConsensusChange, ConsensusChangeId};

        let dir = tempdir().unwrap();
        let db_path = dir.path().join("db");
        let txn = coin_tx(5);
        let txid = txn.id();

        {
            let mut config = TxPoolConfig::default();
            config.db_path = db_path.clone();
            let (handle, _runtime) = txpool_async_runtime::new_background_runtime();
            let service =
                TxPoolService::new(config, Arc::new(PermissiveConsensusClient), &handle).unwrap();

            let genesis = Block::new(BlockId::new([9; 32]), BlockId::zero(), Vec::new());
            let b1 = Block::new(BlockId::new([1; 32]), genesis.id, vec![txn]);
            let change = ConsensusChange::new(ConsensusChangeId::new([1; 32]), vec![], vec![genesis, b1]);
            service.process_consensus_change(change);
            service.close();
        }

        let mut config = TxPoolConfig::default();
        config.db_path = db_path;
        let (handle, _runtime) = txpool_async_runtime::new_background_runtime();
        let service = TxPoolService::new(config, Arc::new(PermissiveConsensusClient), &handle).unwrap();
        assert!(service.read(|state| state.confirmed.contains(&txid)));
        assert_eq!(
            service.recent_consensus_change_id().unwrap(),
            Some(txpool_types::ConsensusChangeId::new([1; 32]))
        );
        service.close();
    }

    #[test]
    fn subscribing_replays_current_sets() {
        let (service, _runtime, _dir) = service();
        let txn = coin_tx(5);
        service.accept_transaction_set(vec![txn]).unwrap();

        struct Counter(std::sync::atomic::AtomicUsize);
        impl Subscriber for Counter {
            fn on_subscribe(&self, current: &[SubscriberSetView]) {
                self.0.store(current.len(), std::sync::atomic::Ordering::SeqCst);
            }
            fn on_diff(&self, _diff: &crate::subscriber::TransactionPoolDiff) {}
        }
        let counter = Arc::new(Counter(std::sync::atomic::AtomicUsize::new(0)));
        service.subscribe(counter.clone());
        assert_eq!(counter.0.load(std::sync::atomic::Ordering::SeqCst), 1);
        service.close();
    }
}
