//! Component C: the persistent Confirmed-ID Store. Outlives a process
//! restart — unlike every other table in [`crate::component::state`] —
//! so the confirmed-id bookkeeping the reorg engine relies on survives
//! across restarts even though the unconfirmed pool itself does not.
//!
//! Modeled on `ckb-db`'s `RocksDB` wrapper: a thin `Arc`-shared handle
//! opened once at startup, version-checked the way `ckb-db::migration`
//! checks its version key, with one `sled::Tree` per logical bucket
//! instead of one column family per table.

use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::{Db, Tree};
use std::path::Path;
use txpool_error::{InternalError, InternalErrorKind};
use txpool_types::{BlockId, ConsensusChangeId, Currency, TransactionId};

const VERSION_KEY: &[u8] = b"tpool-store-version";
const CURRENT_VERSION: &str = "0.6.0";

const TREE_BLOCK_HEIGHT: &str = "block_height";
const TREE_CONFIRMED_TRANSACTIONS: &str = "confirmed_transactions";
const TREE_FEE_MEDIAN: &str = "fee_median";
const TREE_RECENT_CONSENSUS_CHANGE: &str = "recent_consensus_change";

const KEY_HEIGHT: &[u8] = b"height";
const KEY_RECENT_BLOCK_ID: &[u8] = b"recent_block_id";
const KEY_RECENT_CHANGE_ID: &[u8] = b"recent_change_id";

fn internal(reason: impl Into<String>) -> InternalError {
    InternalErrorKind::Database.because(reason)
}

/// A handle to the on-disk confirmed-id store. Cheap to clone: every
/// clone shares the same underlying `sled::Db`.
#[derive(Clone)]
pub struct ConfirmedStore {
    #[allow(dead_code)]
    db: Db,
    block_height: Tree,
    confirmed_transactions: Tree,
    fee_median: Tree,
    recent_consensus_change: Tree,
}

impl ConfirmedStore {
    /// Open (or create) the store at `path`, checking the stamped
    /// version against [`CURRENT_VERSION`]. A fresh database is stamped
    /// with the current version; an existing one with a mismatched
    /// version is rejected rather than silently reinterpreted — this
    /// crate carries no migration machinery of its own.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, InternalError> {
        let db = sled::open(path).map_err(|e| internal(format!("failed to open store: {e}")))?;

        let block_height = db
            .open_tree(TREE_BLOCK_HEIGHT)
            .map_err(|e| internal(format!("failed to open {TREE_BLOCK_HEIGHT} tree: {e}")))?;
        let confirmed_transactions = db
            .open_tree(TREE_CONFIRMED_TRANSACTIONS)
            .map_err(|e| internal(format!("failed to open {TREE_CONFIRMED_TRANSACTIONS} tree: {e}")))?;
        let fee_median = db
            .open_tree(TREE_FEE_MEDIAN)
            .map_err(|e| internal(format!("failed to open {TREE_FEE_MEDIAN} tree: {e}")))?;
        let recent_consensus_change = db
            .open_tree(TREE_RECENT_CONSENSUS_CHANGE)
            .map_err(|e| {
                internal(format!(
                    "failed to open {TREE_RECENT_CONSENSUS_CHANGE} tree: {e}"
                ))
            })?;

        match db
            .get(VERSION_KEY)
            .map_err(|e| internal(format!("failed to read store version: {e}")))?
        {
            Some(stamped) => {
                let stamped = String::from_utf8_lossy(&stamped).into_owned();
                if stamped != CURRENT_VERSION {
                    return Err(internal(format!(
                        "store version {stamped} does not match expected {CURRENT_VERSION}"
                    )));
                }
            }
            None => {
                db.insert(VERSION_KEY, CURRENT_VERSION.as_bytes())
                    .map_err(|e| internal(format!("failed to stamp store version: {e}")))?;
            }
        }

        Ok(ConfirmedStore {
            db,
            block_height,
            confirmed_transactions,
            fee_median,
            recent_consensus_change,
        })
    }

    /// An ephemeral store backed by an in-memory sled instance, for
    /// tests and for embedders that have no durability requirement.
    pub fn open_in_memory() -> Result<Self, InternalError> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| internal(format!("failed to open in-memory store: {e}")))?;
        let block_height = db.open_tree(TREE_BLOCK_HEIGHT).unwrap();
        let confirmed_transactions = db.open_tree(TREE_CONFIRMED_TRANSACTIONS).unwrap();
        let fee_median = db.open_tree(TREE_FEE_MEDIAN).unwrap();
        let recent_consensus_change = db.open_tree(TREE_RECENT_CONSENSUS_CHANGE).unwrap();
        db.insert(VERSION_KEY, CURRENT_VERSION.as_bytes()).unwrap();
        Ok(ConfirmedStore {
            db,
            block_height,
            confirmed_transactions,
            fee_median,
            recent_consensus_change,
        })
    }

    pub fn block_height(&self) -> Result<u64, InternalError> {
        self.block_height
            .get(KEY_HEIGHT)
            .map_err(|e| internal(format!("failed to read block height: {e}")))?
            .map(|bytes| decode_u64(&bytes))
            .unwrap_or(Ok(0))
    }

    pub fn recent_block_id(&self) -> Result<BlockId, InternalError> {
        self.block_height
            .get(KEY_RECENT_BLOCK_ID)
            .map_err(|e| internal(format!("failed to read recent block id: {e}")))?
            .map(|bytes| decode_block_id(&bytes))
            .unwrap_or_else(|| Ok(BlockId::zero()))
    }

    pub fn fee_medians(&self) -> Result<Vec<Currency>, InternalError> {
        let mut entries: Vec<(u64, Currency)> = Vec::new();
        for item in self.fee_median.iter() {
            let (key, value) = item.map_err(|e| internal(format!("failed to scan fee medians: {e}")))?;
            entries.push((decode_u64(&key)?, Currency::new(decode_u128(&value)?)));
        }
        entries.sort_by_key(|(ordinal, _)| *ordinal);
        Ok(entries.into_iter().map(|(_, fee)| fee).collect())
    }

    /// The last `ConsensusChangeID` delivered and successfully applied,
    /// used to resume a consensus subscription after a restart. `None`
    /// before the pool has ever processed a consensus change.
    pub fn recent_consensus_change_id(&self) -> Result<Option<ConsensusChangeId>, InternalError> {
        self.recent_consensus_change
            .get(KEY_RECENT_CHANGE_ID)
            .map_err(|e| internal(format!("failed to read recent consensus change id: {e}")))?
            .map(|bytes| {
                let array: [u8; 32] = bytes
                    .as_ref()
                    .try_into()
                    .map_err(|_| internal("corrupt consensus change id entry"))?;
                Ok(ConsensusChangeId::new(array))
            })
            .transpose()
    }

    pub fn is_confirmed(&self, id: &TransactionId) -> Result<bool, InternalError> {
        self.confirmed_transactions
            .contains_key(id.as_bytes())
            .map_err(|e| internal(format!("failed to check confirmed-id membership: {e}")))
    }

    /// Every id currently in the `ConfirmedTransactions` bucket, used to
    /// rebuild [`crate::component::PoolState`]'s in-memory mirror at
    /// startup — the admission engine checks that mirror, not the store,
    /// so a restart must not forget which transactions already confirmed.
    pub fn confirmed_ids(&self) -> Result<Vec<TransactionId>, InternalError> {
        let mut ids = Vec::new();
        for item in self.confirmed_transactions.iter() {
            let (key, _) = item.map_err(|e| internal(format!("failed to scan confirmed ids: {e}")))?;
            let array: [u8; 32] = key
                .as_ref()
                .try_into()
                .map_err(|_| internal("corrupt confirmed-id entry"))?;
            ids.push(TransactionId::new(array));
        }
        Ok(ids)
    }

    /// Apply one consensus change's bookkeeping atomically: unconfirm
    /// every reverted transaction, confirm every applied one, pop a fee
    /// median per reverted block, push one per applied block, record the
    /// change's own id to resume a subscription from, and update
    /// height/recent-block-id. All four trees commit together or not at
    /// all.
    ///
    /// `depth` bounds the fee-median tree the same way
    /// `FeeEstimator`'s ring is bounded in memory: after the transaction
    /// above commits, `prune_fee_medians` trims the tree down to the
    /// `depth` most recent ordinals, since ordinary ring eviction (no
    /// revert involved) would otherwise leave stale low-ordinal entries
    /// behind forever.
    #[allow(clippy::too_many_arguments)]
    pub fn apply_consensus_change(
        &self,
        new_height: u64,
        new_recent_block_id: BlockId,
        change_id: &ConsensusChangeId,
        unconfirm: &[TransactionId],
        confirm: &[TransactionId],
        popped_medians: usize,
        pushed_medians: &[Currency],
        next_median_ordinal: u64,
        depth: usize,
    ) -> Result<(), InternalError> {
        (
            &self.block_height,
            &self.confirmed_transactions,
            &self.fee_median,
            &self.recent_consensus_change,
        )
            .transaction(
                |(height_tree, confirmed_tree, median_tree, change_tree)| -> Result<(), ConflictableTransactionError<()>> {
                    height_tree.insert(KEY_HEIGHT, &new_height.to_be_bytes())?;
                    height_tree.insert(KEY_RECENT_BLOCK_ID, new_recent_block_id.as_bytes())?;
                    change_tree.insert(KEY_RECENT_CHANGE_ID, change_id.as_bytes().as_slice())?;

                    for id in unconfirm {
                        confirmed_tree.remove(id.as_bytes())?;
                    }
                    for id in confirm {
                        confirmed_tree.insert(id.as_bytes(), &[])?;
                    }

                    for i in 0..popped_medians {
                        let ordinal = next_median_ordinal.saturating_sub((popped_medians - i) as u64);
                        median_tree.remove(&ordinal.to_be_bytes())?;
                    }
                    for (i, median) in pushed_medians.iter().enumerate() {
                        let ordinal = next_median_ordinal + i as u64;
                        median_tree.insert(&ordinal.to_be_bytes(), &median.0.to_be_bytes())?;
                    }

                    Ok(())
                },
            )
            .map_err(|e: TransactionError<()>| internal(format!("failed to commit consensus change: {e}")))?;

        self.prune_fee_medians(depth)
    }

    /// Trims the `fee_median` tree down to its `depth` most recent
    /// ordinals. Run outside the main transaction above: it is pure
    /// maintenance over a tree that transaction already left internally
    /// consistent, and sled's transactional trees don't expose iteration.
    fn prune_fee_medians(&self, depth: usize) -> Result<(), InternalError> {
        let mut keys: Vec<sled::IVec> = Vec::new();
        for item in self.fee_median.iter() {
            let (key, _) = item.map_err(|e| internal(format!("failed to scan fee medians: {e}")))?;
            keys.push(key);
        }
        if keys.len() <= depth {
            return Ok(());
        }
        keys.sort();
        for key in &keys[..keys.len() - depth] {
            self.fee_median
                .remove(key)
                .map_err(|e| internal(format!("failed to prune stale fee median: {e}")))?;
        }
        Ok(())
    }

    pub fn flush(&self) -> Result<(), InternalError> {
        self.db
            .flush()
            .map(|_| ())
            .map_err(|e| internal(format!("failed to flush store: {e}")))
    }
}

fn decode_u64(bytes: &[u8]) -> Result<u64, InternalError> {
    bytes
        .try_into()
        .map(u64::from_be_bytes)
        .map_err(|_| internal("corrupt u64 entry"))
}

fn decode_u128(bytes: &[u8]) -> Result<u128, InternalError> {
    bytes
        .try_into()
        .map(u128::from_be_bytes)
        .map_err(|_| internal("corrupt u128 entry"))
}

fn decode_block_id(bytes: &[u8]) -> Result<BlockId, InternalError> {
    let array: [u8; 32] = bytes.try_into().map_err(|_| internal("corrupt block id entry"))?;
    Ok(BlockId::new(array))
}
