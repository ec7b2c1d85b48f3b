//! Pool configuration, modeled on `ckb-app-config`'s per-subsystem config
//! structs: a plain `Deserialize` + `Default` struct the embedding
//! application loads from its own config file and hands to
//! [`crate::TxPoolService::new`]. This crate never reads a file itself.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use txpool_types::Currency;

/// Upper bound on total encoded unconfirmed bytes (`TransactionPoolSizeLimit`).
pub const DEFAULT_MAX_POOL_SIZE: u64 = 2 * 1024 * 1024 - 4096;
/// Threshold above which miner fees are required (`TransactionPoolSizeForFee`).
pub const DEFAULT_POOL_SIZE_FOR_FEE: u64 = 500 * 1024;
/// Max encoded bytes per transaction (`TransactionSizeLimit`).
pub const DEFAULT_MAX_TX_SIZE: u64 = 16 * 1024;
/// Max encoded bytes per set (`TransactionSetSizeLimit`).
pub const DEFAULT_MAX_TX_SET_SIZE: u64 = 2 * 16 * 1024;
/// Per-transaction fee floor when fees are required (`TransactionMinFee`).
pub const DEFAULT_MIN_TX_FEE: u128 = 2;
/// Earliest relative start height for file contracts (`FileContractConfirmWindow`).
pub const DEFAULT_FILE_CONTRACT_CONFIRM_WINDOW: u64 = 10;
/// Ring capacity for the fee-median estimator (`blockFeeEstimationDepth`).
pub const DEFAULT_BLOCK_FEE_ESTIMATION_DEPTH: usize = 6;
/// Age-pruning threshold in blocks (`maxTxnAge`).
pub const DEFAULT_MAX_TXN_AGE: u64 = 24;
/// DB-commit period (`tpoolSyncRate`).
pub const DEFAULT_SYNC_RATE_SECS: u64 = 120;
/// Supplemental recent-reject LRU capacity.
pub const DEFAULT_RECENT_REJECT_CAPACITY: usize = 4096;
/// The consensus engine's block size limit, used only to size the
/// synthetic "unused space" entry the fee estimator folds into each
/// block's median (`spec.md` §4.E step 4). Not itself an admission
/// bound — out of scope, consensus owns the real limit.
pub const DEFAULT_BLOCK_SIZE_LIMIT: u64 = 2_000_000;

/// Pool-wide size and fee configuration, recognized options from
/// `spec.md` §6 plus the ambient knobs `SPEC_FULL.md` §4.I adds.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TxPoolConfig {
    pub max_pool_size: u64,
    pub pool_size_for_fee: u64,
    pub max_tx_size: u64,
    pub max_tx_set_size: u64,
    pub min_tx_fee: u128,
    pub file_contract_confirm_window: u64,
    pub block_fee_estimation_depth: usize,
    pub max_txn_age: u64,
    pub sync_rate_secs: u64,
    pub recent_reject_capacity: usize,
    pub block_size_limit: u64,
    pub db_path: PathBuf,
}

impl Default for TxPoolConfig {
    fn default() -> Self {
        TxPoolConfig {
            max_pool_size: DEFAULT_MAX_POOL_SIZE,
            pool_size_for_fee: DEFAULT_POOL_SIZE_FOR_FEE,
            max_tx_size: DEFAULT_MAX_TX_SIZE,
            max_tx_set_size: DEFAULT_MAX_TX_SET_SIZE,
            min_tx_fee: DEFAULT_MIN_TX_FEE,
            file_contract_confirm_window: DEFAULT_FILE_CONTRACT_CONFIRM_WINDOW,
            block_fee_estimation_depth: DEFAULT_BLOCK_FEE_ESTIMATION_DEPTH,
            max_txn_age: DEFAULT_MAX_TXN_AGE,
            sync_rate_secs: DEFAULT_SYNC_RATE_SECS,
            recent_reject_capacity: DEFAULT_RECENT_REJECT_CAPACITY,
            block_size_limit: DEFAULT_BLOCK_SIZE_LIMIT,
            db_path: PathBuf::from("txpool-db"),
        }
    }
}

impl TxPoolConfig {
    pub fn min_tx_fee(&self) -> Currency {
        Currency::new(self.min_tx_fee)
    }

    pub fn sync_rate(&self) -> Duration {
        Duration::from_secs(self.sync_rate_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_spec_constants() {
        let cfg = TxPoolConfig::default();
        assert_eq!(cfg.block_fee_estimation_depth, 6);
        assert_eq!(cfg.max_txn_age, 24);
        assert_eq!(cfg.min_tx_fee(), Currency::new(2));
    }

    #[test]
    fn deserializes_with_missing_fields_defaulted() {
        // `#[serde(default)]` means a fragment naming only some fields
        // still deserializes, backfilling the rest from `Default`.
        let cfg: TxPoolConfig =
            serde_json::from_str(r#"{"max_txn_age":48,"db_path":"/tmp/foo"}"#).unwrap();
        assert_eq!(cfg.max_txn_age, 48);
        assert_eq!(
            cfg.block_fee_estimation_depth,
            DEFAULT_BLOCK_FEE_ESTIMATION_DEPTH
        );
    }
}
