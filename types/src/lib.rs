//! Shared data types for the tpool workspace.
//!
//! This crate is the analogue of `ckb-types` for this workspace: every
//! other crate (the error taxonomy, the pool core) depends on it rather
//! than redefining identifiers or the transaction shape locally.

pub mod block;
pub mod consensus_change;
pub mod currency;
pub mod diff;
pub mod id;
pub mod transaction;

pub use block::Block;
pub use consensus_change::ConsensusChange;
pub use currency::Currency;
pub use diff::ConsensusDiff;
pub use id::{BlockId, ConsensusChangeId, ObjectId, ObjectKind, TransactionId, TransactionSetId};
pub use transaction::{
    CoinInput, CoinOutput, FileContractCreation, FileContractRevision, FundInput, FundOutput,
    KeyAlgorithm, StorageProof, Transaction, TransactionSignature,
};

/// The canonical encoding of an ordered transaction list, used both to
/// derive a [`TransactionSetId`] and to size-account a pooled set.
/// Concatenating each transaction's own canonical encoding (rather than
/// re-serializing the `Vec` as a single value) keeps a set's id stable
/// under insertion of new transactions at a fixed position, matching the
/// "ordered sequence; dependencies precede dependents" invariant in
/// `spec.md` §3.
pub fn canonical_set_encoding(txns: &[Transaction]) -> Vec<u8> {
    let mut buf = Vec::new();
    for txn in txns {
        buf.extend(txn.canonical_encoding());
    }
    buf
}

/// Hash an ordered transaction list into the id of the set it would
/// form.
pub fn transaction_set_id(txns: &[Transaction]) -> TransactionSetId {
    TransactionSetId::new(txpool_hash::blake2b_256(canonical_set_encoding(txns)))
}

/// Byte length of a transaction list's canonical encoding, used for
/// `encoded_size` accounting at both the transaction and set level.
pub fn encoded_size(txns: &[Transaction]) -> u64 {
    txns.iter().map(Transaction::encoded_size).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_id_is_order_sensitive() {
        let a = Transaction {
            miner_fees: vec![Currency::new(1)],
            ..Default::default()
        };
        let b = Transaction {
            miner_fees: vec![Currency::new(2)],
            ..Default::default()
        };
        let forward = transaction_set_id(&[a.clone(), b.clone()]);
        let backward = transaction_set_id(&[b, a]);
        assert_ne!(forward, backward);
    }
}
