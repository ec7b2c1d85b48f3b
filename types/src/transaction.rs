//! The concrete `Transaction` shape. `spec.md` §3 describes this as an
//! "external type, consumed as opaque by the core"; we give it a
//! concrete representation (there is no separate consensus-engine crate
//! in this workspace to own it) but the pool's own logic only ever
//! touches it through [`Transaction::related_objects`],
//! [`Transaction::encoded_size`], and [`Transaction::id`] — it never
//! branches on which optional fields are populated beyond what
//! standardness checking requires.

use crate::currency::Currency;
use crate::id::{ObjectId, ObjectKind, TransactionId};
use serde::{Deserialize, Serialize};

/// Consumes an existing coin output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInput {
    pub parent_id: ObjectId,
}

/// Creates a new spendable coin output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinOutput {
    pub value: Currency,
    pub unlock_hash: [u8; 32],
}

/// Creates a new file contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContractCreation {
    pub payload_hash: [u8; 32],
    pub payout: Currency,
    /// Absolute block height at which the contract's window opens.
    /// Standardness requires this to be at least `FileContractConfirmWindow`
    /// blocks above the current height (spec.md §4.D.2).
    pub window_start: u64,
}

/// Revises an existing file contract in place. Consumes the previous
/// revision's parent id; does not mint a new object id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContractRevision {
    pub parent_id: ObjectId,
    pub new_payload_hash: [u8; 32],
    pub revision_number: u64,
}

/// Proves a file contract's obligation was fulfilled. Consumes the
/// contract's parent id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    pub parent_id: ObjectId,
    pub proof: Vec<u8>,
}

/// Consumes an existing fund-token output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundInput {
    pub parent_id: ObjectId,
}

/// Creates a new fund-token output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FundOutput {
    pub value: u64,
    pub unlock_hash: [u8; 32],
}

/// The public-key algorithm an unlock condition names. Standardness
/// requires every algorithm referenced by a transaction's signatures to
/// be one the node recognizes (spec.md §4.D.2).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyAlgorithm {
    Ed25519,
    /// An algorithm identifier this node does not recognize. Carries the
    /// raw tag so standardness checking can report it.
    Unrecognized(u8),
}

impl KeyAlgorithm {
    pub fn is_recognized(self) -> bool {
        matches!(self, KeyAlgorithm::Ed25519)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSignature {
    pub algorithm: KeyAlgorithm,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
}

/// The recognized arbitrary-data prefixes (spec.md §4.D.2).
pub const NON_SIA_PREFIX: &[u8] = b"NonSia";
pub const HOST_ANNOUNCEMENT_PREFIX: &[u8] = b"HostAnnouncement";

/// A single transaction. Carries zero or more of every resource kind the
/// spec lists; an empty transaction (no inputs, no outputs, no fee) is
/// structurally valid here — standardness and consensus are what reject
/// degenerate transactions, not this type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub coin_inputs: Vec<CoinInput>,
    pub coin_outputs: Vec<CoinOutput>,
    pub file_contracts: Vec<FileContractCreation>,
    pub file_contract_revisions: Vec<FileContractRevision>,
    pub storage_proofs: Vec<StorageProof>,
    pub fund_inputs: Vec<FundInput>,
    pub fund_outputs: Vec<FundOutput>,
    pub miner_fees: Vec<Currency>,
    pub arbitrary_data: Vec<Vec<u8>>,
    pub signatures: Vec<TransactionSignature>,
}

impl Transaction {
    /// The canonical byte encoding used for both hashing and size
    /// accounting. `bincode`'s default (fixed-int, no trailing
    /// allocator-dependent padding) config is deterministic across
    /// builds, which is what "canonical" requires here.
    pub fn canonical_encoding(&self) -> Vec<u8> {
        bincode::serialize(self).expect("Transaction always serializes")
    }

    /// Byte length of the canonical encoding.
    pub fn encoded_size(&self) -> u64 {
        self.canonical_encoding().len() as u64
    }

    /// The transaction's id: the hash of its canonical encoding. Not
    /// memoized (see `DESIGN.md`) — every call recomputes it.
    pub fn id(&self) -> TransactionId {
        TransactionId::new(txpool_hash::blake2b_256(self.canonical_encoding()))
    }

    /// Sum of every miner fee attached to this transaction.
    pub fn total_miner_fee(&self) -> Currency {
        self.miner_fees.iter().copied().sum()
    }

    /// Every object this transaction *consumes*: the key domain probed
    /// against the Object Index for conflict detection.
    pub fn consumed_objects(&self) -> Vec<ObjectId> {
        let mut objs = Vec::with_capacity(
            self.coin_inputs.len()
                + self.file_contract_revisions.len()
                + self.storage_proofs.len()
                + self.fund_inputs.len(),
        );
        objs.extend(self.coin_inputs.iter().map(|i| i.parent_id));
        objs.extend(self.file_contract_revisions.iter().map(|r| r.parent_id));
        objs.extend(self.storage_proofs.iter().map(|p| p.parent_id));
        objs.extend(self.fund_inputs.iter().map(|i| i.parent_id));
        objs
    }

    /// Every object this transaction *creates*, keyed off its own id so
    /// that two structurally-identical sibling outputs still mint
    /// distinct object ids.
    pub fn created_objects(&self) -> Vec<ObjectId> {
        let txid = self.id();
        let mut objs = Vec::with_capacity(self.coin_outputs.len() + self.fund_outputs.len());
        for (index, _) in self.coin_outputs.iter().enumerate() {
            objs.push(output_object_id(&txid, ObjectKind::CoinOutput, index));
        }
        for (index, _) in self.file_contracts.iter().enumerate() {
            objs.push(output_object_id(&txid, ObjectKind::FileContract, index));
        }
        for (index, _) in self.fund_outputs.iter().enumerate() {
            objs.push(output_object_id(&txid, ObjectKind::FundOutput, index));
        }
        objs
    }

    /// The union of consumed and created objects: the "related objects"
    /// the glossary defines as the key domain for conflict detection.
    pub fn related_objects(&self) -> Vec<ObjectId> {
        let mut objs = self.consumed_objects();
        objs.extend(self.created_objects());
        objs
    }

    pub fn is_empty(&self) -> bool {
        self.coin_inputs.is_empty()
            && self.coin_outputs.is_empty()
            && self.file_contracts.is_empty()
            && self.file_contract_revisions.is_empty()
            && self.storage_proofs.is_empty()
            && self.fund_inputs.is_empty()
            && self.fund_outputs.is_empty()
            && self.miner_fees.is_empty()
            && self.arbitrary_data.is_empty()
    }
}

/// Derive the object id of the `index`-th output of `kind` created by
/// transaction `txid`, matching the convention used throughout
/// UTXO-style chains of hashing `(txid, index)` rather than minting a
/// fresh random id.
fn output_object_id(txid: &TransactionId, kind: ObjectKind, index: usize) -> ObjectId {
    let mut hasher = txpool_hash::Blake2bHasher::default();
    hasher.update(txid.as_bytes());
    hasher.update(&(index as u64).to_le_bytes());
    ObjectId::new(kind, hasher.finalize())
}

/// Every recognized arbitrary-data prefix, as used by standardness
/// checking.
pub fn recognized_arbitrary_data_prefixes() -> [&'static [u8]; 2] {
    [NON_SIA_PREFIX, HOST_ANNOUNCEMENT_PREFIX]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx(fee: u128) -> Transaction {
        Transaction {
            coin_outputs: vec![CoinOutput {
                value: Currency::new(100),
                unlock_hash: [1; 32],
            }],
            miner_fees: vec![Currency::new(fee)],
            ..Default::default()
        }
    }

    #[test]
    fn id_is_deterministic_and_content_addressed() {
        let a = sample_tx(5);
        let b = sample_tx(5);
        let c = sample_tx(6);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn created_object_ids_are_distinct_per_output() {
        let tx = Transaction {
            coin_outputs: vec![
                CoinOutput {
                    value: Currency::new(1),
                    unlock_hash: [0; 32],
                },
                CoinOutput {
                    value: Currency::new(1),
                    unlock_hash: [0; 32],
                },
            ],
            ..Default::default()
        };
        let created = tx.created_objects();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0], created[1]);
    }

    #[test]
    fn related_objects_is_union_of_consumed_and_created() {
        let tx = Transaction {
            coin_inputs: vec![CoinInput {
                parent_id: ObjectId::new(ObjectKind::CoinOutput, [9; 32]),
            }],
            coin_outputs: vec![CoinOutput {
                value: Currency::new(1),
                unlock_hash: [0; 32],
            }],
            ..Default::default()
        };
        let related = tx.related_objects();
        assert_eq!(related.len(), 2);
    }
}
