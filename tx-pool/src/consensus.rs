//! The boundary to the (out-of-scope) consensus engine. `spec.md` §1
//! explicitly excludes "consensus validation itself (`TryTransactionSet`,
//! `StandaloneValid`)" from this crate's scope; this module defines only
//! the interface the admission and reorg engines call through, so the
//! core can be exercised in tests without a real consensus engine.

use txpool_types::{ConsensusDiff, Transaction};

/// What the admission and reorg engines need from consensus: the ability
/// to check whether an ordered transaction list would be valid against
/// the current (or, during a reorg, the new) confirmed tip.
pub trait ConsensusClient: Send + Sync {
    /// Validate `txns` against the tip this client is bound to. On
    /// success, returns the diff of objects the set would create. On
    /// failure, returns the consensus engine's rejection message
    /// verbatim, to be wrapped in `Reject::ConsensusConflict`.
    fn try_transaction_set(&self, txns: &[Transaction]) -> Result<ConsensusDiff, String>;
}

/// A `ConsensusClient` that accepts every structurally well-formed set
/// and derives the diff purely from the transactions' own declared
/// outputs. Used by tests and as a starting point for an embedder that
/// has not yet wired in a real consensus engine; `spec.md`'s invariants
/// (I4, no confirmed-id may be re-spent, etc.) are still enforced by the
/// reorg engine's confirmed-id bookkeeping regardless of which consensus
/// client is plugged in.
#[derive(Default, Clone, Copy)]
pub struct PermissiveConsensusClient;

impl ConsensusClient for PermissiveConsensusClient {
    fn try_transaction_set(&self, txns: &[Transaction]) -> Result<ConsensusDiff, String> {
        let mut created = Vec::new();
        for txn in txns {
            created.extend(txn.created_objects());
        }
        Ok(ConsensusDiff::new(created))
    }
}
