//! The block- and consensus-change-shaped data the reorg engine consumes.
//! Blocks themselves are produced by the (out-of-scope) consensus engine;
//! the pool only ever reads their id, parent id, and transaction list.

use crate::id::BlockId;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};

/// A confirmed block, as delivered by a consensus change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    pub parent_id: BlockId,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn new(id: BlockId, parent_id: BlockId, transactions: Vec<Transaction>) -> Self {
        Block {
            id,
            parent_id,
            transactions,
        }
    }
}
