//! The message the (out-of-scope) consensus engine delivers to drive
//! `ProcessConsensusChange` (spec.md §4.E).

use crate::block::Block;
use crate::id::ConsensusChangeId;
use serde::{Deserialize, Serialize};

/// Reverted and applied blocks since the last notification, tip→older
/// for `reverted_blocks` and older→tip for `applied_blocks`, exactly as
/// `spec.md` §4.E describes. The "callable `TryTransactionSet` bound to
/// the new tip" the spec mentions is represented separately, as the
/// `ConsensusClient` trait object the reorg engine is handed alongside
/// this value — it isn't serializable data, so it doesn't belong on this
/// struct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusChange {
    pub id: ConsensusChangeId,
    pub reverted_blocks: Vec<Block>,
    pub applied_blocks: Vec<Block>,
}

impl ConsensusChange {
    pub fn new(
        id: ConsensusChangeId,
        reverted_blocks: Vec<Block>,
        applied_blocks: Vec<Block>,
    ) -> Self {
        ConsensusChange {
            id,
            reverted_blocks,
            applied_blocks,
        }
    }
}
