//! The consensus diff a `TryTransactionSet` call returns on success. This
//! is the boundary value exchanged with the out-of-scope consensus
//! engine, analogous to `Transaction` itself: the pool treats it as data
//! to record and index, never interprets its internals beyond the
//! object ids it lists.

use crate::id::ObjectId;
use serde::{Deserialize, Serialize};

/// The set of objects a validated transaction set would create, as
/// reported by consensus. `spec.md` §4.D step 4 updates the Object Index
/// "with every diff-ID" returned here, rather than recomputing created
/// objects purely from the transactions — the diff is the authoritative
/// source, since a real consensus engine may resolve objects a purely
/// structural walk of the transactions can't see (e.g. script-derived
/// outputs).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusDiff {
    pub created_objects: Vec<ObjectId>,
}

impl ConsensusDiff {
    pub fn new(created_objects: Vec<ObjectId>) -> Self {
        ConsensusDiff { created_objects }
    }
}
