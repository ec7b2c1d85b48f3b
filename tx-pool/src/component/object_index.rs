//! Component A: the Object Index. Maps every output/contract/revision/
//! proof id referenced by a pooled set to the set that owns it — the
//! source of truth for conflict detection (`spec.md` §4.A).

use txpool_util::FnvHashMap;
use txpool_types::{ObjectId, TransactionSetId};

#[derive(Default)]
pub struct ObjectIndex {
    index: FnvHashMap<ObjectId, TransactionSetId>,
}

impl ObjectIndex {
    pub fn new() -> Self {
        ObjectIndex::default()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Which pooled set (if any) currently owns `object`.
    pub fn owner_of(&self, object: &ObjectId) -> Option<TransactionSetId> {
        self.index.get(object).copied()
    }

    /// Record every entry in `objects` as owned by `set_id`. Invariant 2
    /// (`spec.md` §3) means callers must have already resolved any
    /// conflicting owner before calling this — insertion here always
    /// overwrites.
    pub fn insert_all(&mut self, set_id: TransactionSetId, objects: impl IntoIterator<Item = ObjectId>) {
        for object in objects {
            self.index.insert(object, set_id);
        }
    }

    /// Remove every entry owned by `set_id`. Used when a set is purged,
    /// confirmed, or superseded by a merge.
    pub fn remove_set(&mut self, set_id: TransactionSetId) {
        self.index.retain(|_, owner| *owner != set_id);
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

    /// The distinct set ids that own any object in `objects` — the
    /// conflict-detection probe `spec.md` §4.D step 3 describes.
    pub fn conflicting_sets(&self, objects: &[ObjectId]) -> Vec<TransactionSetId> {
        let mut seen = txpool_util::FnvHashSet::default();
        let mut conflicts = Vec::new();
        for object in objects {
            if let Some(owner) = self.index.get(object) {
                if seen.insert(*owner) {
                    conflicts.push(*owner);
                }
            }
        }
        conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use txpool_types::ObjectKind;

    fn obj(byte: u8) -> ObjectId {
        ObjectId::new(ObjectKind::CoinOutput, [byte; 32])
    }

    fn set_id(byte: u8) -> TransactionSetId {
        TransactionSetId::new([byte; 32])
    }

    #[test]
    fn insert_and_lookup_roundtrip() {
        let mut index = ObjectIndex::new();
        index.insert_all(set_id(1), vec![obj(1), obj(2)]);
        assert_eq!(index.owner_of(&obj(1)), Some(set_id(1)));
        assert_eq!(index.owner_of(&obj(3)), None);
    }

    #[test]
    fn remove_set_clears_only_its_own_objects() {
        let mut index = ObjectIndex::new();
        index.insert_all(set_id(1), vec![obj(1)]);
        index.insert_all(set_id(2), vec![obj(2)]);
        index.remove_set(set_id(1));
        assert_eq!(index.owner_of(&obj(1)), None);
        assert_eq!(index.owner_of(&obj(2)), Some(set_id(2)));
    }

    #[test]
    fn conflicting_sets_deduplicates_and_preserves_first_seen_order() {
        let mut index = ObjectIndex::new();
        index.insert_all(set_id(1), vec![obj(1)]);
        index.insert_all(set_id(2), vec![obj(2)]);
        let conflicts = index.conflicting_sets(&[obj(1), obj(2), obj(1), obj(3)]);
        assert_eq!(conflicts, vec![set_id(1), set_id(2)]);
    }
}
