//! The set-finding algorithm `spec.md` §4.F.1 describes: partitions an
//! ordered transaction list (e.g. a block's transactions) into maximal
//! independent sets, where every transaction lands in the same set as
//! every ancestor it references via a parent id.
//!
//! Used by the reorg engine to compute per-block fee medians (each
//! independent set's average fee-per-byte contributes one ring entry).

use txpool_util::FnvHashMap;
use txpool_types::{ObjectId, Transaction, TransactionId};

/// Union-find-like structure with path collapsing, exactly as `spec.md`
/// §4.F.1 specifies: `setMap`, `txMap`, `objMap`, `forwards`.
pub fn partition_independent_sets(txns: &[Transaction]) -> Vec<Vec<Transaction>> {
    let mut set_map: Vec<Option<Vec<Transaction>>> = vec![None; txns.len()];
    let mut tx_map: FnvHashMap<TransactionId, usize> = FnvHashMap::default();
    let mut obj_map: FnvHashMap<ObjectId, TransactionId> = FnvHashMap::default();
    let mut forwards: FnvHashMap<usize, usize> = FnvHashMap::default();

    for (i, t) in txns.iter().enumerate() {
        let txid = t.id();

        let mut parent_sets: Vec<usize> = Vec::new();
        let mut seen = txpool_util::FnvHashSet::default();
        for parent_obj in t.consumed_objects() {
            if let Some(parent_txid) = obj_map.get(&parent_obj) {
                if let Some(&parent_index) = tx_map.get(parent_txid) {
                    let representative = find(&mut forwards, parent_index);
                    if seen.insert(representative) {
                        parent_sets.push(representative);
                    }
                }
            }
        }

        if parent_sets.is_empty() {
            set_map[i] = Some(vec![t.clone()]);
        } else {
            let base = parent_sets[0];
            set_map[base]
                .as_mut()
                .expect("base set always present")
                .push(t.clone());
            for &other in &parent_sets[1..] {
                if other == base {
                    continue;
                }
                if let Some(mut moved) = set_map[other].take() {
                    set_map[base]
                        .as_mut()
                        .expect("base set always present")
                        .append(&mut moved);
                }
                forwards.insert(other, base);
            }
        }

        for created in t.created_objects() {
            obj_map.insert(created, txid);
        }
        tx_map.insert(txid, i);
    }

    set_map.into_iter().flatten().collect()
}

/// Follow `forwards` to the current representative of `index`,
/// collapsing every link walked along the way onto the final
/// representative.
fn find(forwards: &mut FnvHashMap<usize, usize>, index: usize) -> usize {
    let mut path = Vec::new();
    let mut current = index;
    while let Some(&next) = forwards.get(&current) {
        path.push(current);
        current = next;
    }
    for node in path {
        forwards.insert(node, current);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use txpool_types::{CoinInput, CoinOutput, Currency, ObjectKind};

    fn output_only(value: u128) -> Transaction {
        Transaction {
            coin_outputs: vec![CoinOutput {
                value: Currency::new(value),
                unlock_hash: [0; 32],
            }],
            ..Default::default()
        }
    }

    fn spend(parent: ObjectId, value: u128) -> Transaction {
        Transaction {
            coin_inputs: vec![CoinInput { parent_id: parent }],
            coin_outputs: vec![CoinOutput {
                value: Currency::new(value),
                unlock_hash: [0; 32],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn independent_transactions_form_their_own_singleton_sets() {
        let a = output_only(1);
        let b = output_only(2);
        let sets = partition_independent_sets(&[a, b]);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].len(), 1);
        assert_eq!(sets[1].len(), 1);
    }

    #[test]
    fn a_child_joins_its_parents_set() {
        let parent = output_only(1);
        let parent_obj = parent.created_objects()[0];
        let child = spend(parent_obj, 1);
        let sets = partition_independent_sets(&[parent, child]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), 2);
    }

    #[test]
    fn a_transaction_with_two_independent_parents_merges_both_sets() {
        let parent_a = output_only(1);
        let parent_b = output_only(2);
        let obj_a = parent_a.created_objects()[0];
        let obj_b = parent_b.created_objects()[0];
        let child = Transaction {
            coin_inputs: vec![
                CoinInput { parent_id: obj_a },
                CoinInput { parent_id: obj_b },
            ],
            coin_outputs: vec![CoinOutput {
                value: Currency::new(1),
                unlock_hash: [0; 32],
            }],
            ..Default::default()
        };
        let sets = partition_independent_sets(&[parent_a, parent_b, child]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), 3);
    }

    #[test]
    fn unrelated_object_kind_does_not_spuriously_match() {
        // A CoinOutput and a FileContract minted with the same raw bytes
        // must never be treated as the same object.
        let spurious = ObjectId::new(ObjectKind::FileContract, [0xee; 32]);
        let tx = spend(spurious, 1);
        let sets = partition_independent_sets(&[tx]);
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].len(), 1);
    }
}
