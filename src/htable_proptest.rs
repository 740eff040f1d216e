#![cfg(test)]

// Property tests for HTable kept inside the crate so the bucket-level
// accessors can be checked against a model directly.

use crate::htable::{HTable, Hashed, HtableEntry};
use crate::jhash::{JHash, KeyHasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use slotmap::{DefaultKey, SlotMap};
use std::collections::BTreeSet;

#[derive(Debug, Default)]
struct Rec {
    entry: HtableEntry<DefaultKey>,
    key: Vec<u8>,
}

impl Hashed<DefaultKey> for Rec {
    fn entry(&self) -> &HtableEntry<DefaultKey> {
        &self.entry
    }
    fn entry_mut(&mut self) -> &mut HtableEntry<DefaultKey> {
        &mut self.entry
    }
    fn key(&self) -> &[u8] {
        &self.key
    }
}

// Pool-indexed operations to improve shrinking. The `DeleteEntry` and
// `Unlink` payloads select a live entry modulo the current live count.
#[derive(Clone, Debug)]
enum Op {
    Add(usize),
    Find(usize),
    FindAny(Vec<u8>),
    DeleteKey(usize),
    DeleteEntry(usize),
    Unlink(usize),
    Iterate,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (usize, Vec<Vec<u8>>, Vec<Op>)> {
    let pool = proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=8);
    (0usize..40, pool).prop_flat_map(|(cap, pool)| {
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => idx.clone().prop_map(Op::Add),
            2 => idx.clone().prop_map(Op::Find),
            1 => proptest::collection::vec(any::<u8>(), 0..6).prop_map(Op::FindAny),
            2 => idx.clone().prop_map(Op::DeleteKey),
            1 => any::<usize>().prop_map(Op::DeleteEntry),
            1 => any::<usize>().prop_map(Op::Unlink),
            1 => Just(Op::Iterate),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (cap, pool.clone(), ops))
    })
}

// Model: live entries in insertion order. Lookups resolve to the newest
// live entry with an equal key.
fn newest(live: &[(DefaultKey, Vec<u8>)], key: &[u8]) -> Option<usize> {
    live.iter().rposition(|(_, k)| k.as_slice() == key)
}

// Expected traversal: bucket index order, newest-first inside a bucket.
fn expected_order<S: KeyHasher>(
    t: &HTable<DefaultKey, S>,
    live: &[(DefaultKey, Vec<u8>)],
) -> Vec<DefaultKey> {
    (0..t.size())
        .flat_map(|b| {
            live.iter()
                .rev()
                .filter(move |(_, k)| t.which_bucket(t.hash_key(k)) == b)
                .map(|(id, _)| *id)
        })
        .collect()
}

// Property: state-machine equivalence against a Vec-based multimap.
// Invariants exercised across random operation sequences:
// - duplicates are kept; `find` returns the newest equal key;
// - delete by key removes exactly the newest duplicate and `len` drops by 1;
// - delete by entry removes the newest duplicate of that entry's key;
// - `unlink` removes exactly the given entry;
// - traversal order is bucket order, newest-first within a bucket;
// - bucket counters sum to `len`;
// - the presence filter has no false negatives, even after deletes.
fn run_scenario<S: KeyHasher>(
    mut t: HTable<DefaultKey, S>,
    pool: Vec<Vec<u8>>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut arena: SlotMap<DefaultKey, Rec> = SlotMap::new();
    let mut live: Vec<(DefaultKey, Vec<u8>)> = Vec::new();
    let mut dead: Vec<DefaultKey> = Vec::new();
    let mut ever_added: BTreeSet<Vec<u8>> = BTreeSet::new();

    for op in ops {
        match op {
            Op::Add(i) => {
                let key = pool[i].clone();
                let id = arena.insert(Rec {
                    key: key.clone(),
                    ..Default::default()
                });
                prop_assert!(t.add(&mut arena, id).is_ok());
                live.push((id, key.clone()));
                ever_added.insert(key);
            }
            Op::Find(i) => {
                let expected = newest(&live, &pool[i]).map(|p| live[p].0);
                prop_assert_eq!(t.find(&arena, &pool[i]), expected);
            }
            Op::FindAny(key) => {
                let expected = newest(&live, &key).map(|p| live[p].0);
                prop_assert_eq!(t.find(&arena, &key), expected);
                let found = t.find_entry(&arena, &key).map(|r| r.key.clone());
                prop_assert_eq!(found, expected.map(|_| key.clone()));
            }
            Op::DeleteKey(i) => {
                let before = t.len();
                let expected = newest(&live, &pool[i]).map(|p| live.remove(p).0);
                prop_assert_eq!(t.delete_by_key(&mut arena, &pool[i]), expected);
                if let Some(id) = expected {
                    prop_assert_eq!(t.len(), before - 1);
                    dead.push(id);
                }
            }
            Op::DeleteEntry(n) => {
                if live.is_empty() {
                    continue;
                }
                // Any duplicate may be picked; the newest one goes.
                let (picked, key) = live[n % live.len()].clone();
                let p = newest(&live, &key).expect("picked key is live");
                let (expected, _) = live.remove(p);
                prop_assert_eq!(t.delete_by_entry(&mut arena, picked), Some(expected));
                dead.push(expected);
            }
            Op::Unlink(n) => {
                if live.is_empty() {
                    // Unlinking something already removed is a no-op.
                    if let Some(&id) = dead.last() {
                        prop_assert_eq!(t.unlink(&mut arena, id), None);
                    }
                    continue;
                }
                let (id, _) = live.remove(n % live.len());
                prop_assert_eq!(t.unlink(&mut arena, id), Some(id));
                dead.push(id);
            }
            Op::Iterate => {
                let got: Vec<_> = t.iter(&arena).collect();
                prop_assert_eq!(got, expected_order(&t, &live));
            }
            Op::Clear => {
                t.clear(&mut arena);
                dead.extend(live.drain(..).map(|(id, _)| id));
                ever_added.clear();
                prop_assert_eq!(t.filter().popcount(), 0);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(t.len(), live.len());
        prop_assert_eq!(t.is_empty(), live.is_empty());
        let bucket_sum: usize = (0..t.size()).filter_map(|b| t.bucket_len(b)).sum();
        prop_assert_eq!(bucket_sum, t.len());
        for (id, _) in &live {
            prop_assert!(arena[*id].entry.is_linked());
        }
        for id in &dead {
            prop_assert!(!arena[*id].entry.is_linked());
        }
        for key in &ever_added {
            prop_assert!(t.filter().test(t.hash_key(key)));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cap, pool, ops) in arb_scenario()) {
        run_scenario(HTable::with_capacity(cap), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstHasher;
impl KeyHasher for ConstHasher {
    fn hash_bytes(&self, _key: &[u8]) -> u32 {
        0
    }
}

// Property: same invariants as above with every key in one bucket and one
// filter slot.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cap, pool, ops) in arb_scenario()) {
        run_scenario(HTable::with_capacity_and_hasher(cap, ConstHasher), pool, ops)?;
    }

    #[test]
    fn prop_state_machine_seeded((cap, pool, ops) in arb_scenario(), seed in any::<u32>()) {
        run_scenario(HTable::with_capacity_and_hasher(cap, JHash::with_seed(seed)), pool, ops)?;
    }
}
