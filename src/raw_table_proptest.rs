#![cfg(test)]

// Property tests for RawTable kept inside the crate so they can reach the
// crate-private engine and its invariant checker.

use crate::placement;
use crate::raw_table::RawTable;
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations so that failures shrink toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Reserve(usize),
    Shrink(usize),
    ClearTo(usize),
    RetainEven,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::btree_set("[a-z]{1,4}", 1..=24).prop_flat_map(|pool| {
        let pool: Vec<String> = pool.into_iter().collect();
        let idx = 0..pool.len();
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Put(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => (0usize..64).prop_map(Op::Reserve),
            1 => (0usize..64).prop_map(Op::Shrink),
            1 => (0usize..64).prop_map(Op::ClearTo),
            1 => Just(Op::RetainEven),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// A deliberately poor hash: four buckets' worth of entropy, so chains
// collide, interleave, and wrap around the table end.
fn coarse_hash(k: &String) -> u64 {
    (k.bytes().map(u64::from).sum::<u64>() % 4) << 61
}

fn string_hash(k: &String) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut h = std::collections::hash_map::DefaultHasher::new();
    k.hash(&mut h);
    h.finish()
}

fn run(
    pool: &[String],
    ops: Vec<Op>,
    hash_of: fn(&String) -> u64,
) -> Result<(), TestCaseError> {
    let mut sut: RawTable<Option<String>, i32> = RawTable::with_table_size(2, 0.75);
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::Put(i, v) => {
                let k = &pool[i];
                match sut.locate(hash_of(k), |x| x == k) {
                    Ok(slot) => {
                        let prev = sut.replace_value(slot, v);
                        prop_assert_eq!(prev, model.insert(k.clone(), v));
                    }
                    Err(slot) => {
                        prop_assert!(!model.contains_key(k), "insertion point for a live key");
                        sut.insert_at(slot, k.clone(), v, 0, hash_of);
                        model.insert(k.clone(), v);
                    }
                }
            }
            Op::Remove(i) => {
                let k = &pool[i];
                let got = sut
                    .locate(hash_of(k), |x| x == k)
                    .ok()
                    .map(|slot| sut.remove_at(slot, hash_of));
                match (got, model.remove(k)) {
                    (Some(r), Some(mv)) => {
                        prop_assert_eq!(&r.key, k);
                        prop_assert_eq!(r.value, mv);
                    }
                    (None, None) => {}
                    (got, mv) => prop_assert!(false, "remove mismatch: {:?} vs {:?}", got, mv),
                }
            }
            Op::Get(i) => {
                let k = &pool[i];
                let got = sut
                    .locate(hash_of(k), |x| x == k)
                    .ok()
                    .and_then(|slot| sut.value_at(slot));
                prop_assert_eq!(got, model.get(k));
            }
            Op::Reserve(n) => {
                let total = sut.len() + n;
                sut.ensure_capacity(total, hash_of).unwrap();
                let wanted = placement::table_size(total, sut.load_factor()).unwrap();
                prop_assert!(sut.slot_count() >= wanted);
                prop_assert!(sut.threshold() > total);
            }
            Op::Shrink(n) => {
                let before = sut.slot_count();
                sut.shrink(n, sut.len(), hash_of);
                prop_assert!(sut.slot_count() <= before);
            }
            Op::ClearTo(n) => {
                sut.clear_to(n);
                model.clear();
            }
            Op::RetainEven => {
                let removed = sut.retain(|_, v| *v % 2 == 0, hash_of);
                let before = model.len();
                model.retain(|_, v| *v % 2 == 0);
                prop_assert_eq!(removed, before - model.len());
            }
        }

        sut.assert_invariants(hash_of);
        prop_assert_eq!(sut.len(), model.len());
    }

    let mut seen: Vec<(String, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut expect: Vec<(String, i32)> = model.into_iter().collect();
    seen.sort();
    expect.sort();
    prop_assert_eq!(seen, expect);
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised after every op:
// - probe chains are contiguous and `len` matches the occupied slots;
// - put/get/remove agree with the model, overwrites return the old value;
// - reserve pre-sizes, shrink and clear_to never grow, retain removes
//   exactly the rejected entries.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run(&pool, ops, string_hash)?;
    }

    #[test]
    fn prop_state_machine_colliding((pool, ops) in arb_scenario()) {
        run(&pool, ops, coarse_hash)?;
    }
}
