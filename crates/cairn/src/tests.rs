use crate::testing::TestExt;
use crate::{limit, HashMap, Shared, SkipMap, TreeMap, Weak};

use core::cell::{Cell, RefCell};

use std::collections;
use std::prelude::v1::*;
use std::rc::Rc as StdRc;
use std::vec;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

#[test]
fn tree_sequential_inserts_stay_balanced() {
    let mut map = TreeMap::new();

    for key in 1..=7u32 {
        assert!(map.try_insert(key, ()).abort());
        map.check_invariants();

        let keys: Vec<_> = map.keys().copied().collect();
        let expected: Vec<_> = (1..=key).collect();
        assert_eq!(keys, expected);
    }

    assert_eq!(map.black_height(), 2);
}

#[test]
fn tree_erase_with_double_rotation() {
    let mut map = TreeMap::new();

    for key in [10, 20, 30, 15, 25, 5, 1] {
        assert!(map.try_insert(key, ()).abort());
    }

    assert_eq!(map.remove(&30), Some(()));
    map.check_invariants();

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, [1, 5, 10, 15, 20, 25]);
}

#[test]
fn skip_list_sorted_insertion() {
    let mut map = SkipMap::try_new().abort();

    for key in [5, 2, 8, 1, 9, 3, 7, 4, 6, 0] {
        assert!(map.try_insert(key, ()).abort());
    }

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert!(map.levels() >= 1);
    map.check_invariants();
}

#[test]
fn hash_table_growth_trigger() {
    let mut map = HashMap::try_new().abort();
    assert_eq!(map.bucket_count(), 17);

    for key in 0..20u32 {
        assert!(map.try_insert(key, key).abort());
    }

    assert_eq!(map.len(), 20);
    assert_eq!(map.bucket_count(), 29);
    // Every key sits in the bucket its hash selects under the new count.
    map.check_invariants();
}

#[test]
fn hash_table_shrink_trigger() {
    let mut map = HashMap::try_new().abort();

    for key in 0..20u32 {
        assert!(map.try_insert(key, key).abort());
    }
    assert_eq!(map.bucket_count(), 29);

    for key in 0..15u32 {
        assert_eq!(map.remove(&key), Some(key));
    }

    assert_eq!(map.len(), 5);
    assert_eq!(map.bucket_count(), 17);
    map.check_invariants();
}

struct CycleNode {
    drops: StdRc<Cell<u32>>,
    next: RefCell<Option<Shared<CycleNode>>>,
    prev: RefCell<Option<Weak<CycleNode>>>,
}

impl CycleNode {
    fn new(drops: &StdRc<Cell<u32>>) -> Self {
        Self {
            drops: drops.clone(),
            next: RefCell::new(None),
            prev: RefCell::new(None),
        }
    }
}

impl Drop for CycleNode {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

#[test]
fn cycle_broken_by_weak_edge_is_fully_destroyed() {
    let a_drops = StdRc::new(Cell::new(0));
    let b_drops = StdRc::new(Cell::new(0));

    let a = Shared::try_new(CycleNode::new(&a_drops)).abort();
    let b = Shared::try_new(CycleNode::new(&b_drops)).abort();

    *a.next.borrow_mut() = Some(b.clone());
    *b.prev.borrow_mut() = Some(Shared::downgrade(&a));

    // The strong edge a -> b and the weak back-edge b -> a form the cycle.
    drop(a);
    assert_eq!(a_drops.get(), 1, "A must die with its last strong pointer");
    assert_eq!(b_drops.get(), 0);

    assert!(b.prev.borrow().as_ref().unwrap().expired());
    assert!(b.prev.borrow().as_ref().unwrap().upgrade().is_none());

    drop(b);
    assert_eq!(b_drops.get(), 1);
}

#[test]
fn insert_then_erase_is_identity_everywhere() {
    let mut tree = TreeMap::new();
    assert!(tree.try_insert(1u32, 1u32).abort());
    assert_eq!(tree.remove(&1), Some(1));
    assert_eq!(tree.len(), 0);
    assert_eq!(tree.get(&1), None);

    let mut skip = SkipMap::try_new().abort();
    assert!(skip.try_insert(1u32, 1u32).abort());
    assert_eq!(skip.remove(&1), Some(1));
    assert_eq!(skip.len(), 0);
    assert_eq!(skip.get(&1), None);

    let mut hash = HashMap::try_new().abort();
    assert!(hash.try_insert(1u32, 1u32).abort());
    assert_eq!(hash.remove(&1), Some(1));
    assert_eq!(hash.len(), 0);
    assert_eq!(hash.get(&1), None);
}

#[test]
fn first_insert_wins_modify_overwrites_everywhere() {
    let mut tree = TreeMap::new();
    let mut skip = SkipMap::try_new().abort();
    let mut hash = HashMap::try_new().abort();

    assert!(tree.try_insert(1u32, "v1").abort());
    assert!(!tree.try_insert(1, "v2").abort());
    assert_eq!(tree.get(&1), Some(&"v1"));
    assert!(tree.modify(&1, "v2"));
    assert_eq!(tree.get(&1), Some(&"v2"));

    assert!(skip.try_insert(1u32, "v1").abort());
    assert!(!skip.try_insert(1, "v2").abort());
    assert_eq!(skip.get(&1), Some(&"v1"));
    assert!(skip.modify(&1, "v2"));
    assert_eq!(skip.get(&1), Some(&"v2"));

    assert!(hash.try_insert(1u32, "v1").abort());
    assert!(!hash.try_insert(1, "v2").abort());
    assert_eq!(hash.get(&1), Some(&"v1"));
    assert!(hash.modify(&1, "v2"));
    assert_eq!(hash.get(&1), Some(&"v2"));
}

#[test]
fn randomized_tree_against_model() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    let mut map = TreeMap::new();
    let mut model = collections::BTreeMap::new();

    for round in 0..4096u32 {
        let key = rng.random_range(0..256u32);

        match rng.random_range(0..5u32) {
            0 | 1 => {
                let inserted = map.try_insert(key, round).abort();
                assert_eq!(inserted, !model.contains_key(&key));
                if inserted {
                    model.insert(key, round);
                }
            }
            2 => {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            3 => {
                let modified = map.modify(&key, round);
                assert_eq!(modified, model.contains_key(&key));
                if modified {
                    model.insert(key, round);
                }
            }
            _ => {
                assert_eq!(map.get(&key), model.get(&key));
            }
        }

        if round % 256 == 0 {
            map.check_invariants();
        }
    }

    map.check_invariants();
    assert_eq!(map.len(), model.len());

    let ours: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let theirs: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(ours, theirs);
}

#[test]
fn randomized_skip_list_against_model() {
    let mut rng = SmallRng::seed_from_u64(0xBADCAB);
    let mut map = SkipMap::try_new().abort();
    let mut model = collections::BTreeMap::new();

    for round in 0..4096u32 {
        let key = rng.random_range(0..256u32);

        match rng.random_range(0..4u32) {
            0 | 1 => {
                let inserted = map.try_insert(key, round).abort();
                assert_eq!(inserted, !model.contains_key(&key));
                if inserted {
                    model.insert(key, round);
                }
            }
            2 => {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            _ => {
                assert_eq!(map.get(&key), model.get(&key));
            }
        }

        if round % 256 == 0 {
            map.check_invariants();
        }
    }

    map.check_invariants();
    assert_eq!(map.len(), model.len());

    let ours: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    let theirs: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(ours, theirs);
}

#[test]
fn randomized_hash_table_against_model() {
    let mut rng = SmallRng::seed_from_u64(0xFEED);
    let mut map = HashMap::try_new().abort();
    let mut model = collections::HashMap::new();

    for round in 0..4096u32 {
        let key = rng.random_range(0..512u32);

        match rng.random_range(0..4u32) {
            0 | 1 => {
                let inserted = map.try_insert(key, round).abort();
                assert_eq!(inserted, !model.contains_key(&key));
                if inserted {
                    model.insert(key, round);
                }
            }
            2 => {
                assert_eq!(map.remove(&key), model.remove(&key));
            }
            _ => {
                assert_eq!(map.get(&key), model.get(&key));
            }
        }

        if round % 256 == 0 {
            map.check_invariants();
        }
    }

    map.check_invariants();
    assert_eq!(map.len(), model.len());

    let mut ours: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    ours.sort_unstable();
    let mut theirs: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
    theirs.sort_unstable();
    assert_eq!(ours, theirs);
}

#[test]
fn failed_tree_insert_leaves_the_map_unchanged() {
    let mut map = TreeMap::new();

    for key in 0..8u32 {
        assert!(map.try_insert(key, key).abort());
    }

    let result = limit::with(0, || map.try_insert(100, 100)).call();
    assert!(result.is_err());

    assert_eq!(map.len(), 8);
    assert!(!map.contains_key(&100));
    map.check_invariants();
}

#[test]
fn failed_rehash_leaves_the_old_buckets_installed() {
    let mut map = HashMap::try_new().abort();

    // One entry short of the growth trigger at 17 buckets.
    for key in 0..13u32 {
        assert!(map.try_insert(key, key).abort());
    }
    assert_eq!(map.bucket_count(), 17);

    // The next insert wants to rehash to 29, which cannot be paid for.
    let result = limit::with(0, || map.try_insert(13, 13)).call();
    assert!(result.is_err());

    assert_eq!(map.bucket_count(), 17);
    assert_eq!(map.len(), 13);
    map.check_invariants();

    for key in 0..13u32 {
        assert_eq!(map.get(&key), Some(&key));
    }

    // With the budget lifted the same insert goes through.
    assert!(map.try_insert(13, 13).abort());
    assert_eq!(map.bucket_count(), 29);
    map.check_invariants();
}

#[test]
fn memory_limit_is_scoped_and_restored() {
    assert_eq!(limit::get(), usize::MAX);

    let result = limit::with(1 << 16, || {
        let mut map = TreeMap::new();

        for key in 0..64u32 {
            map.try_insert(key, vec![key; 8])?;
        }

        assert!(limit::get() < 1 << 16);
        Ok::<_, crate::Error>(map.len())
    })
    .call();

    assert_eq!(result.abort(), 64);
    assert_eq!(limit::get(), usize::MAX);
}
