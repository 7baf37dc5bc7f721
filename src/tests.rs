use std::ops::Range;

use proptest::prelude::*;

use crate::model;

use super::*;

fn insert_find_all(keys: &[u32]) {
    let mut map: SortedMap<u32, u32> = SortedMap::new();

    for &key in keys {
        map.insert(key, key * 10);
        map.assert_invariants();
    }

    for &key in keys {
        assert_eq!(map.get(&key), Some(&(key * 10)), "key {key} not found");
    }
}

#[test]
fn zero_elems_find() {
    insert_find_all(&[]);
}

#[test]
fn single_elem_find() {
    insert_find_all(&[0]);
}

#[test]
fn two_elems_find() {
    insert_find_all(&[0, 1]);
    insert_find_all(&[1, 0]);
}

#[test]
fn three_elems_find() {
    insert_find_all(&[0, 1, 2]);
    insert_find_all(&[0, 2, 1]);
    insert_find_all(&[1, 0, 2]);
    insert_find_all(&[1, 2, 0]);
    insert_find_all(&[2, 0, 1]);
    insert_find_all(&[2, 1, 0]);
}

#[test]
fn four_elems_find() {
    insert_find_all(&[0, 1, 2, 3]);
    insert_find_all(&[0, 1, 3, 2]);
    insert_find_all(&[0, 2, 1, 3]);
    insert_find_all(&[0, 2, 3, 1]);
    insert_find_all(&[0, 3, 1, 2]);
    insert_find_all(&[0, 3, 2, 1]);

    insert_find_all(&[1, 0, 2, 3]);
    insert_find_all(&[1, 0, 3, 2]);
    insert_find_all(&[1, 2, 0, 3]);
    insert_find_all(&[1, 2, 3, 0]);
    insert_find_all(&[1, 3, 0, 2]);
    insert_find_all(&[1, 3, 2, 0]);

    insert_find_all(&[2, 0, 1, 3]);
    insert_find_all(&[2, 0, 3, 1]);
    insert_find_all(&[2, 1, 0, 3]);
    insert_find_all(&[2, 1, 3, 0]);
    insert_find_all(&[2, 3, 0, 1]);
    insert_find_all(&[2, 3, 1, 0]);

    insert_find_all(&[3, 0, 1, 2]);
    insert_find_all(&[3, 0, 2, 1]);
    insert_find_all(&[3, 1, 0, 2]);
    insert_find_all(&[3, 1, 2, 0]);
    insert_find_all(&[3, 2, 0, 1]);
    insert_find_all(&[3, 2, 1, 0]);
}

fn insert_remove_all(keys: &[u32]) {
    let mut map: SortedMap<u32, u32> = SortedMap::new();

    for &key in keys {
        map.insert(key, key);
        map.assert_invariants();
    }

    for &key in keys {
        assert_eq!(map.remove(&key), Some(key));
        map.assert_invariants();
    }

    for &key in keys {
        map.insert(key, key);
        map.assert_invariants();
    }

    for key in keys.iter().rev() {
        assert_eq!(map.remove(key), Some(*key));
        map.assert_invariants();
    }

    assert!(map.is_empty());
}

#[test]
fn remove_one() {
    insert_remove_all(&[0]);
}

#[test]
fn remove_two() {
    insert_remove_all(&[0, 1]);
    insert_remove_all(&[1, 0]);
}

#[test]
fn remove_three() {
    insert_remove_all(&[0, 1, 2]);
    insert_remove_all(&[0, 2, 1]);
    insert_remove_all(&[1, 0, 2]);
    insert_remove_all(&[1, 2, 0]);
    insert_remove_all(&[2, 0, 1]);
    insert_remove_all(&[2, 1, 0]);
}

#[test]
fn remove_four() {
    insert_remove_all(&[0, 1, 2, 3]);
    insert_remove_all(&[0, 1, 3, 2]);
    insert_remove_all(&[0, 2, 1, 3]);
    insert_remove_all(&[0, 2, 3, 1]);
    insert_remove_all(&[0, 3, 1, 2]);
    insert_remove_all(&[0, 3, 2, 1]);

    insert_remove_all(&[1, 0, 2, 3]);
    insert_remove_all(&[1, 0, 3, 2]);
    insert_remove_all(&[1, 2, 0, 3]);
    insert_remove_all(&[1, 2, 3, 0]);
    insert_remove_all(&[1, 3, 0, 2]);
    insert_remove_all(&[1, 3, 2, 0]);

    insert_remove_all(&[2, 0, 1, 3]);
    insert_remove_all(&[2, 0, 3, 1]);
    insert_remove_all(&[2, 1, 0, 3]);
    insert_remove_all(&[2, 1, 3, 0]);
    insert_remove_all(&[2, 3, 0, 1]);
    insert_remove_all(&[2, 3, 1, 0]);

    insert_remove_all(&[3, 0, 1, 2]);
    insert_remove_all(&[3, 0, 2, 1]);
    insert_remove_all(&[3, 1, 0, 2]);
    insert_remove_all(&[3, 1, 2, 0]);
    insert_remove_all(&[3, 2, 0, 1]);
    insert_remove_all(&[3, 2, 1, 0]);
}

#[test]
fn sorted_keys_and_point_lookup() {
    let mut map = SortedMap::new();
    map.insert(2, "b");
    map.insert(1, "a");
    map.insert(3, "c");

    assert_eq!(map.keys().collect::<Vec<_>>(), [&1, &2, &3]);
    assert_eq!(map.get(&2), Some(&"b"));
    assert_eq!(map.values().collect::<Vec<_>>(), [&"a", &"b", &"c"]);
    assert_eq!(map.iter().collect::<Vec<_>>(), [(&1, &"a"), (&2, &"b"), (&3, &"c")]);
}

#[test]
fn insert_replaces_existing_value() {
    let mut map = SortedMap::new();

    assert_eq!(map.insert(1, "a"), None);
    assert_eq!(map.insert(1, "b"), Some("a"));
    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&1), Some(&"b"));
    map.assert_invariants();
}

#[test]
fn get_mut_updates_in_place() {
    let mut map = SortedMap::new();
    map.insert(4, String::from("four"));

    map.get_mut(&4).expect("key 4 was just inserted").push('!');

    assert_eq!(map.get(&4).map(String::as_str), Some("four!"));
    assert_eq!(map.get_mut(&5), None);
}

#[test]
fn duplicate_pairs_yield_in_value_order() {
    let mut map = SortedMultiMap::new();
    map.insert(5, "x");
    map.insert(5, "x");
    map.insert(5, "y");

    assert_eq!(map.len(), 3);
    assert_eq!(map.values_for_key(&5).collect::<Vec<_>>(), [&"x", &"x", &"y"]);
    assert_eq!(map.keys().collect::<Vec<_>>(), [&5]);
    map.assert_invariants();
}

#[test]
fn remove_takes_one_entry_per_call() {
    let mut map = SortedMultiMap::new();

    for value in 1..=100 {
        map.insert(1, value);
    }

    assert!(map.remove(&1, &1));
    assert_eq!(map.len(), 99);
    assert!(map.values_for_key(&1).eq(&(2..=100).collect::<Vec<_>>()));
    map.assert_invariants();

    assert!(!map.remove(&1, &1));
    assert_eq!(map.len(), 99);
}

#[test]
fn duplicate_pair_removal_counts_copies() {
    let mut map = SortedMultiMap::new();

    for _ in 0..3 {
        map.insert(7, 7);
        map.assert_invariants();
    }

    assert_eq!(map.len(), 3);

    for remaining in (0..3).rev() {
        assert!(map.remove(&7, &7));
        assert_eq!(map.len(), remaining);
        map.assert_invariants();
    }

    assert!(!map.remove(&7, &7));
    assert!(map.is_empty());
}

#[test]
fn empty_map_queries() {
    let mut map: SortedMap<u32, u32> = SortedMap::new();

    assert_eq!(map.remove(&0), None);
    assert_eq!(map.len(), 0);
    assert_eq!(map.get(&0), None);
    assert_eq!(map.keys().next(), None);
    assert_eq!(map.values().next(), None);
    assert_eq!(map.min_key(), None);
    assert_eq!(map.max_key(), None);
    assert_eq!(map.min_value(), None);
    assert_eq!(map.max_value(), None);

    let mut multi: SortedMultiMap<u32, u32> = SortedMultiMap::new();

    assert!(!multi.remove(&0, &0));
    assert_eq!(multi.len(), 0);
    assert_eq!(multi.keys().next(), None);
    assert_eq!(multi.min_key(), None);
    assert_eq!(multi.max_key(), None);
}

#[test]
fn extremes_follow_key_order() {
    let mut map = SortedMultiMap::new();
    map.insert(2, 9);
    map.insert(2, 1);
    map.insert(0, 7);
    map.insert(0, 5);
    map.insert(9, 3);
    map.insert(9, 8);

    assert_eq!(map.min_key(), Some(&0));
    assert_eq!(map.max_key(), Some(&9));
    // The extreme values follow the key order: the minimum value belongs to
    // the minimum key, not to the map as a whole.
    assert_eq!(map.min_value(), Some(&5));
    assert_eq!(map.max_value(), Some(&8));
}

#[test]
fn keys_collapse_duplicates() {
    let mut map = SortedMultiMap::new();
    map.insert(3, 1);
    map.insert(3, 2);
    map.insert(3, 3);
    map.insert(5, 1);

    assert_eq!(map.keys().collect::<Vec<_>>(), [&3, &5]);
    assert_eq!(map.values().collect::<Vec<_>>(), [&1, &2, &3, &1]);
}

#[test]
fn queries_are_idempotent() {
    let mut map = SortedMultiMap::new();

    for (key, value) in [(4, 1), (2, 2), (4, 1), (8, 3), (2, 9)] {
        map.insert(key, value);
    }

    let first: Vec<_> = map.values().collect();
    let second: Vec<_> = map.values().collect();
    assert_eq!(first, second);

    let first: Vec<_> = map.keys().collect();
    let second: Vec<_> = map.keys().collect();
    assert_eq!(first, second);
}

#[test]
fn clear_resets_the_map() {
    let mut map = SortedMultiMap::new();

    for key in 0..32 {
        map.insert(key % 5, key);
    }

    map.clear();

    assert!(map.is_empty());
    assert_eq!(map.keys().next(), None);
    map.assert_invariants();

    map.insert(1, 1);
    assert_eq!(map.len(), 1);
    map.assert_invariants();
}

#[test]
fn contains_checks_key_and_pair() {
    let mut map = SortedMultiMap::new();
    map.insert(1, 10);
    map.insert(1, 20);

    assert!(map.contains_key(&1));
    assert!(!map.contains_key(&2));
    assert!(map.contains(&1, &10));
    assert!(!map.contains(&1, &30));

    let mut single = SortedMap::new();
    single.insert("k", ());
    assert!(single.contains_key(&"k"));
    assert!(!single.contains_key(&"missing"));
}

#[test]
fn comparators_control_the_order() {
    let mut map = SortedMap::with_cmp(|a: &i32, b: &i32| b.cmp(a));
    map.insert(1, "a");
    map.insert(2, "b");
    map.insert(3, "c");

    assert_eq!(map.keys().collect::<Vec<_>>(), [&3, &2, &1]);
    assert_eq!(map.min_key(), Some(&3));
    assert_eq!(map.get(&2), Some(&"b"));
    map.assert_invariants();

    let mut multi =
        SortedMultiMap::with_cmp(compare::natural(), |a: &i32, b: &i32| b.cmp(a));
    multi.insert(1, 10);
    multi.insert(1, 30);
    multi.insert(1, 20);

    assert_eq!(multi.values_for_key(&1).collect::<Vec<_>>(), [&30, &20, &10]);
    multi.assert_invariants();
}

// Height of an LLRB tree holding n nodes is at most 2*log2(n + 1); at most
// every other link on a root-to-null path is red.
fn height_bound(len: usize) -> usize {
    2 * (usize::BITS - (len + 1).leading_zeros()) as usize
}

#[test]
fn ascending_insertion_stays_balanced() {
    const N: u32 = 10_000;

    let mut map: SortedMap<u32, u32> = SortedMap::new();

    for key in 0..N {
        map.insert(key, key);
    }

    assert_eq!(map.len(), N as usize);
    assert!(
        map.height() <= height_bound(map.len()),
        "height {} exceeds the red-black bound {}",
        map.height(),
        height_bound(map.len()),
    );
    map.assert_invariants();
}

#[test]
fn descending_insertion_stays_balanced() {
    const N: u32 = 10_000;

    let mut map: SortedMap<u32, u32> = SortedMap::new();

    for key in (0..N).rev() {
        map.insert(key, key);
    }

    assert!(map.height() <= height_bound(map.len()));
    map.assert_invariants();
}

#[test]
fn identical_pair_hammering_stays_balanced() {
    const N: usize = 10_000;

    let mut map: SortedMultiMap<u32, u32> = SortedMultiMap::new();

    for _ in 0..N {
        map.insert(42, 42);
    }

    assert_eq!(map.len(), N);
    assert!(map.height() <= height_bound(map.len()));
    map.assert_invariants();
}

#[test]
fn dotgraph_renders_nodes() {
    let mut map = SortedMap::new();
    map.insert(2, 20);
    map.insert(1, 10);
    map.insert(3, 30);

    let mut out = String::new();
    map.dotgraph("t", &mut out).expect("writing to a String cannot fail");

    assert!(out.starts_with("digraph \"graph-t\""));
    assert!(out.contains("label=\"2:20\""));

    let empty: SortedMap<u32, u32> = SortedMap::new();
    let mut out = String::new();
    empty.dotgraph("e", &mut out).expect("writing to a String cannot fail");
    assert_eq!(out, "digraph \"graph-e\" {}");
}

fn round_trip_input() -> impl Strategy<Value = (Vec<(u8, u8)>, Vec<(u8, u8)>)> {
    proptest::collection::vec((any::<u8>(), 0u8..4), 0..64).prop_flat_map(|pairs| {
        let shuffled = Just(pairs.clone()).prop_shuffle();
        (Just(pairs), shuffled)
    })
}

#[cfg(miri)]
const FUZZ_RANGE: Range<usize> = 0..10;

#[cfg(not(miri))]
const FUZZ_RANGE: Range<usize> = 0..1000;

proptest::proptest! {
    #![proptest_config(ProptestConfig {
        max_shrink_iters: 65536,
        .. ProptestConfig::default()
    })]

    #[test]
    fn map_btree_equivalence(ops in proptest::collection::vec(model::map_op_strategy(), FUZZ_RANGE)) {
        model::run_map_equivalence(ops);
    }

    #[test]
    fn multimap_btree_equivalence(ops in proptest::collection::vec(model::multi_op_strategy(), FUZZ_RANGE)) {
        model::run_multimap_equivalence(ops);
    }

    #[test]
    fn round_trip_leaves_nothing((pairs, removal_order) in round_trip_input()) {
        let mut map: SortedMultiMap<u8, u8> = SortedMultiMap::new();

        for &(key, value) in &pairs {
            map.insert(key, value);
        }

        prop_assert_eq!(map.len(), pairs.len());
        map.assert_invariants();

        for &(key, value) in &removal_order {
            prop_assert!(map.remove(&key, &value));
            map.assert_invariants();
        }

        prop_assert_eq!(map.len(), 0);
        prop_assert!(map.keys().next().is_none());
        prop_assert!(map.values().next().is_none());
    }
}
