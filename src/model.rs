//! Model-based equivalence checking against `std`'s ordered containers,
//! shared by the proptest suite and the fuzz targets.
//!
//! [`SortedMap`] is compared against `BTreeMap<u32, u32>`, and
//! [`SortedMultiMap`] against `BTreeMap<u32, Vec<u8>>` with each bucket kept
//! sorted. Structural invariants and the full query surface are re-checked
//! after every operation.

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use proptest::strategy::Strategy;

use crate::{SortedMap, SortedMultiMap};

/// How an operation chooses its key: an index into the keys currently in
/// the container (so operations keep hitting live entries), or an
/// unconstrained key.
#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum KeyPick {
    Existing(usize),
    Fresh(u32),
}

fn pick(keys: &[u32], pick: KeyPick) -> u32 {
    match pick {
        KeyPick::Existing(index) => {
            if keys.is_empty() {
                index as u32
            } else {
                keys[index % keys.len()]
            }
        }
        KeyPick::Fresh(key) => key,
    }
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum MapOp {
    Insert(KeyPick, u32),
    Get(KeyPick),
    Remove(KeyPick),
}

#[derive(Copy, Clone, Debug, Arbitrary)]
pub enum MultiOp {
    Insert(KeyPick, u8),
    Remove(KeyPick, u8),
    ValuesForKey(KeyPick),
}

proptest::prop_compose! {
    fn existing_strategy()(
        index in 0usize..1000,
    ) -> KeyPick {
        KeyPick::Existing(index)
    }
}

proptest::prop_compose! {
    fn fresh_strategy()(
        key in 0u32..1000,
    ) -> KeyPick {
        KeyPick::Fresh(key)
    }
}

fn pick_strategy() -> impl Strategy<Value = KeyPick> {
    proptest::prop_oneof![existing_strategy(), fresh_strategy()]
}

pub fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    proptest::prop_oneof![
        (pick_strategy(), proptest::arbitrary::any::<u32>())
            .prop_map(|(key, value)| MapOp::Insert(key, value)),
        pick_strategy().prop_map(MapOp::Get),
        pick_strategy().prop_map(MapOp::Remove),
    ]
}

pub fn multi_op_strategy() -> impl Strategy<Value = MultiOp> {
    proptest::prop_oneof![
        (pick_strategy(), 0u8..8).prop_map(|(key, value)| MultiOp::Insert(key, value)),
        (pick_strategy(), 0u8..8).prop_map(|(key, value)| MultiOp::Remove(key, value)),
        pick_strategy().prop_map(MultiOp::ValuesForKey),
    ]
}

pub fn run_map_equivalence(ops: Vec<MapOp>) {
    let mut model: BTreeMap<u32, u32> = BTreeMap::new();
    let mut map: SortedMap<u32, u32> = SortedMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let keys: Vec<u32> = model.keys().copied().collect();

        match op {
            MapOp::Insert(key, value) => {
                let key = pick(&keys, key);

                let from_model = model.insert(key, value);
                let from_map = map.insert(key, value);

                assert_eq!(from_model, from_map, "op #{op_id}: {op:?}");
            }

            MapOp::Get(key) => {
                let key = pick(&keys, key);

                assert_eq!(model.get(&key), map.get(&key), "op #{op_id}: {op:?}");
            }

            MapOp::Remove(key) => {
                let key = pick(&keys, key);

                assert_eq!(model.remove(&key), map.remove(&key), "op #{op_id}: {op:?}");
            }
        }

        map.assert_invariants();
        assert_eq!(model.len(), map.len());
        assert_eq!(model.first_key_value().map(|(key, _)| key), map.min_key());
        assert_eq!(model.last_key_value().map(|(key, _)| key), map.max_key());
        assert_eq!(model.first_key_value().map(|(_, value)| value), map.min_value());
        assert_eq!(model.last_key_value().map(|(_, value)| value), map.max_value());
        assert!(model.iter().eq(map.iter()));
        assert!(model.keys().eq(map.keys()));
        assert!(model.values().eq(map.values()));
    }
}

pub fn run_multimap_equivalence(ops: Vec<MultiOp>) {
    let mut model: BTreeMap<u32, Vec<u8>> = BTreeMap::new();
    let mut model_len = 0;
    let mut map: SortedMultiMap<u32, u8> = SortedMultiMap::new();

    for (op_id, op) in ops.into_iter().enumerate() {
        let keys: Vec<u32> = model.keys().copied().collect();

        match op {
            MultiOp::Insert(key, value) => {
                let key = pick(&keys, key);
                // A narrow value range forces exact duplicate pairs.
                let value = value % 8;

                let bucket = model.entry(key).or_default();
                let at = bucket.partition_point(|&existing| existing <= value);
                bucket.insert(at, value);
                model_len += 1;

                map.insert(key, value);
            }

            MultiOp::Remove(key, value) => {
                let key = pick(&keys, key);
                let value = value % 8;

                let from_model = match model.get_mut(&key) {
                    Some(bucket) => match bucket.binary_search(&value) {
                        Ok(at) => {
                            bucket.remove(at);
                            if bucket.is_empty() {
                                model.remove(&key);
                            }
                            model_len -= 1;
                            true
                        }
                        Err(_) => false,
                    },
                    None => false,
                };
                let from_map = map.remove(&key, &value);

                assert_eq!(from_model, from_map, "op #{op_id}: {op:?}");
            }

            MultiOp::ValuesForKey(key) => {
                let key = pick(&keys, key);

                let from_model = model.get(&key).cloned().unwrap_or_default();
                let from_map: Vec<u8> = map.values_for_key(&key).copied().collect();

                assert_eq!(from_model, from_map, "op #{op_id}: {op:?}");
            }
        }

        map.assert_invariants();
        assert_eq!(model_len, map.len());
        assert!(model.keys().eq(map.keys()));

        let model_pairs = model
            .iter()
            .flat_map(|(key, bucket)| bucket.iter().map(move |value| (key, value)));
        assert!(model_pairs.eq(map.iter()));

        assert_eq!(model.keys().next(), map.min_key());
        assert_eq!(model.keys().next_back(), map.max_key());
        assert_eq!(
            model.values().next().and_then(|bucket| bucket.first()),
            map.min_value(),
        );
        assert_eq!(
            model.values().next_back().and_then(|bucket| bucket.last()),
            map.max_value(),
        );
    }
}
