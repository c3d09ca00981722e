use super::*;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

/// Builds `m` and checks lookups, traversal and iteration against it.
fn check_against_map<U: Unit>(m: &BTreeMap<Vec<U>, i32>, probes: &[Vec<U>], mode: BuildMode) {
    let mut builder = TrieBuilder::<U>::new();
    for (key, value) in m {
        builder.add(key, *value).unwrap();
    }
    if m.is_empty() {
        assert_eq!(builder.build(mode).err(), Some(TrieError::Empty));
        return;
    }
    let mut trie = builder.build(mode).unwrap();

    for (key, value) in m {
        assert_eq!(trie.get(key), Some(*value), "get({key:?})");
    }
    for probe in probes {
        assert_eq!(trie.get(probe), m.get(probe).copied(), "probe {probe:?}");
    }

    // Stepwise traversal agrees with current() and with next_units().
    for key in m.keys().chain(probes) {
        trie.reset();
        let mut result = trie.current();
        for &u in key {
            result = trie.next(u);
            assert_eq!(trie.current(), result);
            if !result.matches() {
                break;
            }
        }
        let mut again = trie.clone();
        assert_eq!(again.reset().next_units(key), result, "next_units({key:?})");
        assert_eq!(result.has_value(), m.contains_key(key));
    }

    let got: Vec<(Vec<U>, i32)> = trie.reset().iter().map(|e| (e.key().to_vec(), e.value)).collect();
    let expected: Vec<(Vec<U>, i32)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(got, expected);
}

/// Expected truncated iteration: every key cut to `depth`, once.
fn truncated<U: Unit>(m: &BTreeMap<Vec<U>, i32>, depth: usize) -> Vec<(Vec<U>, i32)> {
    let prefixes: BTreeSet<Vec<U>> = m.keys().map(|k| k[..k.len().min(depth)].to_vec()).collect();
    prefixes
        .into_iter()
        .map(|p| {
            let value = m.get(&p).copied().unwrap_or(-1);
            (p, value)
        })
        .collect()
}

fn byte_key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet most of the time, so that keys share prefixes and
    // branches get wide enough to split.
    let unit = prop_oneof![
        8 => b'a'..=b'h',
        2 => any::<u8>(),
    ];
    prop::collection::vec(unit, 0..=24)
}

fn unit16_key_strategy() -> impl Strategy<Value = Vec<u16>> + Clone {
    let unit = prop_oneof![
        8 => 0x61u16..=0x68,
        1 => 0xd800u16..=0xdfff,
        1 => any::<u16>(),
    ];
    prop::collection::vec(unit, 0..=24)
}

fn value_strategy() -> impl Strategy<Value = i32> {
    prop_oneof![
        4 => 0..=0x50,
        2 => -3..=3,
        1 => any::<i32>(),
    ]
}

fn mode_strategy() -> impl Strategy<Value = BuildMode> {
    prop_oneof![Just(BuildMode::Fast), Just(BuildMode::Small)]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_u8(
        m in prop::collection::btree_map(byte_key_strategy(), value_strategy(), 0..=200),
        probes in prop::collection::vec(byte_key_strategy(), 0..=50),
        mode in mode_strategy(),
    ) {
        check_against_map(&m, &probes, mode);
    }

    #[test]
    fn prop_equivalence_u16(
        m in prop::collection::btree_map(unit16_key_strategy(), value_strategy(), 0..=200),
        probes in prop::collection::vec(unit16_key_strategy(), 0..=50),
        mode in mode_strategy(),
    ) {
        check_against_map(&m, &probes, mode);
    }

    #[test]
    fn prop_truncated_iteration(
        m in prop::collection::btree_map(byte_key_strategy(), value_strategy(), 1..=100),
        depth in 1usize..=8,
        mode in mode_strategy(),
    ) {
        let mut builder = TrieBuilder::<u8>::new();
        for (key, value) in &m {
            builder.add(key, *value).unwrap();
        }
        let trie = builder.build(mode).unwrap();
        let got: Vec<(Vec<u8>, i32)> = trie.iter_truncated(depth).map(|e| (e.key().to_vec(), e.value)).collect();
        // Keys cut at `depth` with a stored value report it; others report -1.
        prop_assert_eq!(got, truncated(&m, depth));
    }

    #[test]
    fn prop_save_and_restore(
        m in prop::collection::btree_map(unit16_key_strategy(), value_strategy(), 1..=100),
        mode in mode_strategy(),
    ) {
        let mut builder = TrieBuilder::<u16>::new();
        for (key, value) in &m {
            builder.add(key, *value).unwrap();
        }
        let mut trie = builder.build(mode).unwrap();
        for (key, value) in &m {
            trie.reset();
            for split in 0..=key.len() {
                trie.reset().next_units(&key[..split]);
                let state = trie.save_state();
                let before = (trie.current(), trie.value());
                trie.next_units(&key[split..]);
                prop_assert_eq!(trie.value(), Some(*value));
                trie.reset_to_state(&state).unwrap();
                prop_assert_eq!((trie.current(), trie.value()), before);
            }
        }
    }

    #[test]
    fn prop_unique_value_at_root(
        m in prop::collection::btree_map(byte_key_strategy(), 0..3i32, 1..=60),
    ) {
        let mut builder = TrieBuilder::<u8>::new();
        for (key, value) in &m {
            builder.add(key, *value).unwrap();
        }
        let trie = builder.build(BuildMode::Small).unwrap();
        let distinct: BTreeSet<i32> = m.values().copied().collect();
        let expected = if distinct.len() == 1 { distinct.first().copied() } else { None };
        prop_assert_eq!(trie.unique_value(), expected);
    }

    #[test]
    fn prop_map_payloads(
        m in prop::collection::btree_map(byte_key_strategy(), 0u8..4, 1..=100),
        mode in mode_strategy(),
    ) {
        let mut builder = TrieMapBuilder::<String>::new(mode);
        for (key, payload) in &m {
            builder.add(key, format!("payload-{payload}")).unwrap();
        }
        let map = builder.build().unwrap();
        prop_assert_eq!(map.len(), m.len());
        for (key, payload) in &m {
            let expected = format!("payload-{payload}");
            prop_assert_eq!(map.get(key), Some(&expected));
        }
        if mode == BuildMode::Small {
            prop_assert!(map.values().len() <= 4);
        } else {
            prop_assert_eq!(map.values().len(), m.len());
        }
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_add_order_small_set() {
    let keys: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"a".to_vec(),
        b"b".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"abcd".to_vec(),
        b"ba".to_vec(),
    ];

    for mode in [BuildMode::Fast, BuildMode::Small] {
        for_each_permutation(&keys, |perm| {
            let mut builder = TrieBuilder::<u8>::new();
            let mut m: BTreeMap<Vec<u8>, i32> = BTreeMap::new();
            for k in perm {
                let v = k.len() as i32 * 10 + k.first().map_or(0, |&c| i32::from(c - b'a'));
                builder.add(&k, v).unwrap();
                m.insert(k, v);
            }
            let trie = builder.build(mode).unwrap();
            let got: Vec<(Vec<u8>, i32)> = trie
                .iter()
                .map(|e| {
                    let value = e.value;
                    (e.into_key(), value)
                })
                .collect();
            let expected: Vec<(Vec<u8>, i32)> = m.into_iter().collect();
            assert_eq!(got, expected);
        });
    }
}

#[test]
fn random_keys_seeded() {
    let mut rng = StdRng::seed_from_u64(1);
    for round in 0..8 {
        let mut m: BTreeMap<Vec<u8>, i32> = BTreeMap::new();
        let n = rng.gen_range(1..2000);
        while m.len() < n {
            let len = rng.gen_range(0..40);
            let key: Vec<u8> = (0..len).map(|_| rng.gen_range(b'a'..=b'p')).collect();
            m.insert(key, rng.gen());
        }
        let probes: Vec<Vec<u8>> = (0..200)
            .map(|_| {
                let len = rng.gen_range(0..8);
                (0..len).map(|_| rng.gen_range(b'a'..=b'r')).collect()
            })
            .collect();
        let mode = if round % 2 == 0 { BuildMode::Fast } else { BuildMode::Small };
        check_against_map(&m, &probes, mode);
    }
}

#[test]
fn random_unit16_keys_seeded() {
    let mut rng = StdRng::seed_from_u64(2);
    for round in 0..8 {
        let mut m: BTreeMap<Vec<u16>, i32> = BTreeMap::new();
        let n = rng.gen_range(1..2000);
        while m.len() < n {
            let len = rng.gen_range(0..12);
            let key: Vec<u16> = (0..len)
                .map(|_| if rng.gen_bool(0.8) { rng.gen_range(0x3040..0x3060) } else { rng.gen() })
                .collect();
            m.insert(key, rng.gen_range(-0x1000..0x10000));
        }
        let mode = if round % 2 == 0 { BuildMode::Small } else { BuildMode::Fast };
        check_against_map(&m, &[], mode);
    }
}
