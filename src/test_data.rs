//! Shared fixtures and consistency checks for the unit tests.

use std::collections::BTreeSet;

use crate::{BuildMode, Trie, TrieBuilder, TrieError, TrieIter, TrieResult, Unit};

// =============================================================================
// Data sets
// =============================================================================

/// One key per branch width, with values at every encoding boundary.
pub(crate) const BRANCHES: &[(&str, i32)] = &[
    ("a", 0x10),
    ("cc", 0x40),
    ("e", 0x100),
    ("ggg", 0x400),
    ("i", 0x1000),
    ("kkkk", 0x4000),
    ("n", 0x10000),
    ("ppppp", 0x40000),
    ("r", 0x100000),
    ("sss", 0x200000),
    ("t", 0x400000),
    ("uu", 0x800000),
    ("vv", 0x7fffffff),
    ("zz", 0x80000000u32 as i32),
];

pub(crate) const LONG_BRANCH: &[(&str, i32)] = &[
    ("a", -2),
    ("b", -1),
    ("c", 0),
    ("d2", 1),
    ("f", 0x3f),
    ("g", 0x40),
    ("h", 0x41),
    ("j23", 0x1900),
    ("j24", 0x19ff),
    ("j25", 0x1a00),
    ("k2", 0x1a80),
    ("k3", 0x1aff),
    ("l234567890", 0x1b00),
    ("l234567890123", 0x1b01),
    ("nnnnnnnnnnnnnnnnnnnnnnnnnnnnn", 0x10ffff),
    ("oooooooooooooooooooooooooooooooooooooooooooooooooooooo", 0x110000),
    (
        "pppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppppp",
        0x120000,
    ),
    ("r", 0x333333),
    ("s2345", 0x4444444),
    ("t234567890", 0x77777777),
    ("z", 0x80000001u32 as i32),
];

pub(crate) const VALUES_FOR_STATE: &[(&str, i32)] = &[
    ("a", -1),
    ("ab", -2),
    ("abc", -3),
    ("abcd", -4),
    ("abcde", -5),
    ("abcdef", -6),
];

/// Duplicate sub-tries. The "l"+"n" branch below "xju" equals the ones below
/// "+ju" and "-ju" but follows a different linear-match node, so it is
/// written again.
pub(crate) const COMPACT: &[(&str, i32)] = &[
    ("+", 0),
    ("+august", 8),
    ("+december", 12),
    ("+july", 7),
    ("+june", 6),
    ("+november", 11),
    ("+october", 10),
    ("+september", 9),
    ("-", 0),
    ("-august", 8),
    ("-december", 12),
    ("-july", 7),
    ("-june", 6),
    ("-november", 11),
    ("-october", 10),
    ("-september", 9),
    ("xjuly", 7),
    ("xjune", 6),
];

/// Every node kind leading to the same value, with enough edges after "jan"
/// for a split branch.
pub(crate) const MONTHS: &[(&str, i32)] = &[
    ("august", 8),
    ("jan", 1),
    ("jan.", 1),
    ("jana", 1),
    ("janbb", 1),
    ("janc", 1),
    ("janddd", 1),
    ("janee", 1),
    ("janef", 1),
    ("janf", 1),
    ("jangg", 1),
    ("janh", 1),
    ("janiiii", 1),
    ("janj", 1),
    ("jank", 1),
    ("janl", 1),
    ("janm", 1),
    (
        "jannnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnnn",
        1,
    ),
    ("jano", 1),
    ("janp", 1),
    ("janqqqqq", 1),
    ("janr", 1),
    ("januar", 1),
    ("january", 1),
    ("july", 7),
    ("jun", 6),
    ("jun.", 6),
    ("june", 6),
];

/// Linear-match runs longer than one node, up to several hundred units.
pub(crate) fn long_sequence() -> Vec<(String, i32)> {
    const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
    vec![
        ("a".to_string(), -1),
        ("ab".to_string(), -2),
        (ALPHABET.to_string(), -3),
        (ALPHABET.repeat(6), -4),
        (ALPHABET.repeat(20), -5),
    ]
}

// =============================================================================
// Conversions
// =============================================================================

pub(crate) fn units<U: Unit>(s: &str) -> Vec<U> {
    U::str_units(s).into_owned()
}

/// An ASCII character as a unit.
pub(crate) fn unit<U: Unit>(c: char) -> U {
    U::from_u32(c as u32)
}

pub(crate) fn strs<U: Unit, S: AsRef<str>>(data: &[(S, i32)]) -> Vec<(Vec<U>, i32)> {
    data.iter().map(|(s, v)| (units(s.as_ref()), *v)).collect()
}

// =============================================================================
// Building
// =============================================================================

/// Builds `data`, adding the pairs in a scrambled but deterministic order.
pub(crate) fn build_buffer<U: Unit>(data: &[(Vec<U>, i32)], mode: BuildMode) -> Vec<U> {
    let mut builder = TrieBuilder::<U>::new();
    let len = data.len();
    let (mut index, step) = if len % 2 == 1 {
        (len / 2, 2)
    } else if len % 3 != 0 {
        (len / 5, 3)
    } else {
        (len - 1, len - 1)
    };
    for _ in 0..len {
        let (key, value) = &data[index];
        builder.add(key, *value).unwrap();
        index = (index + step) % len;
    }
    let buf = builder.build_buffer(mode).unwrap().to_vec();
    assert_eq!(
        builder.add(&units::<U>("zzz"), 999).err(),
        Some(TrieError::AlreadyBuilt),
        "add() after build"
    );
    buf
}

pub(crate) fn build_months<U: Unit>(mode: BuildMode) -> Vec<U> {
    build_buffer(&strs::<U, _>(MONTHS), mode)
}

// =============================================================================
// Checks
// =============================================================================

/// Builds `data` in both modes and runs every traversal check on the result.
pub(crate) fn check_data<U: Unit>(data: &[(Vec<U>, i32)]) {
    let mut sorted = data.to_vec();
    sorted.sort();
    for mode in [BuildMode::Fast, BuildMode::Small] {
        let buf = build_buffer(data, mode);
        let mut trie = Trie::new(&buf);
        check_first(&mut trie, data);
        check_next(&mut trie, data);
        check_next_with_state(&mut trie, data);
        check_next_units_into(&mut trie, data);

        let mut iter = trie.reset().iter();
        check_iterator(&mut iter, &sorted);
        // The iterator restarts from where it was created.
        iter.reset();
        check_iterator(&mut iter, &sorted);
    }
}

/// [`check_data`] on the byte and the 16-bit form of `data`.
pub(crate) fn check_both<S: AsRef<str>>(data: &[(S, i32)]) {
    check_data(&strs::<u8, _>(data));
    check_data(&strs::<u16, _>(data));
}

fn check_first<U: Unit>(trie: &mut Trie<'_, U>, data: &[(Vec<U>, i32)]) {
    for (key, _) in data {
        let Some(&c) = key.first() else {
            continue;
        };
        // Unit 0 never occurs in the fixtures, so it stands in for "nothing".
        let next_c = key.get(1).copied().unwrap_or_default();
        let first_result = trie.first(c);
        let first_value = trie.value();
        let first_next_result = trie.next(next_c);

        trie.reset();
        let result = trie.next(c);
        assert_eq!(result, first_result, "next({c:?}) != first({c:?}) for {key:?}");
        assert_eq!(trie.current(), first_result, "current() after first({c:?})");
        assert_eq!(trie.value(), first_value, "value() after first({c:?})");
        assert_eq!(trie.next(next_c), first_next_result, "second unit of {key:?}");
    }
    trie.reset();
}

fn check_next<U: Unit>(trie: &mut Trie<'_, U>, data: &[(Vec<U>, i32)]) {
    for (key, value) in data {
        trie.reset();
        let result = trie.next_units(key);
        assert!(result.has_value(), "next_units({key:?}) has no value");
        assert_eq!(trie.value(), Some(*value), "value() for {key:?}");
        assert_eq!(trie.current(), result, "current() for {key:?}");
        // Reading the value is side-effect free.
        assert_eq!(trie.value(), Some(*value));
        assert_eq!(trie.current(), result);
        if result == TrieResult::FinalValue {
            assert_eq!(trie.unique_value(), Some(*value), "unique_value() at {key:?}");
            let mut past_end = trie.clone();
            assert_eq!(past_end.next(U::default()), TrieResult::NoMatch);
        }

        // Compare with a stepwise traversal.
        trie.reset();
        let mut stepwise = trie.current();
        for &u in key {
            assert!(stepwise.matches(), "stepwise mismatch before the end of {key:?}");
            stepwise = trie.next(u);
            assert_eq!(trie.current(), stepwise, "current() while stepping through {key:?}");
        }
        assert_eq!(stepwise, result, "stepwise result for {key:?}");
        assert_eq!(trie.value(), Some(*value), "stepwise value for {key:?}");
    }
    trie.reset();
}

fn check_next_with_state<U: Unit>(trie: &mut Trie<'_, U>, data: &[(Vec<U>, i32)]) {
    for (key, value) in data {
        trie.reset();
        let partial = key.len() / 3;
        trie.next_units(&key[..partial]);
        let state = trie.save_state();
        let result_at_state = trie.current();
        let value_at_state = trie.value();

        assert_eq!(trie.next(U::default()), TrieResult::NoMatch, "mismatch after {partial} units of {key:?}");
        assert_eq!(trie.current(), TrieResult::NoMatch);

        trie.reset_to_state(&state).unwrap();
        assert_eq!(trie.current(), result_at_state, "current() after reset_to_state for {key:?}");
        assert_eq!(trie.value(), value_at_state, "value() after reset_to_state for {key:?}");

        let result = trie.next_units(&key[partial..]);
        assert!(result.has_value(), "rest of {key:?} after reset_to_state");
        assert_eq!(trie.value(), Some(*value));

        // The saved state survives further traversal and can be restored again.
        trie.reset_to_state(&state).unwrap();
        assert_eq!(trie.next_units(&key[partial..]), result);
        assert_eq!(trie.value(), Some(*value));
    }
    trie.reset();
}

fn check_next_units_into<U: Unit>(trie: &mut Trie<'_, U>, data: &[(Vec<U>, i32)]) {
    let mut out = Vec::new();
    for (key, _) in data {
        trie.reset();
        for &u in key {
            out.clear();
            let count = trie.next_units_into(&mut out);
            assert_eq!(count, out.len());
            assert!(out.windows(2).all(|w| w[0] < w[1]), "next units {out:?} not ascending");
            assert!(out.contains(&u), "{u:?} missing from next units {out:?} of {key:?}");
            trie.next(u);
        }
        if trie.current() == TrieResult::FinalValue {
            out.clear();
            assert_eq!(trie.next_units_into(&mut out), 0, "next units after final {key:?}");
        }
    }
    trie.reset();
}

/// Drains `iter` and compares it with `expected`, in order.
pub(crate) fn check_iterator<U: Unit>(iter: &mut TrieIter<'_, U>, expected: &[(Vec<U>, i32)]) {
    for (i, (key, value)) in expected.iter().enumerate() {
        assert!(iter.has_next(), "has_next() before entry {i} {key:?}");
        let entry = iter.next().unwrap_or_else(|| panic!("missing entry {i} {key:?}"));
        assert_eq!(entry.key(), &key[..], "key of entry {i}");
        assert_eq!(entry.value, *value, "value of entry {i} {key:?}");
    }
    assert!(!iter.has_next(), "has_next() after the last entry");
    assert!(iter.next().is_none(), "next() after the last entry");
}

// =============================================================================
// Large 16-bit trie
// =============================================================================

/// Deterministic stream of keys with many distinct first units.
pub(crate) struct LargeTrieGenerator {
    key: Vec<u16>,
    value: i32,
    index: usize,
    first_units: BTreeSet<u16>,
}

impl LargeTrieGenerator {
    pub(crate) fn new() -> Self {
        Self {
            key: Vec::new(),
            value: 4711,
            index: 0,
            first_units: BTreeSet::new(),
        }
    }

    pub(crate) fn key(&self) -> &[u16] {
        &self.key
    }

    pub(crate) fn value(&self) -> i32 {
        self.value
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn unique_first_units(&self) -> usize {
        self.first_units.len()
    }

    pub(crate) fn advance(&mut self) {
        let first = (self.value >> 16) as u16;
        self.key.clear();
        self.key.push(first);
        self.key.push((self.value >> 4) as u16);
        if self.value & 1 != 0 {
            self.key.push(self.value as u16);
        }
        self.first_units.insert(first);
        self.value += ((self.value >> 5) & 0x7ff) * 3 + 1;
        self.index += 1;
    }
}
