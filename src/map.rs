//! Tries with arbitrary payloads.
//!
//! The serialized trie only stores `i32` values. [`TrieMap`] stores an index
//! into a side table of payloads instead, and [`Matcher`] scans text for the
//! longest key starting at a given offset.

use std::collections::HashMap;
use std::hash::Hash;

use crate::builder::{BuildMode, TrieBuilder};
use crate::error::Result;
use crate::iter::TrieIter;
use crate::trie::{Trie, TrieResult};
use crate::unit::Unit;

/// Builder for a [`TrieMap`].
///
/// In [`BuildMode::Small`] equal payloads share one table slot; in
/// [`BuildMode::Fast`] every `add()` gets its own.
#[derive(Debug)]
pub struct TrieMapBuilder<V, U: Unit = u8> {
    mode: BuildMode,
    builder: TrieBuilder<U>,
    values: Vec<V>,
    indexes: HashMap<V, i32>,
}

impl<V: Eq + Hash + Clone, U: Unit> TrieMapBuilder<V, U> {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            mode,
            builder: TrieBuilder::new(),
            values: Vec::new(),
            indexes: HashMap::new(),
        }
    }

    /// Adds a key and its payload. On error the builder is unchanged.
    pub fn add(&mut self, key: &[U], value: V) -> Result<&mut Self> {
        let shared = match self.mode {
            BuildMode::Small => self.indexes.get(&value).copied(),
            BuildMode::Fast => None,
        };
        let index = shared.unwrap_or(self.values.len() as i32);
        self.builder.add(key, index)?;
        if shared.is_none() {
            if self.mode == BuildMode::Small {
                self.indexes.insert(value.clone(), index);
            }
            self.values.push(value);
        }
        Ok(self)
    }

    pub fn add_str(&mut self, key: &str, value: V) -> Result<&mut Self> {
        let units = U::str_units(key);
        self.add(&units, value)
    }

    pub fn build(self) -> Result<TrieMap<V, U>> {
        let len = self.builder.len();
        let units = self.builder.into_buffer(self.mode)?;
        Ok(TrieMap {
            units,
            values: self.values,
            len,
        })
    }
}

/// A serialized trie whose values index a payload table.
#[derive(Clone, Debug)]
pub struct TrieMap<V, U: Unit = u8> {
    units: Vec<U>,
    values: Vec<V>,
    len: usize,
}

impl<V, U: Unit> TrieMap<V, U> {
    /// A fresh cursor over the underlying trie.
    pub fn trie(&self) -> Trie<'_, U> {
        Trie::new(&self.units)
    }

    /// The serialized trie.
    pub fn units(&self) -> &[U] {
        &self.units
    }

    /// The payload table, indexed by the trie values.
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn get(&self, key: &[U]) -> Option<&V> {
        self.payload(self.trie().get(key)?)
    }

    pub fn get_str(&self, key: &str) -> Option<&V> {
        self.get(&U::str_units(key))
    }

    fn payload(&self, index: i32) -> Option<&V> {
        self.values.get(usize::try_from(index).ok()?)
    }

    /// All keys with their payloads, in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (Vec<U>, &V)> + '_ {
        TrieIter::from_buffer(&self.units, 0, 0).filter_map(move |entry| {
            let value = self.payload(entry.value)?;
            Some((entry.into_key(), value))
        })
    }

    /// A matcher over `text`, starting at `start`.
    pub fn matcher<'m, 't>(&'m self, text: &'t [U], start: usize) -> Matcher<'m, 't, V, U> {
        Matcher {
            map: self,
            trie: self.trie(),
            text,
            start,
            offset: start,
            end: None,
            index: None,
        }
    }

    /// The end offset and payload of the longest key that starts at `start`
    /// in `text`.
    pub fn longest_match(&self, text: &[U], start: usize) -> Option<(usize, &V)> {
        let mut matcher = self.matcher(text, start);
        while matcher.next() {}
        Some((matcher.end()?, matcher.value()?))
    }
}

/// Longest-match scanner over a text.
///
/// [`next`](Self::next) extends the match one run at a time;
/// [`next_start`](Self::next_start) moves on to the following start offset.
#[derive(Clone, Debug)]
pub struct Matcher<'m, 't, V, U: Unit = u8> {
    map: &'m TrieMap<V, U>,
    trie: Trie<'m, U>,
    text: &'t [U],
    start: usize,
    /// Next text offset to consume.
    offset: usize,
    end: Option<usize>,
    index: Option<i32>,
}

impl<'m, 't, V, U: Unit> Matcher<'m, 't, V, U> {
    /// Consumes text until the next key with a value or until nothing more
    /// can match, recording the longest match so far. Returns true if a
    /// longer match may still follow.
    pub fn next(&mut self) -> bool {
        while let Some(&unit) = self.text.get(self.offset) {
            let result = self.trie.next(unit);
            self.offset += 1;
            match result {
                TrieResult::NoMatch => return false,
                TrieResult::NoValue => {}
                TrieResult::FinalValue => {
                    self.record();
                    return false;
                }
                TrieResult::IntermediateValue => {
                    self.record();
                    return true;
                }
            }
        }
        false
    }

    fn record(&mut self) {
        self.end = Some(self.offset);
        self.index = self.trie.value();
    }

    /// Moves the start one unit forward and forgets the current match.
    /// Returns false once the start reaches the end of the text.
    pub fn next_start(&mut self) -> bool {
        self.start += 1;
        self.offset = self.start;
        self.end = None;
        self.index = None;
        self.trie.reset();
        self.start < self.text.len()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// End offset (exclusive) of the longest match recorded so far.
    pub fn end(&self) -> Option<usize> {
        self.end
    }

    /// Payload of the longest match recorded so far.
    pub fn value(&self) -> Option<&'m V> {
        let map: &'m TrieMap<V, U> = self.map;
        map.payload(self.index?)
    }
}
