//! In-order enumeration of the (key, value) pairs below a cursor.

use std::borrow::Cow;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::trie::Trie;
use crate::unit::{unit_at, Unit};

/// A (key, value) pair produced by [`TrieIter`]. The key is relative to the
/// position the iterator was created at.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Entry<U> {
    key: Vec<U>,
    /// The stored value, or `-1` for a key cut off by truncation.
    pub value: i32,
}

impl<U> Entry<U> {
    pub fn key(&self) -> &[U] {
        &self.key
    }

    pub fn into_key(self) -> Vec<U> {
        self.key
    }
}

impl Entry<u8> {
    /// The key as text, with invalid UTF-8 replaced.
    pub fn key_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }
}

impl Entry<u16> {
    /// The key as text, with unpaired surrogates replaced.
    pub fn key_string(&self) -> String {
        String::from_utf16_lossy(&self.key)
    }
}

/// Pending work for a branch: `edges` edges left, starting at `pos`, below a
/// key prefix of `key_len` units.
#[derive(Clone, Copy, Debug)]
struct Frame {
    pos: usize,
    edges: usize,
    key_len: usize,
}

enum Step {
    Final(i32),
    Node(usize),
}

/// Iterator over the stored (key, value) pairs below a position, in
/// ascending unit order.
///
/// With a non-zero `max_length`, keys are cut off at that many units. A key
/// cut off at a position without a value is reported once, with value `-1`.
#[derive(Clone, Debug)]
pub struct TrieIter<'a, U: Unit> {
    units: &'a [U],
    initial_pos: Option<usize>,
    initial_remaining: Option<usize>,
    max_length: usize,

    pos: Option<usize>,
    /// The initial linear-match remainder was cut off by `max_length`.
    linear_truncated: bool,
    /// `pos` is at an intermediate value that was already reported.
    skip_value: bool,
    key: Vec<U>,
    stack: SmallVec<[Frame; 8]>,
}

impl<'a, U: Unit> TrieIter<'a, U> {
    fn new(units: &'a [U], pos: Option<usize>, remaining: Option<usize>, max_length: usize) -> Self {
        let mut iter = Self {
            units,
            initial_pos: pos,
            initial_remaining: remaining,
            max_length,
            pos,
            linear_truncated: false,
            skip_value: false,
            key: Vec::new(),
            stack: SmallVec::new(),
        };
        iter.reset();
        iter
    }

    /// Iterates a serialized buffer from the node at `offset`. A `max_length`
    /// of 0 means no truncation.
    pub fn from_buffer(units: &'a [U], offset: usize, max_length: usize) -> Self {
        Self::new(units, Some(offset), None, max_length)
    }

    /// Restarts from the position the iterator was created at.
    pub fn reset(&mut self) -> &mut Self {
        self.pos = self.initial_pos;
        self.linear_truncated = false;
        self.skip_value = false;
        self.key.clear();
        self.stack.clear();
        if let (Some(pos), Some(remaining)) = (self.pos, self.initial_remaining) {
            // Rest of a linear-match node the cursor stopped inside.
            let left = remaining + 1;
            let take = if self.max_length > 0 { left.min(self.max_length) } else { left };
            let end = (pos + take).min(self.units.len());
            self.key.extend_from_slice(&self.units[pos.min(end)..end]);
            self.pos = Some(pos + take);
            self.linear_truncated = take < left;
        }
        self
    }

    /// Whether another entry follows.
    pub fn has_next(&self) -> bool {
        self.pos.is_some() || !self.stack.is_empty()
    }

    fn entry(&self, value: i32) -> Entry<U> {
        Entry {
            key: self.key.clone(),
            value,
        }
    }

    fn truncate_and_stop(&mut self) -> Entry<U> {
        self.pos = None;
        self.linear_truncated = false;
        self.entry(-1)
    }

    fn advance(&mut self) -> Option<Entry<U>> {
        let units = self.units;
        let mut pos = match self.pos {
            Some(pos) => {
                if self.linear_truncated {
                    return Some(self.truncate_and_stop());
                }
                pos
            }
            None => {
                let frame = self.stack.pop()?;
                self.key.truncate(frame.key_len);
                if frame.edges > 1 {
                    match self.branch_next(frame.pos, frame.edges)? {
                        Step::Final(value) => return Some(self.entry(value)),
                        Step::Node(pos) => pos,
                    }
                } else {
                    // Last edge of a list branch: no value follows its unit.
                    self.key.push(*units.get(frame.pos)?);
                    frame.pos + 1
                }
            }
        };
        loop {
            let mut node = unit_at(units, pos)?;
            pos += 1;
            if node >= U::MIN_VALUE_LEAD {
                if self.skip_value {
                    let (n, p) = U::skip_node_value(units, pos, node)?;
                    node = n;
                    pos = p;
                    self.skip_value = false;
                } else {
                    let value = U::read_value(units, pos, node)?;
                    if U::is_final(node) || self.at_max_length() {
                        self.pos = None;
                    } else {
                        // Come back for the match node after the value.
                        self.pos = Some(pos - 1);
                        self.skip_value = true;
                    }
                    return Some(self.entry(value));
                }
            }
            if self.at_max_length() {
                return Some(self.truncate_and_stop());
            }
            if node < U::MIN_LINEAR_MATCH {
                let mut length = node as usize;
                if length == 0 {
                    length = unit_at(units, pos)? as usize;
                    pos += 1;
                }
                match self.branch_next(pos, length + 1)? {
                    Step::Final(value) => return Some(self.entry(value)),
                    Step::Node(p) => pos = p,
                }
            } else {
                let length = (node - U::MIN_LINEAR_MATCH) as usize + 1;
                if self.max_length > 0 && self.key.len() + length > self.max_length {
                    let take = self.max_length - self.key.len();
                    self.key.extend_from_slice(units.get(pos..pos + take)?);
                    return Some(self.truncate_and_stop());
                }
                self.key.extend_from_slice(units.get(pos..pos + length)?);
                pos += length;
            }
        }
    }

    #[inline]
    fn at_max_length(&self) -> bool {
        self.max_length > 0 && self.key.len() >= self.max_length
    }

    /// Takes the first edge of the branch at `pos` and remembers the others.
    fn branch_next(&mut self, mut pos: usize, mut length: usize) -> Option<Step> {
        let units = self.units;
        while length > U::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            pos += 1; // ignore the comparison unit
            // Greater-or-equal edges later, less-than edges now.
            self.stack.push(Frame {
                pos: U::skip_delta(units, pos)?,
                edges: length - (length >> 1),
                key_len: self.key.len(),
            });
            length >>= 1;
            pos = U::jump_by_delta(units, pos)?;
        }
        let unit = *units.get(pos)?;
        let lead = unit_at(units, pos + 1)?;
        pos += 2;
        let value = U::read_branch_value(units, pos, lead)?;
        pos = U::skip_branch_value(pos, lead);
        self.stack.push(Frame {
            pos,
            edges: length - 1,
            key_len: self.key.len(),
        });
        self.key.push(unit);
        if U::is_final(lead) {
            self.pos = None;
            Some(Step::Final(value))
        } else {
            Some(Step::Node(pos.checked_add(usize::try_from(value).ok()?)?))
        }
    }
}

impl<'a, U: Unit> Iterator for TrieIter<'a, U> {
    type Item = Entry<U>;

    fn next(&mut self) -> Option<Entry<U>> {
        let entry = self.advance();
        if entry.is_none() {
            // Exhausted, or the buffer ended early.
            self.pos = None;
            self.stack.clear();
        }
        entry
    }
}

impl<'a, U: Unit> FusedIterator for TrieIter<'a, U> {}

impl<'a, U: Unit> Trie<'a, U> {
    /// Iterates the pairs reachable from the current position, with keys
    /// relative to it. A cursor stopped by a mismatch yields nothing.
    pub fn iter(&self) -> TrieIter<'a, U> {
        self.iter_truncated(0)
    }

    /// Like [`iter`](Self::iter), but keys are cut off after `max_length`
    /// units (0 means no limit).
    pub fn iter_truncated(&self, max_length: usize) -> TrieIter<'a, U> {
        TrieIter::new(self.units, self.pos, self.remaining_match_length, max_length)
    }
}
