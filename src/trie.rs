//! Read-only cursor over a serialized trie.

use crate::error::{Result, TrieError};
use crate::unit::{unit_at, Unit};

/// Outcome of a traversal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrieResult {
    /// The input unit(s) did not continue a matching string. Once this is
    /// returned, further `next()` calls also return `NoMatch` until the
    /// cursor is reset.
    NoMatch,
    /// The input matched a prefix of some stored key, but that prefix has no
    /// value.
    NoValue,
    /// The input matched a stored key whose value is available via
    /// [`Trie::value`], and no stored key extends it.
    FinalValue,
    /// The input matched a stored key with a value, and longer keys with the
    /// same prefix exist.
    IntermediateValue,
}

impl TrieResult {
    /// Same as `self != NoMatch`.
    #[inline]
    pub fn matches(self) -> bool {
        self != TrieResult::NoMatch
    }

    /// The input matched a stored key and its value can be read.
    #[inline]
    pub fn has_value(self) -> bool {
        matches!(self, TrieResult::FinalValue | TrieResult::IntermediateValue)
    }

    /// Further input units may still match.
    #[inline]
    pub fn has_next(self) -> bool {
        matches!(self, TrieResult::NoValue | TrieResult::IntermediateValue)
    }
}

/// A snapshot of a cursor's position, restorable with
/// [`Trie::reset_to_state`]. The default value is unpopulated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrieState {
    origin: Option<Origin>,
    pos: Option<usize>,
    remaining_match_length: Option<usize>,
}

/// Identity of the buffer (address, length) and root a state was saved from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Origin {
    addr: usize,
    len: usize,
    root: usize,
}

/// A cursor over a serialized trie.
///
/// The cursor does not own the buffer; any number of cursors can traverse
/// the same buffer. Cloning a cursor copies its position.
#[derive(Clone, Debug)]
pub struct Trie<'a, U: Unit> {
    pub(crate) units: &'a [U],
    pub(crate) root: usize,
    /// Position of the next node or unit to read. `None` after a mismatch.
    pub(crate) pos: Option<usize>,
    /// Units still pending in the current linear-match node, minus one.
    pub(crate) remaining_match_length: Option<usize>,
}

impl<'a, U: Unit> Trie<'a, U> {
    /// Creates a cursor whose root node starts at the beginning of `units`.
    pub fn new(units: &'a [U]) -> Self {
        Self::with_root(units, 0)
    }

    /// Creates a cursor whose root node starts at `offset` in `units`.
    pub fn with_root(units: &'a [U], offset: usize) -> Self {
        Self {
            units,
            root: offset,
            pos: Some(offset),
            remaining_match_length: None,
        }
    }

    /// The serialized buffer this cursor reads.
    pub fn units(&self) -> &'a [U] {
        self.units
    }

    /// Resets the cursor to the root (the empty string).
    pub fn reset(&mut self) -> &mut Self {
        self.pos = Some(self.root);
        self.remaining_match_length = None;
        self
    }

    pub fn save_state(&self) -> TrieState {
        TrieState {
            origin: Some(self.origin()),
            pos: self.pos,
            remaining_match_length: self.remaining_match_length,
        }
    }

    /// Restores a position saved from a cursor over the same buffer and root.
    pub fn reset_to_state(&mut self, state: &TrieState) -> Result<&mut Self> {
        if state.origin != Some(self.origin()) {
            return Err(TrieError::IncompatibleState);
        }
        self.pos = state.pos;
        self.remaining_match_length = state.remaining_match_length;
        Ok(self)
    }

    fn origin(&self) -> Origin {
        Origin {
            addr: self.units.as_ptr() as usize,
            len: self.units.len(),
            root: self.root,
        }
    }

    /// Determines whether the string so far matches, whether it has a value,
    /// and whether another input unit could continue a matching string.
    pub fn current(&self) -> TrieResult {
        match self.pos {
            None => TrieResult::NoMatch,
            Some(pos) if self.remaining_match_length.is_none() => self.value_result_at(pos),
            Some(_) => TrieResult::NoValue,
        }
    }

    /// Traverses the trie from the root for a single input unit.
    /// Equivalent to `reset().next(unit)`.
    pub fn first(&mut self, unit: U) -> TrieResult {
        self.remaining_match_length = None;
        self.next_impl(self.root, unit.to_u32())
    }

    /// Traverses the trie from the current state for one more input unit.
    pub fn next(&mut self, unit: U) -> TrieResult {
        let Some(pos) = self.pos else {
            return TrieResult::NoMatch;
        };
        let unit = unit.to_u32();
        match self.remaining_match_length {
            Some(length) => {
                // Remaining part of a linear-match node.
                if unit_at(self.units, pos) == Some(unit) {
                    self.matched(pos + 1, length)
                } else {
                    self.stop()
                }
            }
            None => self.next_impl(pos, unit),
        }
    }

    /// Traverses the trie for a sequence of input units. An empty sequence
    /// returns [`current()`](Self::current).
    pub fn next_units(&mut self, units: &[U]) -> TrieResult {
        let mut result = self.current();
        for &unit in units {
            result = self.next(unit);
            if !result.matches() {
                break;
            }
        }
        result
    }

    /// Looks up the value of a complete key, without touching this cursor's
    /// position.
    pub fn get(&self, key: &[U]) -> Option<i32> {
        let mut cursor = Trie::with_root(self.units, self.root);
        if cursor.next_units(key).has_value() {
            cursor.value()
        } else {
            None
        }
    }

    /// The value for the string so far, if [`current()`](Self::current) has
    /// one.
    pub fn value(&self) -> Option<i32> {
        if !self.current().has_value() {
            return None;
        }
        let pos = self.pos?;
        let lead = unit_at(self.units, pos)?;
        U::read_value(self.units, pos + 1, lead)
    }

    /// The one value shared by every key that extends the string so far, or
    /// `None` if there are several different values or no match.
    pub fn unique_value(&self) -> Option<i32> {
        let pos = self.pos?;
        // Skip the rest of a pending linear-match node.
        let pos = pos + self.remaining_match_length.map_or(0, |r| r + 1);
        let mut unique = None;
        if find_unique_value(self.units, pos, &mut unique) {
            unique
        } else {
            None
        }
    }

    /// Appends each unit that can continue the string so far, in ascending
    /// order, and returns how many there are.
    pub fn next_units_into(&self, out: &mut Vec<U>) -> usize {
        let Some(mut pos) = self.pos else {
            return 0;
        };
        let units = self.units;
        if self.remaining_match_length.is_some() {
            return match units.get(pos) {
                Some(&u) => {
                    out.push(u);
                    1
                }
                None => 0,
            };
        }
        let Some(mut node) = unit_at(units, pos) else {
            return 0;
        };
        pos += 1;
        if node >= U::MIN_VALUE_LEAD {
            if U::is_final(node) {
                return 0;
            }
            match U::skip_node_value(units, pos, node) {
                Some((n, p)) => {
                    node = n;
                    pos = p;
                }
                None => return 0,
            }
        }
        if node < U::MIN_LINEAR_MATCH {
            if node == 0 {
                let Some(n) = unit_at(units, pos) else {
                    return 0;
                };
                node = n;
                pos += 1;
            }
            let length = node as usize + 1;
            next_branch_units(units, pos, length, out);
            length
        } else {
            // First unit of the linear-match node.
            match units.get(pos) {
                Some(&u) => {
                    out.push(u);
                    1
                }
                None => 0,
            }
        }
    }

    #[inline]
    fn stop(&mut self) -> TrieResult {
        self.pos = None;
        TrieResult::NoMatch
    }

    /// Records a match that leaves `left` units pending in a linear-match
    /// node, with `pos` at the next unit to read.
    #[inline]
    fn matched(&mut self, pos: usize, left: usize) -> TrieResult {
        self.pos = Some(pos);
        self.remaining_match_length = left.checked_sub(1);
        if left == 0 {
            self.value_result_at(pos)
        } else {
            TrieResult::NoValue
        }
    }

    #[inline]
    fn value_result_at(&self, pos: usize) -> TrieResult {
        match unit_at(self.units, pos) {
            Some(node) if node >= U::MIN_VALUE_LEAD => {
                if U::is_final(node) {
                    TrieResult::FinalValue
                } else {
                    TrieResult::IntermediateValue
                }
            }
            _ => TrieResult::NoValue,
        }
    }

    fn next_impl(&mut self, pos: usize, unit: u32) -> TrieResult {
        let units = self.units;
        let Some(mut node) = unit_at(units, pos) else {
            return self.stop();
        };
        let mut pos = pos + 1;
        loop {
            if node < U::MIN_LINEAR_MATCH {
                return self.branch_next(pos, node, unit);
            } else if node < U::MIN_VALUE_LEAD {
                // Match the first of length+1 units.
                let length = (node - U::MIN_LINEAR_MATCH) as usize;
                if unit_at(units, pos) == Some(unit) {
                    return self.matched(pos + 1, length);
                }
                break;
            } else if U::is_final(node) {
                // No further matching units.
                break;
            } else {
                match U::skip_node_value(units, pos, node) {
                    Some((n, p)) => {
                        node = n;
                        pos = p;
                    }
                    None => break,
                }
            }
        }
        self.stop()
    }

    fn branch_next(&mut self, mut pos: usize, node: u32, unit: u32) -> TrieResult {
        let units = self.units;
        let mut length = node as usize;
        if length == 0 {
            let Some(l) = unit_at(units, pos) else {
                return self.stop();
            };
            length = l as usize;
            pos += 1;
        }
        length += 1;
        // The length of the branch is the number of units to select from.
        // The data structure encodes a binary search.
        while length > U::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            let Some(middle) = unit_at(units, pos) else {
                return self.stop();
            };
            pos += 1;
            let next = if unit < middle {
                length >>= 1;
                U::jump_by_delta(units, pos)
            } else {
                length -= length >> 1;
                U::skip_delta(units, pos)
            };
            match next {
                Some(p) => pos = p,
                None => return self.stop(),
            }
        }
        // Drop down to linear search for the last few units.
        // length>=2 because the loop body above sees length>kMaxBranchLinearSubNodeLength>=3
        // and divides length by 2.
        loop {
            let (Some(u), Some(lead)) = (unit_at(units, pos), unit_at(units, pos + 1)) else {
                return self.stop();
            };
            pos += 1;
            if u == unit {
                let target = if U::is_final(lead) {
                    Some(pos)
                } else {
                    // Jump to the sub-node.
                    U::read_branch_value(units, pos + 1, lead)
                        .and_then(|delta| usize::try_from(delta).ok())
                        .and_then(|delta| U::skip_branch_value(pos + 1, lead).checked_add(delta))
                };
                return match target {
                    Some(p) => {
                        self.pos = Some(p);
                        self.value_result_at(p)
                    }
                    None => self.stop(),
                };
            }
            length -= 1;
            pos = U::skip_branch_value(pos + 1, lead);
            if length <= 1 {
                break;
            }
        }
        if unit_at(units, pos) == Some(unit) {
            self.pos = Some(pos + 1);
            self.value_result_at(pos + 1)
        } else {
            self.stop()
        }
    }
}

// =============================================================================
// Supplementary code points on 16-bit tries
// =============================================================================

impl<'a> Trie<'a, u16> {
    /// Like [`first`](Self::first) for a code point; a supplementary code
    /// point is matched as its surrogate pair.
    pub fn first_for_code_point(&mut self, cp: u32) -> TrieResult {
        if cp <= 0xffff {
            return self.first(cp as u16);
        }
        if self.first(lead_surrogate(cp)).has_next() {
            self.next(trail_surrogate(cp))
        } else {
            self.stop()
        }
    }

    /// Like [`next`](Self::next) for a code point; a supplementary code
    /// point is matched as its surrogate pair.
    pub fn next_for_code_point(&mut self, cp: u32) -> TrieResult {
        if cp <= 0xffff {
            return self.next(cp as u16);
        }
        if self.next(lead_surrogate(cp)).has_next() {
            self.next(trail_surrogate(cp))
        } else {
            self.stop()
        }
    }
}

#[inline]
fn lead_surrogate(cp: u32) -> u16 {
    (0xd7c0 + (cp >> 10)) as u16
}

#[inline]
fn trail_surrogate(cp: u32) -> u16 {
    (0xdc00 | (cp & 0x3ff)) as u16
}

// =============================================================================
// Whole-subtree scans
// =============================================================================

/// Folds `value` into the unique value seen so far. Returns false once two
/// different values were seen.
#[inline]
fn note_value(unique: &mut Option<i32>, value: i32) -> bool {
    match *unique {
        Some(u) => u == value,
        None => {
            *unique = Some(value);
            true
        }
    }
}

/// Work item of a whole-subtree scan.
#[derive(Clone, Copy, Debug)]
enum Scan {
    /// A node starting at `pos`.
    Node(usize),
    /// A branch sub-node of `length` edges starting at `pos`.
    Branch { pos: usize, length: usize },
}

/// Scans every value reachable from the node at `pos`.
fn find_unique_value<U: Unit>(units: &[U], pos: usize, unique: &mut Option<i32>) -> bool {
    let mut stack = vec![Scan::Node(pos)];
    while let Some(scan) = stack.pop() {
        let done = match scan {
            Scan::Node(pos) => scan_node(units, pos, unique, &mut stack),
            Scan::Branch { pos, length } => match scan_branch(units, pos, length, unique, &mut stack) {
                Some(next) => {
                    stack.push(Scan::Node(next));
                    true
                }
                None => false,
            },
        };
        if !done {
            return false;
        }
    }
    true
}

/// Follows one path from the node at `pos`, queueing the other branch edges.
fn scan_node<U: Unit>(units: &[U], mut pos: usize, unique: &mut Option<i32>, stack: &mut Vec<Scan>) -> bool {
    let Some(mut node) = unit_at(units, pos) else {
        return false;
    };
    pos += 1;
    loop {
        if node < U::MIN_LINEAR_MATCH {
            if node == 0 {
                let Some(n) = unit_at(units, pos) else {
                    return false;
                };
                node = n;
                pos += 1;
            }
            let Some(p) = scan_branch(units, pos, node as usize + 1, unique, stack) else {
                return false;
            };
            pos = p;
        } else if node < U::MIN_VALUE_LEAD {
            // Skip the linear-match units.
            pos += (node - U::MIN_LINEAR_MATCH) as usize + 1;
        } else {
            let Some(value) = U::read_value(units, pos, node) else {
                return false;
            };
            if !note_value(unique, value) {
                return false;
            }
            if U::is_final(node) {
                return true;
            }
            match U::skip_node_value(units, pos, node) {
                Some((n, p)) => {
                    node = n;
                    pos = p;
                }
                None => return false,
            }
            continue;
        }
        match unit_at(units, pos) {
            Some(n) => {
                node = n;
                pos += 1;
            }
            None => return false,
        }
    }
}

/// Scans a branch of `length` edges: final values are noted, sub-nodes are
/// queued. Returns the position of the node that follows the last edge unit.
fn scan_branch<U: Unit>(
    units: &[U],
    mut pos: usize,
    mut length: usize,
    unique: &mut Option<i32>,
    stack: &mut Vec<Scan>,
) -> Option<usize> {
    while length > U::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1; // ignore the comparison unit
        let less_than = U::jump_by_delta(units, pos)?;
        stack.push(Scan::Branch {
            pos: less_than,
            length: length >> 1,
        });
        length -= length >> 1;
        pos = U::skip_delta(units, pos)?;
    }
    loop {
        pos += 1; // ignore a comparison unit
        let lead = unit_at(units, pos)?;
        pos += 1;
        let value = U::read_branch_value(units, pos, lead)?;
        pos = U::skip_branch_value(pos, lead);
        if U::is_final(lead) {
            if !note_value(unique, value) {
                return None;
            }
        } else {
            let target = pos.checked_add(usize::try_from(value).ok()?)?;
            stack.push(Scan::Node(target));
        }
        length -= 1;
        if length <= 1 {
            break;
        }
    }
    // ignore the last comparison unit
    Some(pos + 1)
}

fn next_branch_units<U: Unit>(units: &[U], mut pos: usize, mut length: usize, out: &mut Vec<U>) -> Option<()> {
    while length > U::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
        pos += 1; // ignore the comparison unit
        let less_than = U::jump_by_delta(units, pos)?;
        next_branch_units(units, less_than, length >> 1, out);
        length -= length >> 1;
        pos = U::skip_delta(units, pos)?;
    }
    loop {
        out.push(*units.get(pos)?);
        let lead = unit_at(units, pos + 1)?;
        pos = U::skip_branch_value(pos + 2, lead);
        length -= 1;
        if length <= 1 {
            break;
        }
    }
    out.push(*units.get(pos)?);
    Some(())
}
