//! Trie builder: collects (key, value) pairs and serializes them.
//!
//! Building happens in three passes over an arena of nodes:
//!
//! 1. `add()` grows a dynamic tree of linear-match and branch nodes.
//! 2. `register()` turns it into nodes that correspond 1:1 to the serialized
//!    form: long runs are chunked, wide branches become binary split nodes,
//!    and in [`BuildMode::Small`] equivalent nodes are shared.
//! 3. The graph is written back to front so that every jump is a forward
//!    delta. Right-most branch edges are numbered first; a shared node that
//!    sits inside a right edge which is still to be written is left for that
//!    edge instead of being written twice.

mod node;
mod writer;

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{Result, TrieError};
use crate::trie::Trie;
use crate::unit::Unit;

use node::{ListEdge, Node, NodeArena, NodeId, NodeKey};
use writer::Writer;

/// Longest key accepted by [`TrieBuilder::add`].
pub const MAX_KEY_LENGTH: usize = 0xffff;

/// How hard the builder works to shrink the serialized trie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Only final values are shared. Somewhat faster to build.
    #[default]
    Fast,
    /// Structurally equivalent nodes are shared, which usually yields a
    /// smaller buffer.
    Small,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Adding,
    Built(BuildMode),
}

/// Builder for byte or 16-bit serialized tries.
///
/// ```
/// use stringtrie::{BuildMode, TrieBuilder, TrieResult};
///
/// let mut builder = TrieBuilder::<u8>::new();
/// builder.add(b"jan", 1)?.add(b"june", 6)?.add(b"july", 7)?;
/// let mut trie = builder.build(BuildMode::Small)?;
/// assert_eq!(trie.next_units(b"jun"), TrieResult::NoValue);
/// assert_eq!(trie.next(b'e'), TrieResult::FinalValue);
/// assert_eq!(trie.value(), Some(6));
/// # Ok::<(), stringtrie::TrieError>(())
/// ```
#[derive(Debug)]
pub struct TrieBuilder<U: Unit> {
    /// Pool of key suffixes referenced by linear-match nodes.
    strings: Vec<U>,
    arena: NodeArena<U>,
    /// Final values are always shared, in either mode.
    final_values: HashMap<i32, NodeId>,
    /// Registered nodes by structure; only filled in [`BuildMode::Small`].
    registry: HashMap<NodeKey<U>, NodeId>,
    root: Option<NodeId>,
    state: State,
    mode: BuildMode,
    writer: Writer<U>,
    units: Vec<U>,
    pairs: usize,
}

impl<U: Unit> Default for TrieBuilder<U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<U: Unit> TrieBuilder<U> {
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
            arena: NodeArena::new(),
            final_values: HashMap::new(),
            registry: HashMap::new(),
            root: None,
            state: State::Adding,
            mode: BuildMode::Fast,
            writer: Writer::new(),
            units: Vec::new(),
            pairs: 0,
        }
    }

    /// Number of pairs added since the last [`clear`](Self::clear).
    pub fn len(&self) -> usize {
        self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs == 0
    }

    /// Adds a (key, value) pair. Keys may be added in any order, but each
    /// key only once.
    pub fn add(&mut self, key: &[U], value: i32) -> Result<&mut Self> {
        if self.state != State::Adding {
            return Err(TrieError::AlreadyBuilt);
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(TrieError::KeyTooLong { len: key.len() });
        }
        match self.root {
            None => self.root = Some(self.create_suffix_node(key, 0, value)),
            Some(root) => self.add_at(root, key, value)?,
        }
        self.pairs += 1;
        Ok(self)
    }

    /// Adds a string key: UTF-8 bytes for byte tries, UTF-16 code units for
    /// 16-bit tries.
    pub fn add_str(&mut self, key: &str, value: i32) -> Result<&mut Self> {
        let units = U::str_units(key);
        self.add(&units, value)
    }

    /// Builds the trie and returns a cursor over the serialized buffer.
    ///
    /// After the first successful build, further calls return the same
    /// buffer regardless of `mode`, and `add()` fails until `clear()`.
    pub fn build(&mut self, mode: BuildMode) -> Result<Trie<'_, U>> {
        let units = self.build_buffer(mode)?;
        Ok(Trie::new(units))
    }

    /// Builds the trie and returns its serialized form.
    pub fn build_buffer(&mut self, mode: BuildMode) -> Result<&[U]> {
        if self.state == State::Adding {
            let root = self.root.ok_or(TrieError::Empty)?;
            self.mode = mode;
            let root = self.register(root);
            self.mark_right_edges_first(root, -1);
            self.write_node(root);
            self.units = self.writer.finish();
            self.state = State::Built(mode);
            debug!(
                unit_bits = std::mem::size_of::<U>() * 8,
                mode = ?mode,
                pairs = self.pairs,
                nodes = self.arena.len(),
                shared = self.registry.len(),
                units = self.units.len(),
                "built trie"
            );
            self.release_nodes();
        }
        Ok(&self.units)
    }

    /// Builds the trie if necessary and returns the serialized buffer.
    pub fn into_buffer(mut self, mode: BuildMode) -> Result<Vec<U>> {
        self.build_buffer(mode)?;
        Ok(std::mem::take(&mut self.units))
    }

    /// Removes all pairs and the built buffer so the builder can be reused.
    pub fn clear(&mut self) {
        self.release_nodes();
        self.root = None;
        self.units = Vec::new();
        self.state = State::Adding;
        self.pairs = 0;
    }

    fn release_nodes(&mut self) {
        self.strings.clear();
        self.arena.clear();
        self.final_values.clear();
        self.registry.clear();
    }

    // =========================================================================
    // Adding
    // =========================================================================

    /// Returns the shared final-value node for `value`.
    fn register_final_value(&mut self, value: i32) -> NodeId {
        let arena = &mut self.arena;
        *self
            .final_values
            .entry(value)
            .or_insert_with(|| arena.alloc(Node::Final(value)))
    }

    /// A node matching `key[start..]` and then ending with `value`.
    fn create_suffix_node(&mut self, key: &[U], start: usize, value: i32) -> NodeId {
        let node = self.register_final_value(value);
        if start < key.len() {
            let offset = self.strings.len();
            self.strings.extend_from_slice(&key[start..]);
            self.arena.alloc(Node::Linear {
                start: offset,
                len: key.len() - start,
                value: None,
                next: node,
            })
        } else {
            node
        }
    }

    fn set_value(&mut self, id: NodeId, v: i32) {
        match self.arena.node_mut(id) {
            Node::Linear { value, .. } | Node::Dynamic { value, .. } => {
                debug_assert!(value.is_none());
                *value = Some(v);
            }
            _ => debug_assert!(false, "node cannot take a value"),
        }
    }

    /// Points `link` at `id`.
    fn relink(&mut self, link: Link, id: NodeId) {
        match link {
            Link::Root => self.root = Some(id),
            Link::Next(parent) => {
                if let Node::Linear { next, .. } = self.arena.node_mut(parent) {
                    *next = id;
                }
            }
            Link::Edge(parent, i) => {
                if let Node::Dynamic { edges, .. } = self.arena.node_mut(parent) {
                    edges[i] = id;
                }
            }
        }
    }

    /// Adds `key` below `root`, one node per step.
    /// Nothing is modified when an error is returned.
    fn add_at(&mut self, root: NodeId, key: &[U], value: i32) -> Result<()> {
        let mut link = Link::Root;
        let mut id = root;
        let mut start = 0;
        loop {
            let (existing, dynamic) = match self.arena.node(id) {
                Node::Final(v) => (Some(*v), false),
                Node::Dynamic { .. } => (None, true),
                _ => (None, false),
            };
            let step = if let Some(existing) = existing {
                if start == key.len() {
                    return Err(TrieError::DuplicateKey);
                }
                // Final-value nodes are shared; replace rather than modify.
                let node = self.create_suffix_node(key, start, value);
                self.set_value(node, existing);
                Descend::Replaced(node)
            } else if dynamic {
                self.add_to_branch(id, key, start, value)?
            } else {
                self.add_to_linear(id, key, start, value)?
            };
            match step {
                Descend::Done => return Ok(()),
                Descend::Replaced(node) => {
                    self.relink(link, node);
                    return Ok(());
                }
                Descend::Into {
                    link: child_link,
                    child,
                    start: child_start,
                } => {
                    link = child_link;
                    id = child;
                    start = child_start;
                }
            }
        }
    }

    fn add_to_linear(&mut self, id: NodeId, key: &[U], mut start: usize, value: i32) -> Result<Descend> {
        let Node::Linear {
            start: offset,
            len,
            value: node_value,
            next,
        } = *self.arena.node(id)
        else {
            unreachable!("registered nodes only exist while building");
        };
        if start == key.len() {
            if node_value.is_some() {
                return Err(TrieError::DuplicateKey);
            }
            self.set_value(id, value);
            return Ok(Descend::Done);
        }
        let limit = offset + len;
        for i in offset..limit {
            if start == key.len() {
                // The key is a prefix with a new value: split into two
                // linear-match nodes.
                let prefix_len = i - offset;
                let suffix = self.arena.alloc(Node::Linear {
                    start: i,
                    len: len - prefix_len,
                    value: Some(value),
                    next,
                });
                *self.arena.node_mut(id) = Node::Linear {
                    start: offset,
                    len: prefix_len,
                    value: node_value,
                    next: suffix,
                };
                return Ok(Descend::Done);
            }
            let this_unit = self.strings[i];
            let new_unit = key[start];
            if this_unit != new_unit {
                let node = self.split_linear(id, i, this_unit, key, start, value);
                return Ok(Descend::Replaced(node));
            }
            start += 1;
        }
        // The key matches all of this node's units.
        Ok(Descend::Into {
            link: Link::Next(id),
            child: next,
            start,
        })
    }

    /// Inserts a branch where `key[start]` first differs from the linear-match
    /// unit at pool index `i`.
    fn split_linear(&mut self, id: NodeId, i: usize, this_unit: U, key: &[U], start: usize, value: i32) -> NodeId {
        let Node::Linear {
            start: offset,
            len,
            value: node_value,
            next,
        } = *self.arena.node(id)
        else {
            unreachable!("registered nodes only exist while building");
        };
        let branch = self.arena.alloc(Node::Dynamic {
            value: None,
            units: Vec::new(),
            edges: Vec::new(),
        });
        let (result, this_suffix) = if i == offset {
            // Mismatch on the first unit: this node becomes the suffix, and
            // its value moves to the branch.
            if let Some(v) = node_value {
                self.set_value(branch, v);
            }
            let suffix = if len > 1 {
                *self.arena.node_mut(id) = Node::Linear {
                    start: offset + 1,
                    len: len - 1,
                    value: None,
                    next,
                };
                id
            } else {
                next
            };
            (branch, suffix)
        } else if i == offset + len - 1 {
            // Mismatch on the last unit: keep this node for the prefix.
            *self.arena.node_mut(id) = Node::Linear {
                start: offset,
                len: len - 1,
                value: node_value,
                next: branch,
            };
            (id, next)
        } else {
            // Mismatch in the middle: keep this node for the prefix.
            let prefix_len = i - offset;
            let suffix = self.arena.alloc(Node::Linear {
                start: i + 1,
                len: len - (prefix_len + 1),
                value: None,
                next,
            });
            *self.arena.node_mut(id) = Node::Linear {
                start: offset,
                len: prefix_len,
                value: node_value,
                next: branch,
            };
            (id, suffix)
        };
        let new_suffix = self.create_suffix_node(key, start + 1, value);
        self.insert_edge(branch, this_unit, this_suffix);
        self.insert_edge(branch, key[start], new_suffix);
        result
    }

    /// Adds an edge for a unit that is not yet in the branch.
    fn insert_edge(&mut self, branch: NodeId, unit: U, child: NodeId) {
        if let Node::Dynamic { units, edges, .. } = self.arena.node_mut(branch) {
            let i = units.binary_search(&unit).unwrap_or_else(|i| i);
            units.insert(i, unit);
            edges.insert(i, child);
        }
    }

    fn add_to_branch(&mut self, id: NodeId, key: &[U], start: usize, value: i32) -> Result<Descend> {
        let (node_value, found) = match self.arena.node(id) {
            Node::Dynamic { value, units, edges } => match key.get(start) {
                Some(unit) => (*value, Some(units.binary_search(unit).map(|i| (i, edges[i])))),
                None => (*value, None),
            },
            _ => unreachable!("registered nodes only exist while building"),
        };
        match found {
            None => {
                if node_value.is_some() {
                    return Err(TrieError::DuplicateKey);
                }
                self.set_value(id, value);
                Ok(Descend::Done)
            }
            Some(Ok((i, child))) => Ok(Descend::Into {
                link: Link::Edge(id, i),
                child,
                start: start + 1,
            }),
            Some(Err(_)) => {
                let child = self.create_suffix_node(key, start + 1, value);
                self.insert_edge(id, key[start], child);
                Ok(Descend::Done)
            }
        }
    }

    // =========================================================================
    // Registering
    // =========================================================================

    /// Returns an equivalent registered node in [`BuildMode::Small`], or the
    /// node itself.
    fn register_node(&mut self, id: NodeId) -> NodeId {
        if self.mode == BuildMode::Fast {
            return id;
        }
        let key = self.arena.key(id, &self.strings);
        match self.registry.entry(key) {
            Entry::Occupied(e) => {
                trace!(node = id.index(), existing = e.get().index(), "sharing equivalent node");
                *e.get()
            }
            Entry::Vacant(e) => {
                e.insert(id);
                id
            }
        }
    }

    /// Registers every node below `root`, children before parents, and
    /// returns the registered root.
    fn register(&mut self, root: NodeId) -> NodeId {
        // Apart from the shared final values, added nodes form a tree.
        let mut registered: Vec<Option<NodeId>> = vec![None; self.arena.len()];
        let mut stack = vec![(root, false)];
        while let Some((id, children_done)) = stack.pop() {
            if children_done {
                let node = if matches!(self.arena.node(id), Node::Linear { .. }) {
                    self.register_linear(id, &registered)
                } else {
                    self.register_dynamic(id, &registered)
                };
                registered[id.index()] = Some(node);
                continue;
            }
            match self.arena.node(id) {
                Node::Linear { next, .. } => {
                    stack.push((id, true));
                    if !matches!(self.arena.node(*next), Node::Final(_)) {
                        stack.push((*next, false));
                    }
                }
                Node::Dynamic { edges, .. } => {
                    stack.push((id, true));
                    for &edge in edges.iter().rev() {
                        if !matches!(self.arena.node(edge), Node::Final(_)) {
                            stack.push((edge, false));
                        }
                    }
                }
                _ => {}
            }
        }
        registered[root.index()].unwrap_or(root)
    }

    fn register_linear(&mut self, id: NodeId, registered: &[Option<NodeId>]) -> NodeId {
        let Node::Linear {
            start,
            mut len,
            value,
            next,
        } = *self.arena.node(id)
        else {
            return id;
        };
        let mut next = registered[next.index()].unwrap_or(next);
        // Break the run into chunks of at most MAX_LINEAR_MATCH_LENGTH,
        // registering from the end.
        while len > U::MAX_LINEAR_MATCH_LENGTH {
            let next_start = start + len - U::MAX_LINEAR_MATCH_LENGTH;
            len -= U::MAX_LINEAR_MATCH_LENGTH;
            let suffix = self.arena.alloc(Node::Linear {
                start: next_start,
                len: U::MAX_LINEAR_MATCH_LENGTH,
                value: None,
                next,
            });
            next = self.register_node(suffix);
        }
        let result = match value {
            Some(v) if !U::MATCH_NODES_CAN_HAVE_VALUES => {
                *self.arena.node_mut(id) = Node::Linear {
                    start,
                    len,
                    value: None,
                    next,
                };
                let matcher = self.register_node(id);
                self.arena.alloc(Node::Intermediate { value: v, next: matcher })
            }
            _ => {
                *self.arena.node_mut(id) = Node::Linear { start, len, value, next };
                id
            }
        };
        self.register_node(result)
    }

    fn register_dynamic(&mut self, id: NodeId, registered: &[Option<NodeId>]) -> NodeId {
        let (value, units, edges) = match self.arena.node_mut(id) {
            Node::Dynamic { value, units, edges } => (*value, std::mem::take(units), std::mem::take(edges)),
            _ => return id,
        };
        let edges: Vec<ListEdge> = edges
            .into_iter()
            .map(|edge| match self.arena.node(edge) {
                Node::Final(v) => ListEdge::Final(*v),
                _ => ListEdge::Node(registered[edge.index()].unwrap_or(edge)),
            })
            .collect();
        let sub = self.register_branch(&units, &edges);
        let head_value = if U::MATCH_NODES_CAN_HAVE_VALUES { value } else { None };
        let head = self.arena.alloc(Node::Head {
            len: units.len(),
            value: head_value,
            next: sub,
        });
        let result = match value {
            Some(v) if !U::MATCH_NODES_CAN_HAVE_VALUES => {
                let head = self.register_node(head);
                self.arena.alloc(Node::Intermediate { value: v, next: head })
            }
            _ => head,
        };
        self.register_node(result)
    }

    /// Splits one branch into list and split nodes. Recursion depth is
    /// logarithmic in the branch width.
    fn register_branch(&mut self, units: &[U], edges: &[ListEdge]) -> NodeId {
        let length = units.len();
        if length > U::MAX_BRANCH_LINEAR_SUB_NODE_LENGTH {
            // Branch on the middle unit.
            let middle = length / 2;
            let less = self.register_branch(&units[..middle], &edges[..middle]);
            let ge = self.register_branch(&units[middle..], &edges[middle..]);
            let split = self.arena.alloc(Node::Split {
                unit: units[middle],
                less,
                ge,
            });
            return self.register_node(split);
        }
        let list = self.arena.alloc(Node::List {
            units: SmallVec::from_slice(units),
            edges: SmallVec::from_slice(edges),
        });
        self.register_node(list)
    }

    // =========================================================================
    // Writing
    // =========================================================================

    /// Numbers the unwritten nodes right-edge first with negative offsets.
    fn mark_right_edges_first(&mut self, root: NodeId, edge_number: i32) -> i32 {
        // Edge number handed back by the last finished visit.
        let mut result = edge_number;
        let mut stack = vec![Mark::Visit(root, edge_number)];
        while let Some(mark) = stack.pop() {
            match mark {
                Mark::Visit(id, edge_number) => {
                    result = edge_number;
                    if self.arena.offset(id) != 0 {
                        continue;
                    }
                    match self.arena.node(id) {
                        Node::Final(_) | Node::Dynamic { .. } => self.arena.set_offset(id, edge_number),
                        Node::Intermediate { next, .. } | Node::Linear { next, .. } | Node::Head { next, .. } => {
                            stack.push(Mark::Finish(id));
                            stack.push(Mark::Visit(*next, edge_number));
                        }
                        Node::List { edges, .. } => {
                            let index = edges.len();
                            self.arena.set_first_edge_number(id, edge_number);
                            stack.push(Mark::Finish(id));
                            stack.push(Mark::ListEdges { list: id, index, step: 0 });
                        }
                        Node::Split { less, ge, .. } => {
                            let (less, ge) = (*less, *ge);
                            self.arena.set_first_edge_number(id, edge_number);
                            stack.push(Mark::Finish(id));
                            stack.push(Mark::SplitLess(less));
                            stack.push(Mark::Visit(ge, edge_number));
                        }
                    }
                }
                Mark::ListEdges { list, index, step } => {
                    let Some(index) = index.checked_sub(1) else {
                        continue;
                    };
                    let edge = match self.arena.node(list) {
                        Node::List { edges, .. } => edges[index],
                        _ => continue,
                    };
                    // All but the right-most edge get a new number.
                    stack.push(Mark::ListEdges { list, index, step: 1 });
                    if let ListEdge::Node(child) = edge {
                        stack.push(Mark::Visit(child, result - step));
                    }
                }
                Mark::SplitLess(less) => stack.push(Mark::Visit(less, result - 1)),
                Mark::Finish(id) => self.arena.set_offset(id, result),
            }
        }
        result
    }

    /// Writes the graph below `root`. Sub-nodes are written before the node
    /// that refers to them.
    fn write_node(&mut self, root: NodeId) {
        let mut stack = vec![Write::Node(root)];
        while let Some(job) = stack.pop() {
            let id = match job {
                Write::Node(id) => id,
                Write::UnlessInsideRightEdge { id, first, last } => {
                    let offset = self.arena.offset(id);
                    if offset < 0 && (offset < last || first < offset) {
                        id
                    } else {
                        continue;
                    }
                }
                Write::Emit(id) => {
                    self.emit_node(id);
                    continue;
                }
            };
            stack.push(Write::Emit(id));
            match self.arena.node(id) {
                Node::Intermediate { next, .. } | Node::Linear { next, .. } | Node::Head { next, .. } => {
                    stack.push(Write::Node(*next));
                }
                Node::Split { less, ge, .. } => {
                    // The less-than branch first, then greater-or-equal
                    // inline without a jump.
                    stack.push(Write::Node(*ge));
                    stack.push(Write::UnlessInsideRightEdge {
                        id: *less,
                        first: self.arena.first_edge_number(id),
                        last: self.arena.offset(*ge),
                    });
                }
                Node::List { edges, .. } => {
                    let first = self.arena.first_edge_number(id);
                    let Some((right_edge, rest)) = edges.split_last() else {
                        continue;
                    };
                    // The last edge needs no jump.
                    let last = match *right_edge {
                        ListEdge::Node(n) => {
                            stack.push(Write::Node(n));
                            self.arena.offset(n)
                        }
                        ListEdge::Final(_) => first,
                    };
                    // Pushed in ascending order so that they are written in
                    // reverse, and the first edge gets the shortest jump.
                    for edge in rest {
                        if let ListEdge::Node(n) = *edge {
                            stack.push(Write::UnlessInsideRightEdge { id: n, first, last });
                        }
                    }
                }
                Node::Final(_) | Node::Dynamic { .. } => {}
            }
        }
    }

    /// Writes the units of a node whose sub-nodes are already written.
    fn emit_node(&mut self, id: NodeId) {
        let offset = match self.arena.node(id).clone() {
            Node::Final(v) => self.writer.write_value_and_final(v, true),
            Node::Intermediate { value, .. } => self.writer.write_value_and_final(value, false),
            Node::Linear { start, len, value, .. } => {
                self.writer.write_units(&self.strings[start..start + len]);
                self.writer
                    .write_value_and_type(value, U::MIN_LINEAR_MATCH + len as u32 - 1)
            }
            Node::Head { len, value, .. } => {
                if len <= U::MIN_LINEAR_MATCH as usize {
                    self.writer.write_value_and_type(value, len as u32 - 1)
                } else {
                    self.writer.write_unit(U::from_u32(len as u32 - 1));
                    self.writer.write_value_and_type(value, 0)
                }
            }
            Node::Split { unit, less, .. } => {
                self.writer.write_delta_to(self.arena.offset(less));
                self.writer.write_unit(unit)
            }
            Node::List { units, edges } => self.emit_list(&units, &edges),
            Node::Dynamic { .. } => {
                debug_assert!(false, "dynamic branch reached the writer");
                return;
            }
        };
        self.arena.set_offset(id, offset);
    }

    fn emit_list(&mut self, units: &[U], edges: &[ListEdge]) -> i32 {
        let last = units.len() - 1;
        if let ListEdge::Final(v) = edges[last] {
            self.writer.write_value_and_final(v, true);
        }
        let mut offset = self.writer.write_unit(units[last]);
        for i in (0..last).rev() {
            let (value, is_final) = match edges[i] {
                ListEdge::Final(v) => (v, true),
                ListEdge::Node(n) => (offset - self.arena.offset(n), false),
            };
            self.writer.write_value_and_final(value, is_final);
            offset = self.writer.write_unit(units[i]);
        }
        offset
    }
}

/// Where an edge into the node being added to lives.
#[derive(Clone, Copy, Debug)]
enum Link {
    Root,
    Next(NodeId),
    Edge(NodeId, usize),
}

/// Outcome of adding a key at one node.
enum Descend {
    Done,
    /// The node was replaced; its parent must point at the new one.
    Replaced(NodeId),
    Into { link: Link, child: NodeId, start: usize },
}

/// Pending work of the edge-numbering pass.
enum Mark {
    Visit(NodeId, i32),
    /// List edges left of `index`, numbered from the last result.
    ListEdges { list: NodeId, index: usize, step: i32 },
    SplitLess(NodeId),
    Finish(NodeId),
}

/// Pending work of the writing pass.
enum Write {
    Node(NodeId),
    /// Written only if not written yet and not part of the pending right
    /// edge numbered `last..=first`.
    UnlessInsideRightEdge { id: NodeId, first: i32, last: i32 },
    /// Sub-nodes are done; write the node itself.
    Emit(NodeId),
}
