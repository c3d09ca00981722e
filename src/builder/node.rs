//! Builder-side node graph.
//!
//! Nodes live in a flat arena and refer to each other by [`NodeId`]. During
//! `add()` the graph is a tree of linear-match and dynamic-branch nodes whose
//! leaves are shared final-value nodes. `register()` then rewrites it into
//! the node kinds that map one-to-one onto the serialized form.

use smallvec::SmallVec;

use crate::unit::Unit;

/// Index of a node in the builder arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// One outgoing edge of a list branch: either a final value written inline,
/// or a sub-node reached through a jump.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum ListEdge {
    Final(i32),
    Node(NodeId),
}

#[derive(Clone, Debug)]
pub(crate) enum Node<U> {
    /// A key ends here and nothing extends it.
    Final(i32),
    /// A value followed by a match node (byte tries only).
    Intermediate { value: i32, next: NodeId },
    /// A run of units stored in the builder's string pool.
    Linear {
        start: usize,
        len: usize,
        value: Option<i32>,
        next: NodeId,
    },
    /// Mutable branch used while adding keys.
    Dynamic {
        value: Option<i32>,
        units: Vec<U>,
        edges: Vec<NodeId>,
    },
    /// Up to `MAX_BRANCH_LINEAR_SUB_NODE_LENGTH` edges searched linearly.
    List {
        units: SmallVec<[U; 5]>,
        edges: SmallVec<[ListEdge; 5]>,
    },
    /// Binary split on `unit`: `less` for smaller input units, `ge` otherwise.
    Split { unit: U, less: NodeId, ge: NodeId },
    /// Branch lead: edge count and optional intermediate value.
    Head {
        len: usize,
        value: Option<i32>,
        next: NodeId,
    },
}

/// Arena slot: the node plus its serialization bookkeeping.
///
/// `offset` is 0 before edge numbering, negative (an edge number) until the
/// node is written, and afterwards the written length at the node's start.
#[derive(Clone, Debug)]
pub(crate) struct Slot<U> {
    pub(crate) node: Node<U>,
    pub(crate) offset: i32,
    pub(crate) first_edge_number: i32,
}

#[derive(Debug)]
pub(crate) struct NodeArena<U> {
    slots: Vec<Slot<U>>,
}

impl<U: Unit> NodeArena<U> {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }

    pub(crate) fn alloc(&mut self, node: Node<U>) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            offset: 0,
            first_edge_number: 0,
        });
        id
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<U> {
        &self.slots[id.index()].node
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node<U> {
        &mut self.slots[id.index()].node
    }

    #[inline]
    pub(crate) fn offset(&self, id: NodeId) -> i32 {
        self.slots[id.index()].offset
    }

    #[inline]
    pub(crate) fn set_offset(&mut self, id: NodeId, offset: i32) {
        self.slots[id.index()].offset = offset;
    }

    #[inline]
    pub(crate) fn first_edge_number(&self, id: NodeId) -> i32 {
        self.slots[id.index()].first_edge_number
    }

    #[inline]
    pub(crate) fn set_first_edge_number(&mut self, id: NodeId, edge_number: i32) {
        self.slots[id.index()].first_edge_number = edge_number;
    }

    /// Structural identity of a registered node, used to share equal nodes.
    /// Children compare by id, so sharing proceeds bottom-up.
    pub(crate) fn key(&self, id: NodeId, strings: &[U]) -> NodeKey<U> {
        match self.node(id) {
            Node::Final(v) => NodeKey::Final(*v),
            Node::Intermediate { value, next } => NodeKey::Intermediate(*value, *next),
            Node::Linear {
                start,
                len,
                value,
                next,
            } => NodeKey::Linear(
                SmallVec::from_slice(&strings[*start..*start + *len]),
                *value,
                *next,
            ),
            Node::List { units, edges } => NodeKey::List(units.clone(), edges.clone()),
            Node::Split { unit, less, ge } => NodeKey::Split(*unit, *less, *ge),
            Node::Head { len, value, next } => NodeKey::Head(*len, *value, *next),
            Node::Dynamic { .. } => NodeKey::Unique(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum NodeKey<U> {
    Final(i32),
    Intermediate(i32, NodeId),
    Linear(SmallVec<[U; 16]>, Option<i32>, NodeId),
    List(SmallVec<[U; 5]>, SmallVec<[ListEdge; 5]>),
    Split(U, NodeId, NodeId),
    Head(usize, Option<i32>, NodeId),
    /// Dynamic branches are never registered.
    Unique(NodeId),
}
