//! The two supported code-unit widths and their node formats.
//!
//! Byte tries and 16-bit tries share one builder and one traversal engine.
//! Everything that differs between the two serializations lives behind the
//! [`Unit`] trait: format constants, value/delta decoding, and the encodings
//! the builder writes.

use std::borrow::Cow;
use std::fmt::Debug;
use std::hash::Hash;

use smallvec::SmallVec;

use crate::codec::{byte, unit16};

/// Units produced by one encoder call, in buffer order.
pub type Encoded<U> = SmallVec<[U; 8]>;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for u16 {}
}

/// A code unit of a serialized trie: `u8` for byte tries, `u16` for
/// UTF-16 tries.
///
/// Methods taking a `lead` receive the raw lead unit and the position right
/// after it. Decoders return `None` when the buffer ends early.
pub trait Unit: Copy + Ord + Hash + Debug + Default + Send + Sync + 'static + sealed::Sealed {
    /// Lead units below this value start a branch node.
    const MIN_LINEAR_MATCH: u32;
    /// Longest run of units a single linear-match node can hold.
    const MAX_LINEAR_MATCH_LENGTH: usize;
    /// Lead units at or above this value carry a value.
    const MIN_VALUE_LEAD: u32;
    /// Branches with more edges than this are split on their middle unit.
    const MAX_BRANCH_LINEAR_SUB_NODE_LENGTH: usize = 5;
    /// Whether an intermediate value shares the lead unit of the following
    /// match node (16-bit) or is a separate value node (bytes).
    const MATCH_NODES_CAN_HAVE_VALUES: bool;

    fn from_u32(v: u32) -> Self;
    fn to_u32(self) -> u32;

    /// The units of a string in this width: UTF-8 bytes or UTF-16 code units.
    fn str_units(s: &str) -> Cow<'_, [Self]>;

    /// Whether a value lead unit marks a final value.
    fn is_final(lead: u32) -> bool;

    /// Reads the value of a node whose lead is `lead`.
    fn read_value(buf: &[Self], pos: usize, lead: u32) -> Option<i32>;

    /// Steps over an intermediate value, returning the lead (node type) of
    /// the match node it belongs to and the position after that lead.
    fn skip_node_value(buf: &[Self], pos: usize, lead: u32) -> Option<(u32, usize)>;

    /// Reads a final value or jump delta stored in a list branch.
    fn read_branch_value(buf: &[Self], pos: usize, lead: u32) -> Option<i32>;

    /// Steps over a list-branch value.
    fn skip_branch_value(pos: usize, lead: u32) -> usize;

    /// Reads the delta at `pos` and returns the jump target.
    fn jump_by_delta(buf: &[Self], pos: usize) -> Option<usize>;

    /// Returns the position after the delta at `pos`.
    fn skip_delta(buf: &[Self], pos: usize) -> Option<usize>;

    /// Encodes a final value, or a list-branch value with its final flag.
    fn encode_value(value: i32, is_final: bool) -> Encoded<Self>;

    /// Encodes the lead of a match or branch-head node of type `node`,
    /// preceded by its optional intermediate value.
    fn encode_value_and_type(value: Option<i32>, node: u32) -> Encoded<Self>;

    /// Encodes a forward jump distance.
    fn encode_delta(delta: usize) -> Encoded<Self>;
}

/// Reads the unit at `pos` as `u32`.
#[inline]
pub(crate) fn unit_at<U: Unit>(buf: &[U], pos: usize) -> Option<u32> {
    buf.get(pos).map(|&u| u.to_u32())
}

impl Unit for u8 {
    const MIN_LINEAR_MATCH: u32 = byte::MIN_LINEAR_MATCH;
    const MAX_LINEAR_MATCH_LENGTH: usize = byte::MAX_LINEAR_MATCH_LENGTH;
    const MIN_VALUE_LEAD: u32 = byte::MIN_VALUE_LEAD;
    const MATCH_NODES_CAN_HAVE_VALUES: bool = false;

    #[inline]
    fn from_u32(v: u32) -> Self {
        v as u8
    }

    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    fn str_units(s: &str) -> Cow<'_, [u8]> {
        Cow::Borrowed(s.as_bytes())
    }

    #[inline]
    fn is_final(lead: u32) -> bool {
        lead & byte::VALUE_IS_FINAL != 0
    }

    #[inline]
    fn read_value(buf: &[u8], pos: usize, lead: u32) -> Option<i32> {
        byte::read_value(buf, pos, lead >> 1)
    }

    #[inline]
    fn skip_node_value(buf: &[u8], pos: usize, lead: u32) -> Option<(u32, usize)> {
        // The match node follows the value node as a separate lead byte.
        let pos = byte::skip_value(pos, lead);
        Some((unit_at(buf, pos)?, pos + 1))
    }

    #[inline]
    fn read_branch_value(buf: &[u8], pos: usize, lead: u32) -> Option<i32> {
        byte::read_value(buf, pos, lead >> 1)
    }

    #[inline]
    fn skip_branch_value(pos: usize, lead: u32) -> usize {
        byte::skip_value(pos, lead)
    }

    #[inline]
    fn jump_by_delta(buf: &[u8], pos: usize) -> Option<usize> {
        byte::jump_by_delta(buf, pos)
    }

    #[inline]
    fn skip_delta(buf: &[u8], pos: usize) -> Option<usize> {
        byte::skip_delta(buf, pos)
    }

    fn encode_value(value: i32, is_final: bool) -> Encoded<u8> {
        let mut buf = [0u8; 5];
        let len = byte::encode_value(value, is_final, &mut buf);
        Encoded::from_slice(&buf[..len])
    }

    fn encode_value_and_type(value: Option<i32>, node: u32) -> Encoded<u8> {
        let mut out = match value {
            Some(v) => Self::encode_value(v, false),
            None => Encoded::new(),
        };
        out.push(node as u8);
        out
    }

    fn encode_delta(delta: usize) -> Encoded<u8> {
        let mut buf = [0u8; 5];
        let len = byte::encode_delta(delta, &mut buf);
        Encoded::from_slice(&buf[..len])
    }
}

impl Unit for u16 {
    const MIN_LINEAR_MATCH: u32 = unit16::MIN_LINEAR_MATCH;
    const MAX_LINEAR_MATCH_LENGTH: usize = unit16::MAX_LINEAR_MATCH_LENGTH;
    const MIN_VALUE_LEAD: u32 = unit16::MIN_VALUE_LEAD;
    const MATCH_NODES_CAN_HAVE_VALUES: bool = true;

    #[inline]
    fn from_u32(v: u32) -> Self {
        v as u16
    }

    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }

    fn str_units(s: &str) -> Cow<'_, [u16]> {
        Cow::Owned(s.encode_utf16().collect())
    }

    #[inline]
    fn is_final(lead: u32) -> bool {
        lead & unit16::VALUE_IS_FINAL != 0
    }

    #[inline]
    fn read_value(buf: &[u16], pos: usize, lead: u32) -> Option<i32> {
        if Self::is_final(lead) {
            unit16::read_value(buf, pos, lead & 0x7fff)
        } else {
            unit16::read_node_value(buf, pos, lead)
        }
    }

    #[inline]
    fn skip_node_value(_buf: &[u16], pos: usize, lead: u32) -> Option<(u32, usize)> {
        Some((lead & unit16::NODE_TYPE_MASK, unit16::skip_node_value(pos, lead)))
    }

    #[inline]
    fn read_branch_value(buf: &[u16], pos: usize, lead: u32) -> Option<i32> {
        unit16::read_value(buf, pos, lead & 0x7fff)
    }

    #[inline]
    fn skip_branch_value(pos: usize, lead: u32) -> usize {
        unit16::skip_value(pos, lead & 0x7fff)
    }

    #[inline]
    fn jump_by_delta(buf: &[u16], pos: usize) -> Option<usize> {
        unit16::jump_by_delta(buf, pos)
    }

    #[inline]
    fn skip_delta(buf: &[u16], pos: usize) -> Option<usize> {
        unit16::skip_delta(buf, pos)
    }

    fn encode_value(value: i32, is_final: bool) -> Encoded<u16> {
        let mut buf = [0u16; 3];
        let len = unit16::encode_value(value, is_final, &mut buf);
        Encoded::from_slice(&buf[..len])
    }

    fn encode_value_and_type(value: Option<i32>, node: u32) -> Encoded<u16> {
        match value {
            Some(v) => {
                let mut buf = [0u16; 3];
                let len = unit16::encode_node_value(v, node, &mut buf);
                Encoded::from_slice(&buf[..len])
            }
            None => Encoded::from_slice(&[node as u16]),
        }
    }

    fn encode_delta(delta: usize) -> Encoded<u16> {
        let mut buf = [0u16; 3];
        let len = unit16::encode_delta(delta, &mut buf);
        Encoded::from_slice(&buf[..len])
    }
}
