//! Compact integer encodings embedded in serialized tries.
//!
//! Both unit widths encode two kinds of integers:
//! - **values**: the `i32` payload of a key, 1..=5 bytes or 1..=3 units,
//!   tagged with a "final" flag that tells the reader whether more input can
//!   follow;
//! - **deltas**: non-negative forward jump distances inside the buffer.
//!
//! The leading unit alone determines how many units follow. Readers take the
//! buffer and the position *after* the lead unit, and return `None` if the
//! buffer ends early.

/// Byte-serialized tries.
pub mod byte {
    // 00..0f: Branch node. If node!=0 then the length is node+1, otherwise the
    // length is one more than the next byte.

    /// 10..1f: Linear-match node, match 1..16 bytes and continue reading the next node.
    pub const MIN_LINEAR_MATCH: u32 = 0x10;
    pub const MAX_LINEAR_MATCH_LENGTH: usize = 0x10;

    /// 20..ff: Variable-length value node.
    /// If odd, the value is final. (Otherwise, intermediate value or jump delta.)
    /// Then shift-right by 1 bit.
    /// The remaining lead byte value indicates the number of following bytes (0..4)
    /// and contains the value's top bits.
    pub const MIN_VALUE_LEAD: u32 = MIN_LINEAR_MATCH + MAX_LINEAR_MATCH_LENGTH as u32; // 0x20
    pub const VALUE_IS_FINAL: u32 = 1;

    // Compact value: After testing bit 0, shift right by 1 and then use the
    // following thresholds.
    const MIN_ONE_BYTE_VALUE_LEAD: u32 = MIN_VALUE_LEAD / 2; // 0x10
    pub const MAX_ONE_BYTE_VALUE: i32 = 0x40;

    const MIN_TWO_BYTE_VALUE_LEAD: u32 = MIN_ONE_BYTE_VALUE_LEAD + MAX_ONE_BYTE_VALUE as u32 + 1; // 0x51
    pub const MAX_TWO_BYTE_VALUE: i32 = 0x1aff;

    const MIN_THREE_BYTE_VALUE_LEAD: u32 = MIN_TWO_BYTE_VALUE_LEAD + (MAX_TWO_BYTE_VALUE as u32 >> 8) + 1; // 0x6c
    const FOUR_BYTE_VALUE_LEAD: u32 = 0x7e;
    pub const MAX_THREE_BYTE_VALUE: i32 = (((FOUR_BYTE_VALUE_LEAD - MIN_THREE_BYTE_VALUE_LEAD) << 16) - 1) as i32; // 0x11ffff
    const FIVE_BYTE_VALUE_LEAD: u32 = 0x7f;

    // Compact delta integers.
    const MAX_ONE_BYTE_DELTA: usize = 0xbf;
    const MIN_TWO_BYTE_DELTA_LEAD: u32 = MAX_ONE_BYTE_DELTA as u32 + 1; // 0xc0
    const MIN_THREE_BYTE_DELTA_LEAD: u32 = 0xf0;
    const FOUR_BYTE_DELTA_LEAD: u32 = 0xfe;
    const FIVE_BYTE_DELTA_LEAD: u32 = 0xff;

    const MAX_TWO_BYTE_DELTA: usize = (((MIN_THREE_BYTE_DELTA_LEAD - MIN_TWO_BYTE_DELTA_LEAD) << 8) - 1) as usize; // 0x2fff
    const MAX_THREE_BYTE_DELTA: usize = (((FOUR_BYTE_DELTA_LEAD - MIN_THREE_BYTE_DELTA_LEAD) << 16) - 1) as usize; // 0xdffff

    #[inline]
    fn at(buf: &[u8], pos: usize) -> Option<u32> {
        buf.get(pos).map(|&b| u32::from(b))
    }

    /// Reads a value given its lead byte *already shifted right by one*.
    pub fn read_value(buf: &[u8], pos: usize, lead: u32) -> Option<i32> {
        let value = if lead < MIN_TWO_BYTE_VALUE_LEAD {
            lead as i32 - MIN_ONE_BYTE_VALUE_LEAD as i32
        } else if lead < MIN_THREE_BYTE_VALUE_LEAD {
            (((lead - MIN_TWO_BYTE_VALUE_LEAD) << 8) | at(buf, pos)?) as i32
        } else if lead < FOUR_BYTE_VALUE_LEAD {
            (((lead - MIN_THREE_BYTE_VALUE_LEAD) << 16) | (at(buf, pos)? << 8) | at(buf, pos + 1)?)
                as i32
        } else if lead == FOUR_BYTE_VALUE_LEAD {
            ((at(buf, pos)? << 16) | (at(buf, pos + 1)? << 8) | at(buf, pos + 2)?) as i32
        } else {
            ((at(buf, pos)? << 24)
                | (at(buf, pos + 1)? << 16)
                | (at(buf, pos + 2)? << 8)
                | at(buf, pos + 3)?) as i32
        };
        Some(value)
    }

    /// Skips the bytes following a value lead byte (unshifted).
    pub fn skip_value(pos: usize, lead_byte: u32) -> usize {
        debug_assert!(lead_byte >= MIN_VALUE_LEAD);
        if lead_byte >= (MIN_TWO_BYTE_VALUE_LEAD << 1) {
            if lead_byte < (MIN_THREE_BYTE_VALUE_LEAD << 1) {
                pos + 1
            } else if lead_byte < (FOUR_BYTE_VALUE_LEAD << 1) {
                pos + 2
            } else {
                pos + 3 + ((lead_byte >> 1) & 1) as usize
            }
        } else {
            pos
        }
    }

    /// Reads the delta at `pos` and returns the jump target.
    pub fn jump_by_delta(buf: &[u8], pos: usize) -> Option<usize> {
        let lead = at(buf, pos)?;
        let pos = pos + 1;
        let (delta, pos) = if lead < MIN_TWO_BYTE_DELTA_LEAD {
            (lead, pos)
        } else if lead < MIN_THREE_BYTE_DELTA_LEAD {
            (((lead - MIN_TWO_BYTE_DELTA_LEAD) << 8) | at(buf, pos)?, pos + 1)
        } else if lead < FOUR_BYTE_DELTA_LEAD {
            let delta =
                ((lead - MIN_THREE_BYTE_DELTA_LEAD) << 16) | (at(buf, pos)? << 8) | at(buf, pos + 1)?;
            (delta, pos + 2)
        } else if lead == FOUR_BYTE_DELTA_LEAD {
            let delta = (at(buf, pos)? << 16) | (at(buf, pos + 1)? << 8) | at(buf, pos + 2)?;
            (delta, pos + 3)
        } else {
            let delta = (at(buf, pos)? << 24)
                | (at(buf, pos + 1)? << 16)
                | (at(buf, pos + 2)? << 8)
                | at(buf, pos + 3)?;
            (delta, pos + 4)
        };
        pos.checked_add(delta as usize)
    }

    /// Returns the position after the delta at `pos`.
    pub fn skip_delta(buf: &[u8], pos: usize) -> Option<usize> {
        let lead = at(buf, pos)?;
        let pos = pos + 1;
        Some(if lead < MIN_TWO_BYTE_DELTA_LEAD {
            pos
        } else if lead < MIN_THREE_BYTE_DELTA_LEAD {
            pos + 1
        } else if lead < FOUR_BYTE_DELTA_LEAD {
            pos + 2
        } else {
            pos + 3 + (lead & 1) as usize
        })
    }

    /// Encodes `value` with its final flag into `buf`, returning the byte count.
    pub fn encode_value(value: i32, is_final: bool, buf: &mut [u8; 5]) -> usize {
        let flag = if is_final { VALUE_IS_FINAL } else { 0 };
        if (0..=MAX_ONE_BYTE_VALUE).contains(&value) {
            buf[0] = (((MIN_ONE_BYTE_VALUE_LEAD + value as u32) << 1) | flag) as u8;
            return 1;
        }
        let v = value as u32;
        let (lead, len) = if !(0..=0xff_ffff).contains(&value) {
            buf[1] = (v >> 24) as u8;
            buf[2] = (v >> 16) as u8;
            buf[3] = (v >> 8) as u8;
            buf[4] = v as u8;
            (FIVE_BYTE_VALUE_LEAD, 5)
        } else if value <= MAX_TWO_BYTE_VALUE {
            buf[1] = v as u8;
            (MIN_TWO_BYTE_VALUE_LEAD + (v >> 8), 2)
        } else if value <= MAX_THREE_BYTE_VALUE {
            buf[1] = (v >> 8) as u8;
            buf[2] = v as u8;
            (MIN_THREE_BYTE_VALUE_LEAD + (v >> 16), 3)
        } else {
            buf[1] = (v >> 16) as u8;
            buf[2] = (v >> 8) as u8;
            buf[3] = v as u8;
            (FOUR_BYTE_VALUE_LEAD, 4)
        };
        buf[0] = ((lead << 1) | flag) as u8;
        len
    }

    /// Encodes a forward jump distance into `buf`, returning the byte count.
    pub fn encode_delta(delta: usize, buf: &mut [u8; 5]) -> usize {
        let d = delta as u32;
        if delta <= MAX_ONE_BYTE_DELTA {
            buf[0] = d as u8;
            1
        } else if delta <= MAX_TWO_BYTE_DELTA {
            buf[0] = (MIN_TWO_BYTE_DELTA_LEAD + (d >> 8)) as u8;
            buf[1] = d as u8;
            2
        } else if delta <= MAX_THREE_BYTE_DELTA {
            buf[0] = (MIN_THREE_BYTE_DELTA_LEAD + (d >> 16)) as u8;
            buf[1] = (d >> 8) as u8;
            buf[2] = d as u8;
            3
        } else if delta <= 0xff_ffff {
            buf[0] = FOUR_BYTE_DELTA_LEAD as u8;
            buf[1] = (d >> 16) as u8;
            buf[2] = (d >> 8) as u8;
            buf[3] = d as u8;
            4
        } else {
            buf[0] = FIVE_BYTE_DELTA_LEAD as u8;
            buf[1] = (d >> 24) as u8;
            buf[2] = (d >> 16) as u8;
            buf[3] = (d >> 8) as u8;
            buf[4] = d as u8;
            5
        }
    }
}

/// 16-bit-unit-serialized tries.
pub mod unit16 {
    // 0000..002f: Branch node. If node!=0 then the length is node+1, otherwise
    // the length is one more than the next unit.

    /// 0030..003f: Linear-match node, match 1..16 units and continue reading the next node.
    pub const MIN_LINEAR_MATCH: u32 = 0x30;
    pub const MAX_LINEAR_MATCH_LENGTH: usize = 0x10;

    /// Match-node lead unit bits 14..6 for the optional intermediate value.
    /// If these bits are 0, then there is no intermediate value.
    pub const MIN_VALUE_LEAD: u32 = MIN_LINEAR_MATCH + MAX_LINEAR_MATCH_LENGTH as u32; // 0x0040
    pub const NODE_TYPE_MASK: u32 = MIN_VALUE_LEAD - 1; // 0x003f

    /// A final-value node has bit 15 set.
    pub const VALUE_IS_FINAL: u32 = 0x8000;

    // Compact value: After testing and masking off bit 15, use the following thresholds.
    pub const MAX_ONE_UNIT_VALUE: i32 = 0x3fff;
    const MIN_TWO_UNIT_VALUE_LEAD: u32 = MAX_ONE_UNIT_VALUE as u32 + 1; // 0x4000
    const THREE_UNIT_VALUE_LEAD: u32 = 0x7fff;
    pub const MAX_TWO_UNIT_VALUE: i32 = (((THREE_UNIT_VALUE_LEAD - MIN_TWO_UNIT_VALUE_LEAD) << 16) - 1) as i32; // 0x3ffeffff

    // Compact intermediate-value integer, lead unit shared with a branch or linear-match node.
    pub const MAX_ONE_UNIT_NODE_VALUE: i32 = 0xff;
    const MIN_TWO_UNIT_NODE_VALUE_LEAD: u32 = MIN_VALUE_LEAD + ((MAX_ONE_UNIT_NODE_VALUE as u32 + 1) << 6); // 0x4040
    const THREE_UNIT_NODE_VALUE_LEAD: u32 = 0x7fc0;
    pub const MAX_TWO_UNIT_NODE_VALUE: i32 =
        (((THREE_UNIT_NODE_VALUE_LEAD - MIN_TWO_UNIT_NODE_VALUE_LEAD) << 10) - 1) as i32; // 0xfdffff

    // Compact delta integers.
    const MAX_ONE_UNIT_DELTA: usize = 0xfbff;
    const MIN_TWO_UNIT_DELTA_LEAD: u32 = MAX_ONE_UNIT_DELTA as u32 + 1; // 0xfc00
    const THREE_UNIT_DELTA_LEAD: u32 = 0xffff;
    const MAX_TWO_UNIT_DELTA: usize = (((THREE_UNIT_DELTA_LEAD - MIN_TWO_UNIT_DELTA_LEAD) << 16) - 1) as usize; // 0x03feffff

    #[inline]
    fn at(buf: &[u16], pos: usize) -> Option<u32> {
        buf.get(pos).map(|&u| u32::from(u))
    }

    /// Reads a final or jump value given its lead unit with bit 15 masked off.
    pub fn read_value(buf: &[u16], pos: usize, lead: u32) -> Option<i32> {
        let value = if lead < MIN_TWO_UNIT_VALUE_LEAD {
            lead
        } else if lead < THREE_UNIT_VALUE_LEAD {
            ((lead - MIN_TWO_UNIT_VALUE_LEAD) << 16) | at(buf, pos)?
        } else {
            (at(buf, pos)? << 16) | at(buf, pos + 1)?
        };
        Some(value as i32)
    }

    /// Reads an intermediate value folded into a match-node lead unit.
    pub fn read_node_value(buf: &[u16], pos: usize, lead: u32) -> Option<i32> {
        let value = if lead < MIN_TWO_UNIT_NODE_VALUE_LEAD {
            (lead >> 6) - 1
        } else if lead < THREE_UNIT_NODE_VALUE_LEAD {
            (((lead & 0x7fc0) - MIN_TWO_UNIT_NODE_VALUE_LEAD) << 10) | at(buf, pos)?
        } else {
            (at(buf, pos)? << 16) | at(buf, pos + 1)?
        };
        Some(value as i32)
    }

    /// Skips the units following a value lead unit with bit 15 masked off.
    pub fn skip_value(pos: usize, lead: u32) -> usize {
        if lead < MIN_TWO_UNIT_VALUE_LEAD {
            pos
        } else if lead < THREE_UNIT_VALUE_LEAD {
            pos + 1
        } else {
            pos + 2
        }
    }

    pub fn skip_node_value(pos: usize, lead: u32) -> usize {
        if lead < MIN_TWO_UNIT_NODE_VALUE_LEAD {
            pos
        } else if lead < THREE_UNIT_NODE_VALUE_LEAD {
            pos + 1
        } else {
            pos + 2
        }
    }

    /// Reads the delta at `pos` and returns the jump target.
    pub fn jump_by_delta(buf: &[u16], pos: usize) -> Option<usize> {
        let lead = at(buf, pos)?;
        let pos = pos + 1;
        let (delta, pos) = if lead < MIN_TWO_UNIT_DELTA_LEAD {
            (lead, pos)
        } else if lead == THREE_UNIT_DELTA_LEAD {
            ((at(buf, pos)? << 16) | at(buf, pos + 1)?, pos + 2)
        } else {
            (((lead - MIN_TWO_UNIT_DELTA_LEAD) << 16) | at(buf, pos)?, pos + 1)
        };
        pos.checked_add(delta as usize)
    }

    /// Returns the position after the delta at `pos`.
    pub fn skip_delta(buf: &[u16], pos: usize) -> Option<usize> {
        let lead = at(buf, pos)?;
        let pos = pos + 1;
        Some(if lead < MIN_TWO_UNIT_DELTA_LEAD {
            pos
        } else if lead == THREE_UNIT_DELTA_LEAD {
            pos + 2
        } else {
            pos + 1
        })
    }

    /// Encodes a final or jump value into `buf`, returning the unit count.
    pub fn encode_value(value: i32, is_final: bool, buf: &mut [u16; 3]) -> usize {
        let flag = if is_final { VALUE_IS_FINAL } else { 0 };
        let v = value as u32;
        if (0..=MAX_ONE_UNIT_VALUE).contains(&value) {
            buf[0] = (v | flag) as u16;
            return 1;
        }
        let len = if !(0..=MAX_TWO_UNIT_VALUE).contains(&value) {
            buf[0] = THREE_UNIT_VALUE_LEAD as u16;
            buf[1] = (v >> 16) as u16;
            buf[2] = v as u16;
            3
        } else {
            buf[0] = (MIN_TWO_UNIT_VALUE_LEAD + (v >> 16)) as u16;
            buf[1] = v as u16;
            2
        };
        buf[0] |= flag as u16;
        len
    }

    /// Encodes an intermediate value folded into the lead unit of a match
    /// node of type `node`.
    pub fn encode_node_value(value: i32, node: u32, buf: &mut [u16; 3]) -> usize {
        debug_assert!(node < MIN_VALUE_LEAD);
        let v = value as u32;
        let len = if !(0..=MAX_TWO_UNIT_NODE_VALUE).contains(&value) {
            buf[0] = THREE_UNIT_NODE_VALUE_LEAD as u16;
            buf[1] = (v >> 16) as u16;
            buf[2] = v as u16;
            3
        } else if value <= MAX_ONE_UNIT_NODE_VALUE {
            buf[0] = ((v + 1) << 6) as u16;
            1
        } else {
            buf[0] = (MIN_TWO_UNIT_NODE_VALUE_LEAD + ((v >> 10) & 0x7fc0)) as u16;
            buf[1] = v as u16;
            2
        };
        buf[0] |= node as u16;
        len
    }

    /// Encodes a forward jump distance into `buf`, returning the unit count.
    pub fn encode_delta(delta: usize, buf: &mut [u16; 3]) -> usize {
        let d = delta as u32;
        if delta <= MAX_ONE_UNIT_DELTA {
            buf[0] = d as u16;
            1
        } else if delta <= MAX_TWO_UNIT_DELTA {
            buf[0] = (MIN_TWO_UNIT_DELTA_LEAD + (d >> 16)) as u16;
            buf[1] = d as u16;
            2
        } else {
            buf[0] = THREE_UNIT_DELTA_LEAD as u16;
            buf[1] = (d >> 16) as u16;
            buf[2] = d as u16;
            3
        }
    }
}
