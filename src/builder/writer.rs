//! Back-to-front serialization buffer.
//!
//! Nodes are written after their children, so every reference is a forward
//! delta in the finished buffer. Units are pushed in reverse and the buffer
//! is flipped once at the end. An offset is the written length right after a
//! node's first unit was written; the node then starts `len - offset` units
//! into the finished buffer.

use crate::unit::{Encoded, Unit};

#[derive(Debug, Default)]
pub(crate) struct Writer<U> {
    reversed: Vec<U>,
}

impl<U: Unit> Writer<U> {
    pub(crate) fn new() -> Self {
        Self { reversed: Vec::new() }
    }

    #[inline]
    pub(crate) fn len(&self) -> i32 {
        self.reversed.len() as i32
    }

    /// Writes one unit in front of everything written so far.
    #[inline]
    pub(crate) fn write_unit(&mut self, unit: U) -> i32 {
        self.reversed.push(unit);
        self.len()
    }

    /// Writes `units` (in buffer order) in front of everything written so far.
    pub(crate) fn write_units(&mut self, units: &[U]) -> i32 {
        self.reversed.extend(units.iter().rev());
        self.len()
    }

    fn write_encoded(&mut self, encoded: Encoded<U>) -> i32 {
        self.write_units(&encoded)
    }

    pub(crate) fn write_value_and_final(&mut self, value: i32, is_final: bool) -> i32 {
        self.write_encoded(U::encode_value(value, is_final))
    }

    pub(crate) fn write_value_and_type(&mut self, value: Option<i32>, node: u32) -> i32 {
        self.write_encoded(U::encode_value_and_type(value, node))
    }

    /// Writes the distance from here to the node written at `target`.
    pub(crate) fn write_delta_to(&mut self, target: i32) -> i32 {
        let delta = self.len() - target;
        debug_assert!(delta >= 0);
        self.write_encoded(U::encode_delta(delta as usize))
    }

    /// Returns the finished buffer and resets the writer.
    pub(crate) fn finish(&mut self) -> Vec<U> {
        let mut units = std::mem::take(&mut self.reversed);
        units.reverse();
        units
    }
}
