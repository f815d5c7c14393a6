//! Register codec.
//!
//! Bit `i` of the value lives at index `i` (LSB first); display is MSB first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

/// Number of bits in a register.
pub const REGISTER_WIDTH: usize = 8;

/// An 8-bit unsigned value as an ordered sequence of booleans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register([bool; REGISTER_WIDTH]);

impl Register {
    /// Create a register from bits, index 0 being the least significant.
    pub fn from_bits(bits: [bool; REGISTER_WIDTH]) -> Self {
        Self(bits)
    }

    /// Bits, index 0 being the least significant.
    pub fn bits(&self) -> [bool; REGISTER_WIDTH] {
        self.0
    }

    /// Value of bit `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= REGISTER_WIDTH`.
    pub fn bit(&self, i: usize) -> bool {
        self.0[i]
    }

    /// Numeric value.
    pub fn value(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .fold(0u8, |acc, (i, _)| acc | (1 << i))
    }
}

impl From<u8> for Register {
    fn from(value: u8) -> Self {
        let mut bits = [false; REGISTER_WIDTH];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = value & (1 << i) != 0;
        }
        Self(bits)
    }
}

impl From<Register> for u8 {
    fn from(register: Register) -> Self {
        register.value()
    }
}

impl Index<usize> for Register {
    type Output = bool;

    fn index(&self, i: usize) -> &bool {
        &self.0[i]
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0.iter().rev() {
            f.write_str(if *bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}
