//! Relay shadow bank.
//!
//! The relay expander's latch is write-only from the controller's point of
//! view, so the bank keeps the authoritative copy: bit `n` set means relay
//! `n + 1` is energised.  The coils are driven active-low, so the byte that
//! goes on the wire is the complement of the mask.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayBank {
    mask: u8,
}

impl RelayBank {
    pub const fn new() -> Self {
        Self { mask: 0 }
    }

    pub fn mask(&self) -> u8 {
        self.mask
    }

    pub fn is_on(&self, index: usize) -> bool {
        self.mask & (1 << index) != 0
    }

    pub fn set(&mut self, index: usize, on: bool) {
        if on {
            self.mask |= 1 << index;
        } else {
            self.mask &= !(1 << index);
        }
    }

    pub fn replace(&mut self, mask: u8) {
        self.mask = mask;
    }

    /// Expander pin level for a relay state: low energises the coil.
    pub const fn level(on: bool) -> bool {
        !on
    }

    /// Expander latch byte for a whole mask.
    pub const fn latch_for(mask: u8) -> u8 {
        !mask
    }
}
